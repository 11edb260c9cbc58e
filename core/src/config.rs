//! Connection settings for a WHM endpoint.
//!
//! # Design
//! A `Config` is owned by a single `WhmClient` and only changes through
//! `WhmClient::update_settings`, so a request never observes a half-applied
//! update. `SettingsUpdate` keeps two long-standing behaviors of the settings
//! call: the password is always re-derived from the update (there is no way
//! to keep the previous one), and an unrecognized response format silently
//! falls back to JSON instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// URL scheme of the management endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format the server is asked to answer in, selected by the API path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Structured data, served under `/json-api/`.
    #[default]
    Json,
    /// Markup, served under `/xml-api/`.
    Xml,
}

impl ResponseFormat {
    /// Resolve a format setting. Anything other than `"json"` or `"xml"`,
    /// including no value at all, resolves to JSON.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            Some("xml") => ResponseFormat::Xml,
            _ => ResponseFormat::Json,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }

    /// Path segment placed between the authority and the operation name.
    pub fn api_path(self) -> &'static str {
        match self {
            ResponseFormat::Json => "/json-api/",
            ResponseFormat::Xml => "/xml-api/",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint, credentials and response handling for one client.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub response_format: ResponseFormat,
    /// Skip TLS certificate and hostname verification. WHM endpoints commonly
    /// run with self-signed certificates; this must be switched on explicitly.
    pub insecure_skip_verify: bool,
    /// Fail with `ApiError::Decode` on unparseable bodies instead of
    /// returning an empty document.
    pub strict_decoding: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheme: Scheme::Https,
            host: "127.0.0.1".to_string(),
            port: 2087,
            username: "root".to_string(),
            password: None,
            response_format: ResponseFormat::Json,
            insecure_skip_verify: false,
            strict_decoding: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("response_format", &self.response_format)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("strict_decoding", &self.strict_decoding)
            .finish()
    }
}

impl Config {
    /// Username and password, if both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        if self.username.is_empty() {
            return None;
        }
        Some((&self.username, password))
    }

    /// Apply a settings update.
    ///
    /// Empty or omitted `scheme`, `host`, `port` and `username` keep their
    /// current values. `password` and `response_format` are always replaced:
    /// an omitted or empty password unsets it, and an omitted or unknown
    /// format becomes JSON.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(scheme) = update.scheme {
            self.scheme = scheme;
        }
        if let Some(host) = update.host.filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = update.port.filter(|p| *p != 0) {
            self.port = port;
        }
        if let Some(username) = update.username.filter(|u| !u.is_empty()) {
            self.username = username;
        }
        self.password = update.password.filter(|p| !p.is_empty());
        self.response_format = ResponseFormat::from_setting(update.response_format.as_deref());
        if let Some(insecure) = update.insecure_skip_verify {
            self.insecure_skip_verify = insecure;
        }
        if let Some(strict) = update.strict_decoding {
            self.strict_decoding = strict;
        }
    }
}

/// A partial settings change passed to `WhmClient::update_settings`.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub scheme: Option<Scheme>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// `"json"` or `"xml"`; any other value selects JSON.
    pub response_format: Option<String>,
    pub insecure_skip_verify: Option<bool>,
    pub strict_decoding: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_password(password: &str) -> SettingsUpdate {
        SettingsUpdate {
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_point_at_local_whm() {
        let config = Config::default();
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 2087);
        assert_eq!(config.username, "root");
        assert!(config.password.is_none());
        assert_eq!(config.response_format, ResponseFormat::Json);
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn omitted_keys_keep_previous_values() {
        let mut config = Config::default();
        config.apply(SettingsUpdate {
            host: Some("whm.example.com".to_string()),
            port: Some(2086),
            scheme: Some(Scheme::Http),
            ..with_password("secret")
        });
        config.apply(with_password("secret"));
        assert_eq!(config.host, "whm.example.com");
        assert_eq!(config.port, 2086);
        assert_eq!(config.scheme, Scheme::Http);
        assert_eq!(config.username, "root");
    }

    #[test]
    fn password_is_cleared_when_omitted() {
        let mut config = Config::default();
        config.apply(with_password("secret"));
        assert_eq!(config.credentials(), Some(("root", "secret")));

        config.apply(SettingsUpdate::default());
        assert!(config.password.is_none());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn empty_password_counts_as_unset() {
        let mut config = Config::default();
        config.apply(with_password(""));
        assert!(config.password.is_none());
    }

    #[test]
    fn unrecognized_format_falls_back_to_json() {
        let mut config = Config::default();
        config.apply(SettingsUpdate {
            response_format: Some("xml".to_string()),
            ..Default::default()
        });
        assert_eq!(config.response_format, ResponseFormat::Xml);

        config.apply(SettingsUpdate {
            response_format: Some("yaml".to_string()),
            ..Default::default()
        });
        assert_eq!(config.response_format, ResponseFormat::Json);
    }

    #[test]
    fn omitted_format_resets_to_json() {
        let mut config = Config {
            response_format: ResponseFormat::Xml,
            ..Default::default()
        };
        config.apply(SettingsUpdate::default());
        assert_eq!(config.response_format, ResponseFormat::Json);
    }

    #[test]
    fn debug_output_redacts_password() {
        let mut config = Config::default();
        config.apply(with_password("hunter2"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"host":"10.0.0.5","password":"pw","response_format":"xml"}"#)
                .unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 2087);
        assert_eq!(config.response_format, ResponseFormat::Xml);
        assert_eq!(config.credentials(), Some(("root", "pw")));
    }
}
