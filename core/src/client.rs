//! WHM request builder and account operations.
//!
//! # Design
//! `WhmClient` owns its `Config` and a `Transport`. Every operation is split
//! into a pure `build_*` method, which validates inputs and produces an
//! `HttpRequest`, and a public method that sends that request and decodes
//! the body. The `build_*` half never touches the network, so request
//! shaping can be checked without a server. Settings only change through
//! `update_settings(&mut self)`, so a request in flight always sees one
//! consistent configuration.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::config::{Config, SettingsUpdate};
use crate::decode::{decode, Response};
use crate::domain::is_valid_domain;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, CONTENT_TYPE_FORM};
use crate::transport::{Transport, UreqTransport};
use crate::types::{ops, AccountSearch, NewAccount, Params};

/// Blocking client for the WHM account API.
#[derive(Debug, Clone)]
pub struct WhmClient<T = UreqTransport> {
    config: Config,
    transport: T,
}

impl WhmClient<UreqTransport> {
    /// Create a client whose transport honours `config.insecure_skip_verify`.
    pub fn new(config: Config) -> Self {
        let transport = UreqTransport::new(config.insecure_skip_verify);
        Self { config, transport }
    }
}

impl<T: Transport> WhmClient<T> {
    /// Create a client with a caller-supplied transport.
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    /// Apply a settings update and let the transport react to it, e.g. by
    /// rebuilding its TLS setup.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.config.apply(update);
        self.transport.reconfigure(&self.config);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `operation` with the given form parameters.
    ///
    /// Fails with `ApiError::Configuration` if the username or password is
    /// unset. An empty parameter map produces an empty body.
    pub fn build(&self, operation: &str, params: &Params) -> Result<HttpRequest> {
        let (username, password) = self.config.credentials().ok_or(ApiError::Configuration)?;

        let url = format!(
            "{}://{}:{}{}{}",
            self.config.scheme,
            self.config.host,
            self.config.port,
            self.config.response_format.api_path(),
            operation
        );
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        let token = STANDARD.encode(format!("{username}:{password}"));

        Ok(HttpRequest {
            url,
            headers: vec![
                ("authorization".to_string(), format!("Basic {token}")),
                ("content-type".to_string(), CONTENT_TYPE_FORM.to_string()),
            ],
            body,
        })
    }

    /// Execute a built request and decode the body per the configured format.
    pub fn send(&self, request: &HttpRequest) -> Result<Response> {
        debug!(url = %request.url, "sending WHM request");
        let body = self.transport.execute(request)?;
        self.parse_response(&body)
    }

    pub fn parse_response(&self, body: &[u8]) -> Result<Response> {
        decode(body, self.config.response_format, self.config.strict_decoding)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_list_accounts(&self, search: AccountSearch) -> Result<HttpRequest> {
        self.build(ops::LIST_ACCOUNTS, &search.into_params())
    }

    pub fn build_new_account(&self, account: NewAccount) -> Result<HttpRequest> {
        let missing = account.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::Validation {
                operation: ops::CREATE_ACCOUNT,
                fields: missing,
            });
        }
        self.build(ops::CREATE_ACCOUNT, &account.into_params())
    }

    pub fn build_edit_account(&self, username: &str, mut changes: Params) -> Result<HttpRequest> {
        require(ops::MODIFY_ACCOUNT, &[("username", username)])?;
        changes.insert("user".to_string(), username.to_string());
        self.build(ops::MODIFY_ACCOUNT, &changes)
    }

    pub fn build_change_password(&self, username: &str, new_password: &str) -> Result<HttpRequest> {
        require(
            ops::CHANGE_PASSWORD,
            &[("username", username), ("password", new_password)],
        )?;
        let params = params([
            ("user", username),
            ("pass", new_password),
            ("digestauth", "1"),
        ]);
        self.build(ops::CHANGE_PASSWORD, &params)
    }

    pub fn build_delete_account(&self, username: &str, keep_dns: bool) -> Result<HttpRequest> {
        require(ops::REMOVE_ACCOUNT, &[("username", username)])?;
        let keep_dns = if keep_dns { "1" } else { "0" };
        let params = params([("user", username), ("keepdns", keep_dns)]);
        self.build(ops::REMOVE_ACCOUNT, &params)
    }

    /// `identifier` is sent as `domain` when it parses as a domain name and
    /// as `user` otherwise.
    pub fn build_account_details(&self, identifier: &str) -> Result<HttpRequest> {
        require(ops::ACCOUNT_SUMMARY, &[("identifier", identifier)])?;
        // A bare label such as "bob" is valid hostname syntax but is always
        // an account name here.
        let key = if identifier.contains('.') && is_valid_domain(identifier) {
            "domain"
        } else {
            "user"
        };
        self.build(ops::ACCOUNT_SUMMARY, &params([(key, identifier)]))
    }

    pub fn build_list_suspended(&self) -> Result<HttpRequest> {
        self.build(ops::LIST_SUSPENDED, &Params::new())
    }

    pub fn build_suspend_account(&self, username: &str, reason: Option<&str>) -> Result<HttpRequest> {
        require(ops::SUSPEND_ACCOUNT, &[("username", username)])?;
        let mut params = params([("user", username)]);
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            params.insert("reason".to_string(), reason.to_string());
        }
        self.build(ops::SUSPEND_ACCOUNT, &params)
    }

    pub fn build_unsuspend_account(&self, username: &str) -> Result<HttpRequest> {
        require(ops::UNSUSPEND_ACCOUNT, &[("username", username)])?;
        self.build(ops::UNSUSPEND_ACCOUNT, &params([("user", username)]))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// List accounts, optionally filtered by a search term.
    pub fn list_accounts(&self, search: AccountSearch) -> Result<Response> {
        self.send(&self.build_list_accounts(search)?)
    }

    /// Create an account. Username, password and domain are required.
    pub fn new_account(&self, account: NewAccount) -> Result<Response> {
        self.send(&self.build_new_account(account)?)
    }

    /// Modify an existing account with pass-through fields.
    pub fn edit_account(&self, username: &str, changes: Params) -> Result<Response> {
        self.send(&self.build_edit_account(username, changes)?)
    }

    pub fn change_password(&self, username: &str, new_password: &str) -> Result<Response> {
        self.send(&self.build_change_password(username, new_password)?)
    }

    /// Terminate an account, optionally keeping its DNS zone.
    pub fn delete_account(&self, username: &str, keep_dns: bool) -> Result<Response> {
        self.send(&self.build_delete_account(username, keep_dns)?)
    }

    /// Summarize one account, looked up by username or domain.
    pub fn account_details(&self, identifier: &str) -> Result<Response> {
        self.send(&self.build_account_details(identifier)?)
    }

    pub fn list_suspended(&self) -> Result<Response> {
        self.send(&self.build_list_suspended()?)
    }

    pub fn suspend_account(&self, username: &str, reason: Option<&str>) -> Result<Response> {
        self.send(&self.build_suspend_account(username, reason)?)
    }

    pub fn unsuspend_account(&self, username: &str) -> Result<Response> {
        self.send(&self.build_unsuspend_account(username)?)
    }
}

/// Fail with `ApiError::Validation` naming every empty field.
fn require(operation: &'static str, fields: &[(&'static str, &str)]) -> Result<()> {
    let missing: Vec<_> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ApiError::Validation {
        operation,
        fields: missing,
    })
}

fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
