//! A built WHM request, described as plain data.
//!
//! # Design
//! `WhmClient::build_*` methods produce an `HttpRequest` without touching
//! the network; a `Transport` executes it. Every WHM call is a form-encoded
//! POST, so the method is implied and only the URL, headers and body vary.
//! All fields are owned so a request can be logged, stored or handed to
//! another thread without lifetime concerns.

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// A fully qualified request to one WHM operation.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `Authorization` header value, e.g. `Basic cm9vdDpzZWNyZXQ=`.
    pub fn authorization(&self) -> Option<&str> {
        self.header("authorization")
    }

    /// Decode the form body back into key/value pairs.
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }
}

impl std::fmt::Debug for HttpRequest {
    // Both the Authorization header and some bodies carry passwords.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}
