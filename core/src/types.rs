//! Typed inputs for WHM account operations.
//!
//! # Design
//! Each operation takes its required fields as named struct fields or
//! arguments and its optional ones as `Option`s, and turns them into the flat
//! form parameters WHM expects. Validation (missing or empty required
//! values) happens in `WhmClient` before anything is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Form parameters for one call. Keys are unique; order carries no meaning.
pub type Params = BTreeMap<String, String>;

/// Remote operation names, sent as the final path segment.
pub mod ops {
    pub const LIST_ACCOUNTS: &str = "listaccts";
    pub const CREATE_ACCOUNT: &str = "createacct";
    pub const MODIFY_ACCOUNT: &str = "modifyacct";
    pub const CHANGE_PASSWORD: &str = "passwd";
    pub const REMOVE_ACCOUNT: &str = "removeacct";
    pub const ACCOUNT_SUMMARY: &str = "accountsummary";
    pub const LIST_SUSPENDED: &str = "listsuspended";
    pub const SUSPEND_ACCOUNT: &str = "suspendacct";
    pub const UNSUSPEND_ACCOUNT: &str = "unsuspendacct";
}

/// Field `listaccts` searches in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Domain,
    Owner,
    User,
    Ip,
    Package,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Domain => "domain",
            SearchType::Owner => "owner",
            SearchType::User => "user",
            SearchType::Ip => "ip",
            SearchType::Package => "package",
        }
    }
}

/// Filter for `list_accounts`. Without a term every account is listed and
/// `search_type` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSearch {
    pub search_type: Option<SearchType>,
    pub term: Option<String>,
}

impl AccountSearch {
    pub fn new(search_type: SearchType, term: impl Into<String>) -> Self {
        Self {
            search_type: Some(search_type),
            term: Some(term.into()),
        }
    }

    pub(crate) fn into_params(self) -> Params {
        let mut params = Params::new();
        if let Some(term) = self.term.filter(|t| !t.is_empty()) {
            if let Some(search_type) = self.search_type {
                params.insert("searchtype".to_string(), search_type.as_str().to_string());
            }
            params.insert("search".to_string(), term);
        }
        params
    }
}

/// Input for `new_account`. `extra` is passed through unchanged, e.g.
/// `plan`, `contactemail` or `quota`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub domain: String,
    #[serde(flatten)]
    pub extra: Params,
}

impl NewAccount {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain: domain.into(),
            extra: Params::new(),
        }
    }

    /// Add a pass-through account field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("username", &self.username),
            ("password", &self.password),
            ("domain", &self.domain),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub(crate) fn into_params(self) -> Params {
        let mut params = self.extra;
        params.insert("username".to_string(), self.username);
        params.insert("password".to_string(), self.password);
        params.insert("domain".to_string(), self.domain);
        params
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}
