//! Blocking client for the WHM remote administration API.
//!
//! # Overview
//! Exposes account provisioning, suspension and password management as typed
//! calls over the `/json-api/` and `/xml-api/` endpoints. Each call performs
//! exactly one form-encoded POST with Basic authentication and returns the
//! server's decoded response verbatim.
//!
//! # Design
//! - `WhmClient` owns its `Config`; there is no process-wide state.
//! - Every operation has a pure `build_*` half producing an `HttpRequest`, so
//!   request shaping is testable without a network.
//! - `Transport` is the only I/O seam. `UreqTransport` is the default and
//!   only disables TLS verification when `insecure_skip_verify` is set.
//! - Decoding is permissive unless `strict_decoding` is set.
//! - No retries, timeouts, pooling or caching.

pub mod client;
pub mod config;
pub mod decode;
pub mod domain;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::WhmClient;
pub use config::{Config, ResponseFormat, Scheme, SettingsUpdate};
pub use decode::Response;
pub use domain::is_valid_domain;
pub use error::{ApiError, Result};
pub use http::HttpRequest;
pub use transport::{Transport, UreqTransport};
pub use types::{AccountSearch, NewAccount, Params, SearchType};
pub use xml::XmlElement;
