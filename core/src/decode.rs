//! Response decoding for both WHM API flavors.
//!
//! # Design
//! The decoder never looks at what the server actually sent back; the
//! configured `ResponseFormat` alone picks the parser. By default decoding is
//! permissive: an unparseable JSON body becomes `Value::Null` and malformed
//! XML becomes whatever partial tree could be read. Clients configured with
//! `strict_decoding` get an `ApiError::Decode` instead. No schema is applied;
//! callers interpret the fields themselves.
//!
//! Bodies arrive as raw bytes. JSON is parsed straight from them; XML is read
//! from a lossy UTF-8 view so documents in other encodings, such as
//! ISO-8859-1, still produce a tree.

use std::borrow::Cow;

use serde_json::Value;
use tracing::warn;

use crate::config::ResponseFormat;
use crate::error::{ApiError, Result};
use crate::xml::{self, XmlElement};

/// A decoded WHM response, returned verbatim to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Json(Value),
    Xml(XmlElement),
}

impl Response {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            Response::Xml(doc) => Some(doc),
            Response::Json(_) => None,
        }
    }

    /// True when nothing usable could be decoded.
    pub fn is_empty(&self) -> bool {
        match self {
            Response::Json(value) => value.is_null(),
            Response::Xml(doc) => doc.is_empty(),
        }
    }
}

/// Decode `body` according to `format`.
pub fn decode(body: &[u8], format: ResponseFormat, strict: bool) -> Result<Response> {
    match format {
        ResponseFormat::Json => match serde_json::from_slice(body) {
            Ok(value) => Ok(Response::Json(value)),
            Err(err) => fallback(format, err.to_string(), strict).map(|_| Response::Json(Value::Null)),
        },
        ResponseFormat::Xml => {
            let text: Cow<'_, str> = String::from_utf8_lossy(body);
            let (doc, problem) = xml::parse_lenient(&text);
            match problem {
                Some(message) => fallback(format, message, strict).map(|_| Response::Xml(doc)),
                None => Ok(Response::Xml(doc)),
            }
        }
    }
}

fn fallback(format: ResponseFormat, message: String, strict: bool) -> Result<()> {
    if strict {
        return Err(ApiError::Decode { format, message });
    }
    warn!(%format, error = %message, "response body did not decode cleanly");
    Ok(())
}
