//! Type definitions for tgl

mod account;
mod error;
mod timer;

pub use account::*;
pub use error::*;
pub use timer::*;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response wrapper used by most API v8 endpoints
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Accept an id sent either as a JSON number or a string.
pub(crate) fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected id, found {}",
            other
        ))),
    }
}

/// Like [`id_string`], mapping `null` to `None`.
pub(crate) fn opt_id_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected id, found {}",
            other
        ))),
    }
}
