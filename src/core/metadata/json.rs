//! core::metadata::json
//!
//! proto3 JSON mapping for the metadata records.
//!
//! Field names are lowerCamelCase on output, snake_case is accepted on
//! input, default-valued fields are omitted, and `os` is written as its
//! variant name. Unknown JSON fields are rejected.
//!
//! # Example
//!
//! ```
//! use dir_metadata::core::metadata::json::{from_json, to_json};
//! use dir_metadata::core::metadata::{Metadata, Os};
//!
//! let meta = Metadata::builder().team_email("team@example.com").os(Os::Mac).build();
//! let json = to_json(&meta).unwrap();
//! assert_eq!(json, r#"{"teamEmail":"team@example.com","os":"MAC"}"#);
//!
//! let parsed: Metadata = from_json(&json).unwrap();
//! assert_eq!(parsed, meta);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::core::message::Message;

/// Errors from the JSON mapping.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("failed to serialize {record}: {source}")]
    Serialize {
        record: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to parse {record}: {source}")]
    Parse {
        record: &'static str,
        source: serde_json::Error,
    },
}

/// Serialize a record to compact JSON.
pub fn to_json<M: Message + Serialize>(record: &M) -> Result<String, JsonError> {
    serde_json::to_string(record).map_err(|source| JsonError::Serialize {
        record: M::KIND.name(),
        source,
    })
}

/// Serialize a record to indented JSON.
pub fn to_json_pretty<M: Message + Serialize>(record: &M) -> Result<String, JsonError> {
    serde_json::to_string_pretty(record).map_err(|source| JsonError::Serialize {
        record: M::KIND.name(),
        source,
    })
}

/// Parse a record from JSON.
///
/// # Errors
///
/// Returns `JsonError::Parse` for malformed JSON, unknown fields, unknown
/// OS names, or values of the wrong type.
pub fn from_json<M: Message + DeserializeOwned>(json: &str) -> Result<M, JsonError> {
    serde_json::from_str(json).map_err(|source| JsonError::Parse {
        record: M::KIND.name(),
        source,
    })
}
