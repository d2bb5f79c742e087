//! core::metadata
//!
//! Directory metadata schema, reflection tables, and JSON mapping.
//!
//! # Modules
//!
//! - [`schema`] - `Metadata` and `Monorail` records and their wire codecs
//! - [`os`] - The `Os` enumeration
//! - [`descriptor`] - Static field and enum tables for introspection
//! - [`json`] - proto3 JSON mapping
//!
//! # Schema Design
//!
//! - Static types: every record is a plain Rust struct
//! - Presence by omission: default-valued fields are not encoded
//! - Forward compatible: unknown fields are skipped, unknown enum values kept
//!
//! # Example
//!
//! ```
//! use dir_metadata::core::message::Message;
//! use dir_metadata::core::metadata::{Metadata, Os};
//!
//! let meta = Metadata::builder().team_email("team@example.com").os(Os::Linux).build();
//! let parsed = Metadata::decode(&meta.encode_to_vec()).unwrap();
//! assert_eq!(parsed, meta);
//! ```

pub mod descriptor;
pub mod json;
pub mod os;
pub mod schema;

// Re-export commonly used types
pub use descriptor::{enum_name, field_names, EnumKind, FieldDescriptor, RecordKind};
pub use json::{from_json, to_json, to_json_pretty, JsonError};
pub use os::Os;
pub use schema::{Metadata, MetadataBuilder, Monorail};
