//! dir-metadata - per-directory ownership metadata
//!
//! Each directory in a source tree can carry a small metadata record naming
//! its bug-tracker component, its owning team's email, and the operating
//! system it targets. This crate holds that schema and converts it to and
//! from the protobuf binary wire format.
//!
//! # Architecture
//!
//! - [`core::wire`] - Tag/varint primitives and [`MalformedInputError`]
//! - [`core::message`] - [`Message`] trait, [`encode`] and [`decode`]
//! - [`core::metadata`] - [`Metadata`], [`Monorail`], [`Os`], reflection, JSON
//! - [`core::config`] - Decode limits loaded from TOML
//!
//! # Correctness Invariants
//!
//! 1. `decode(encode(m)) == m` for every record
//! 2. Default-valued fields are never written
//! 3. Unknown fields are skipped, unknown OS values are preserved
//! 4. Field numbers 13 and 14 of `Metadata` stay reserved
//!
//! # Example
//!
//! ```
//! use dir_metadata::{decode, encode, Metadata, Os};
//!
//! let meta = Metadata::builder()
//!     .monorail("chromium", "Internals>Network")
//!     .team_email("net-dev@chromium.org")
//!     .os(Os::Linux)
//!     .build();
//!
//! let bytes = encode(&meta);
//! let parsed: Metadata = decode(&bytes).unwrap();
//! assert_eq!(parsed, meta);
//! ```

pub mod core;

pub use crate::core::config::{CodecConfig, ConfigError, DecodeLimits};
pub use crate::core::message::{decode, decode_with, encode, Message};
pub use crate::core::metadata::{
    enum_name, field_names, EnumKind, JsonError, Metadata, Monorail, Os, RecordKind,
};
pub use crate::core::wire::{MalformedInputError, MalformedReason, WireType};
