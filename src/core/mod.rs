//! core
//!
//! Schema types, wire codec, and configuration.
//!
//! # Modules
//!
//! - [`wire`] - Wire primitives: tags, varints, skipping, decode errors
//! - [`message`] - The `Message` trait and `encode`/`decode` entry points
//! - [`metadata`] - Directory metadata records, enum, and reflection
//! - [`config`] - Decode limits and their TOML loading
//!
//! # Design Principles
//!
//! - Encoding never fails; decoding is all-or-nothing
//! - Every decode error carries the byte offset where parsing stopped
//! - No global state: all operations are pure and thread-safe

pub mod config;
pub mod message;
pub mod metadata;
pub mod wire;
