//! core::metadata::schema
//!
//! Directory metadata records.
//!
//! # Schema Design
//!
//! - `Metadata` is the top-level per-directory descriptor
//! - `Monorail` is a bug-tracker project/component reference, owned by at
//!   most one `Metadata`
//! - Every field has a default, and default-valued fields are never written
//! - Field numbers 13 and 14 of `Metadata` are reserved
//!
//! # Wire layout
//!
//! | Record | Field | Number | Wire type |
//! |---|---|---|---|
//! | Metadata | monorail | 1 | length-delimited (embedded) |
//! | Metadata | team_email | 2 | length-delimited (UTF-8) |
//! | Metadata | os | 3 | varint |
//! | Monorail | project | 1 | length-delimited (UTF-8) |
//! | Monorail | component | 2 | length-delimited (UTF-8) |
//!
//! # Example
//!
//! ```
//! use dir_metadata::core::message::Message;
//! use dir_metadata::core::metadata::schema::{Metadata, Monorail};
//! use dir_metadata::core::metadata::Os;
//!
//! let meta = Metadata::builder()
//!     .monorail("chromium", "Blink>Layout")
//!     .team_email("layout-dev@chromium.org")
//!     .os(Os::Linux)
//!     .build();
//!
//! let bytes = meta.encode_to_vec();
//! let parsed = Metadata::decode(&bytes).unwrap();
//! assert_eq!(parsed.monorail, Some(Monorail::new("chromium", "Blink>Layout")));
//! ```

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use super::descriptor::RecordKind;
use super::os::Os;
use crate::core::message::{merge_nested, skip_unknown, Message};
use crate::core::wire::{
    encode_int32, encode_key, encode_string, encode_varint, int32_len, length_delimited_len,
    DecodeContext, MalformedInputError, Reader, Tag, WireType,
};

/// Per-directory ownership metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Metadata {
    /// Bug-tracker location for issues in this directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monorail: Option<Monorail>,

    /// Contact address of the owning team
    #[serde(alias = "team_email", skip_serializing_if = "String::is_empty")]
    pub team_email: String,

    /// Operating system the directory targets
    #[serde(skip_serializing_if = "Os::is_unspecified")]
    pub os: Os,
}

impl Metadata {
    const MONORAIL: u32 = 1;
    const TEAM_EMAIL: u32 = 2;
    const OS: u32 = 3;

    /// Create a builder for constructing metadata.
    pub fn builder() -> MetadataBuilder {
        MetadataBuilder::default()
    }

    /// Whether a monorail reference is present.
    pub fn has_monorail(&self) -> bool {
        self.monorail.is_some()
    }

    /// Mutable access to the monorail reference, creating an empty one if
    /// absent.
    pub fn monorail_mut(&mut self) -> &mut Monorail {
        self.monorail.get_or_insert_with(Monorail::default)
    }

    /// Drop the monorail reference.
    pub fn clear_monorail(&mut self) {
        self.monorail = None;
    }
}

impl Message for Metadata {
    const KIND: RecordKind = RecordKind::Metadata;

    fn encode_raw(&self, buf: &mut impl BufMut) {
        if let Some(monorail) = &self.monorail {
            encode_key(Self::MONORAIL, WireType::LengthDelimited, buf);
            encode_varint(monorail.encoded_len() as u64, buf);
            monorail.encode_raw(buf);
        }
        if !self.team_email.is_empty() {
            encode_string(Self::TEAM_EMAIL, &self.team_email, buf);
        }
        if !self.os.is_unspecified() {
            encode_int32(Self::OS, self.os.as_i32(), buf);
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(monorail) = &self.monorail {
            len += length_delimited_len(Self::MONORAIL, monorail.encoded_len());
        }
        if !self.team_email.is_empty() {
            len += length_delimited_len(Self::TEAM_EMAIL, self.team_email.len());
        }
        if !self.os.is_unspecified() {
            len += int32_len(Self::OS, self.os.as_i32());
        }
        len
    }

    fn merge_field(
        &mut self,
        tag: Tag,
        reader: &mut Reader<'_>,
        ctx: DecodeContext,
    ) -> Result<(), MalformedInputError> {
        match tag.field_number() {
            Self::MONORAIL => merge_nested(self.monorail_mut(), &tag, reader, ctx),
            Self::TEAM_EMAIL => {
                tag.expect(WireType::LengthDelimited)?;
                self.team_email = reader.read_string(Self::TEAM_EMAIL)?;
                Ok(())
            }
            Self::OS => {
                tag.expect(WireType::Varint)?;
                // int32 semantics: keep the low 32 bits.
                self.os = Os::from(reader.read_varint()? as i32);
                Ok(())
            }
            _ => skip_unknown(Self::KIND, &tag, reader, ctx),
        }
    }
}

/// Bug-tracker project and component reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Monorail {
    /// Tracker project name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project: String,

    /// Component path within the project
    #[serde(skip_serializing_if = "String::is_empty")]
    pub component: String,
}

impl Monorail {
    const PROJECT: u32 = 1;
    const COMPONENT: u32 = 2;

    /// Create a reference to `component` in `project`.
    pub fn new(project: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            component: component.into(),
        }
    }
}

impl Message for Monorail {
    const KIND: RecordKind = RecordKind::Monorail;

    fn encode_raw(&self, buf: &mut impl BufMut) {
        if !self.project.is_empty() {
            encode_string(Self::PROJECT, &self.project, buf);
        }
        if !self.component.is_empty() {
            encode_string(Self::COMPONENT, &self.component, buf);
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.project.is_empty() {
            len += length_delimited_len(Self::PROJECT, self.project.len());
        }
        if !self.component.is_empty() {
            len += length_delimited_len(Self::COMPONENT, self.component.len());
        }
        len
    }

    fn merge_field(
        &mut self,
        tag: Tag,
        reader: &mut Reader<'_>,
        ctx: DecodeContext,
    ) -> Result<(), MalformedInputError> {
        match tag.field_number() {
            Self::PROJECT => {
                tag.expect(WireType::LengthDelimited)?;
                self.project = reader.read_string(Self::PROJECT)?;
                Ok(())
            }
            Self::COMPONENT => {
                tag.expect(WireType::LengthDelimited)?;
                self.component = reader.read_string(Self::COMPONENT)?;
                Ok(())
            }
            _ => skip_unknown(Self::KIND, &tag, reader, ctx),
        }
    }
}

/// Builder for constructing [`Metadata`].
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    monorail: Option<Monorail>,
    team_email: String,
    os: Os,
}

impl MetadataBuilder {
    /// Set the monorail project and component.
    pub fn monorail(mut self, project: impl Into<String>, component: impl Into<String>) -> Self {
        self.monorail = Some(Monorail::new(project, component));
        self
    }

    /// Set the team email.
    pub fn team_email(mut self, email: impl Into<String>) -> Self {
        self.team_email = email.into();
        self
    }

    /// Set the operating system.
    pub fn os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    /// Build the metadata.
    pub fn build(self) -> Metadata {
        Metadata {
            monorail: self.monorail,
            team_email: self.team_email,
            os: self.os,
        }
    }
}
