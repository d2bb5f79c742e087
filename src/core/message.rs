//! core::message
//!
//! The [`Message`] trait shared by every record in the schema, and the
//! free-standing [`encode`] / [`decode`] entry points.
//!
//! # Semantics
//!
//! - Encoding writes only fields that differ from their default and never
//!   fails.
//! - Decoding is all-or-nothing: a malformed buffer yields an error and no
//!   partial record.
//! - Merging follows protobuf rules: scalars present on the wire replace the
//!   current value, embedded messages merge field by field.
//!
//! # Example
//!
//! ```
//! use dir_metadata::core::message::{decode, encode};
//! use dir_metadata::core::metadata::{Metadata, Os};
//!
//! let meta = Metadata::builder()
//!     .team_email("team@example.com")
//!     .os(Os::Linux)
//!     .build();
//!
//! let bytes = encode(&meta);
//! let parsed: Metadata = decode(&bytes).unwrap();
//! assert_eq!(parsed, meta);
//! ```

use bytes::BufMut;

use crate::core::config::DecodeLimits;
use crate::core::metadata::descriptor::RecordKind;
use crate::core::wire::{
    DecodeContext, MalformedInputError, MalformedReason, Reader, Tag, WireType,
};

/// A record that can be written to and read from the wire.
pub trait Message: Clone + Default + Send + Sync {
    /// Which schema record this type implements.
    const KIND: RecordKind;

    /// Write every non-default field, in field-number order.
    fn encode_raw(&self, buf: &mut impl BufMut);

    /// Exact number of bytes [`encode_raw`](Self::encode_raw) writes.
    fn encoded_len(&self) -> usize;

    /// Merge one field whose key has already been read.
    ///
    /// Implementations skip fields they do not declare with
    /// [`skip_unknown`].
    fn merge_field(
        &mut self,
        tag: Tag,
        reader: &mut Reader<'_>,
        ctx: DecodeContext,
    ) -> Result<(), MalformedInputError>;

    /// Encode into a freshly allocated buffer.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_raw(&mut buf);
        buf
    }

    /// Decode a record with the default limits.
    fn decode(buf: &[u8]) -> Result<Self, MalformedInputError> {
        Self::decode_with(buf, &DecodeLimits::default())
    }

    /// Decode a record under explicit limits.
    fn decode_with(buf: &[u8], limits: &DecodeLimits) -> Result<Self, MalformedInputError> {
        check_input_len(buf, limits)?;
        tracing::trace!(kind = %Self::KIND, len = buf.len(), "decoding record");

        let mut message = Self::default();
        merge_from_reader(
            &mut message,
            &mut Reader::new(buf),
            DecodeContext::new(limits.recursion_limit),
        )?;
        Ok(message)
    }

    /// Merge an encoded record into `self` with the default limits.
    fn merge(&mut self, buf: &[u8]) -> Result<(), MalformedInputError> {
        self.merge_with(buf, &DecodeLimits::default())
    }

    /// Merge an encoded record into `self` under explicit limits.
    ///
    /// On error `self` is left exactly as it was.
    fn merge_with(&mut self, buf: &[u8], limits: &DecodeLimits) -> Result<(), MalformedInputError> {
        check_input_len(buf, limits)?;

        let mut staged = self.clone();
        merge_from_reader(
            &mut staged,
            &mut Reader::new(buf),
            DecodeContext::new(limits.recursion_limit),
        )?;
        *self = staged;
        Ok(())
    }

    /// Reset every field to its default.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Encode a record to bytes.
pub fn encode<M: Message>(record: &M) -> Vec<u8> {
    record.encode_to_vec()
}

/// Decode a record from bytes with the default limits.
///
/// # Errors
///
/// Returns [`MalformedInputError`] with the offset at which parsing failed.
pub fn decode<M: Message>(bytes: &[u8]) -> Result<M, MalformedInputError> {
    M::decode(bytes)
}

/// Decode a record from bytes under explicit limits.
///
/// # Errors
///
/// Returns [`MalformedInputError`] with the offset at which parsing failed,
/// including when a limit is exceeded.
pub fn decode_with<M: Message>(
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<M, MalformedInputError> {
    M::decode_with(bytes, limits)
}

fn check_input_len(buf: &[u8], limits: &DecodeLimits) -> Result<(), MalformedInputError> {
    match limits.max_input_len {
        Some(limit) if buf.len() > limit => Err(MalformedInputError::new(
            limit,
            MalformedReason::InputTooLarge {
                len: buf.len(),
                limit,
            },
        )),
        _ => Ok(()),
    }
}

/// Read fields until the reader is exhausted.
pub(crate) fn merge_from_reader<M: Message>(
    message: &mut M,
    reader: &mut Reader<'_>,
    ctx: DecodeContext,
) -> Result<(), MalformedInputError> {
    while let Some(tag) = reader.read_tag()? {
        message.merge_field(tag, reader, ctx)?;
    }
    Ok(())
}

/// Merge an embedded message field into `target`.
///
/// The payload is decoded through a reader confined to its declared length,
/// so nested fields cannot run past the sub-message.
pub fn merge_nested<M: Message>(
    target: &mut M,
    tag: &Tag,
    reader: &mut Reader<'_>,
    ctx: DecodeContext,
) -> Result<(), MalformedInputError> {
    tag.expect(WireType::LengthDelimited)?;
    let ctx = ctx.enter(tag)?;
    let (payload, start) = reader.read_length_delimited()?;
    merge_from_reader(target, &mut Reader::nested(payload, start), ctx)
}

/// Skip a field `kind` does not declare.
pub fn skip_unknown(
    kind: RecordKind,
    tag: &Tag,
    reader: &mut Reader<'_>,
    ctx: DecodeContext,
) -> Result<(), MalformedInputError> {
    if kind.descriptor().is_reserved(tag.field_number()) {
        tracing::debug!(
            record = %kind,
            field = tag.field_number(),
            offset = tag.offset(),
            "skipping reserved field"
        );
    } else {
        tracing::trace!(
            record = %kind,
            field = tag.field_number(),
            wire_type = %tag.wire_type(),
            offset = tag.offset(),
            "skipping unknown field"
        );
    }
    reader.skip_field(tag, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{Metadata, Monorail, Os};

    #[test]
    fn free_functions_match_trait() {
        let record = Monorail::new("chromium", "Blink");
        assert_eq!(encode(&record), record.encode_to_vec());
        let parsed: Monorail = decode(&encode(&record)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn encoded_len_matches_output() {
        let meta = Metadata::builder()
            .monorail("chromium", "Internals>Network")
            .team_email("net-dev@chromium.org")
            .os(Os::Android)
            .build();
        assert_eq!(meta.encoded_len(), encode(&meta).len());
    }

    #[test]
    fn input_too_large() {
        let meta = Metadata::builder().team_email("a@b.c").build();
        let bytes = encode(&meta);
        let limits = DecodeLimits::default().with_max_input_len(bytes.len() - 1);

        let err = decode_with::<Metadata>(&bytes, &limits).unwrap_err();
        assert_eq!(err.offset(), bytes.len() - 1);
        assert!(matches!(err.reason(), MalformedReason::InputTooLarge { .. }));
    }

    #[test]
    fn recursion_limit_blocks_nested_record() {
        let meta = Metadata::builder().monorail("chromium", "Blink").build();
        let bytes = encode(&meta);

        // One level of nesting is enough for Metadata.monorail.
        let ok = DecodeLimits::default().with_recursion_limit(1);
        assert!(decode_with::<Metadata>(&bytes, &ok).is_ok());

        let too_shallow = DecodeLimits {
            max_input_len: None,
            recursion_limit: 0,
        };
        let err = decode_with::<Metadata>(&bytes, &too_shallow).unwrap_err();
        assert_eq!(err.offset(), 0);
        assert_eq!(err.reason(), &MalformedReason::RecursionLimitExceeded(0));
    }

    #[test]
    fn failed_merge_leaves_target_untouched() {
        let mut meta = Metadata::builder().team_email("keep@example.com").build();
        let before = meta.clone();

        // os = LINUX, then a team_email whose length overruns the buffer
        let err = meta.merge(&[0x18, 0x01, 0x12, 0x09, b'x']).unwrap_err();
        assert_eq!(err.offset(), 3);
        assert_eq!(meta, before);
    }

    #[test]
    fn clear_resets_to_default() {
        let mut meta = Metadata::builder().os(Os::Mac).build();
        meta.clear();
        assert_eq!(meta, Metadata::default());
    }
}
