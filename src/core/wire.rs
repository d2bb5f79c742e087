//! core::wire
//!
//! Protobuf binary wire primitives.
//!
//! # Format
//!
//! Every field on the wire is a key followed by a payload. The key is a
//! varint holding `(field_number << 3) | wire_type`:
//!
//! | Wire type | Payload |
//! |---|---|
//! | 0 `Varint` | base-128 varint, at most 10 bytes |
//! | 1 `Fixed64` | 8 bytes little-endian |
//! | 2 `LengthDelimited` | varint length, then that many bytes |
//! | 3 `StartGroup` | fields until the matching `EndGroup` (deprecated) |
//! | 4 `EndGroup` | no payload |
//! | 5 `Fixed32` | 4 bytes little-endian |
//!
//! The byte-level work is done by `prost::encoding`; this module adapts it
//! to the schema's error model.
//!
//! # Offsets
//!
//! [`Reader`] tracks absolute byte offsets, including inside embedded
//! messages, so every [`MalformedInputError`] points at the byte in the
//! caller's buffer where parsing failed.

use std::fmt;

use bytes::{Buf, BufMut};
use prost::encoding::{int32, string};
use prost::DecodeError;
use thiserror::Error;

/// Largest legal field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Maximum encoded size of a varint.
const MAX_VARINT_LEN: usize = 10;

/// The single error kind produced while decoding.
///
/// Carries the absolute byte offset at which parsing failed and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed input at byte {offset}: {reason}")]
pub struct MalformedInputError {
    offset: usize,
    reason: MalformedReason,
}

impl MalformedInputError {
    /// Create an error at an absolute offset.
    pub fn new(offset: usize, reason: MalformedReason) -> Self {
        Self { offset, reason }
    }

    /// Byte offset in the input at which parsing failed.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// What was wrong with the input.
    pub fn reason(&self) -> &MalformedReason {
        &self.reason
    }
}

/// Detail of a [`MalformedInputError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("buffer ends inside a varint")]
    TruncatedVarint,

    #[error("varint longer than {MAX_VARINT_LEN} bytes")]
    VarintOverflow,

    #[error("invalid field number in tag {0:#x}")]
    InvalidFieldNumber(u64),

    #[error("invalid wire type {0}")]
    InvalidWireType(u8),

    #[error("field {field} declared as {expected} but encoded as {found}")]
    WireTypeMismatch {
        field: u32,
        expected: WireType,
        found: WireType,
    },

    #[error("declared length {declared} exceeds {remaining} remaining bytes")]
    LengthOverrun { declared: u64, remaining: usize },

    #[error("buffer ends inside a {width}-byte fixed value")]
    TruncatedFixed { width: usize },

    #[error("field {field} is not valid UTF-8")]
    InvalidUtf8 { field: u32 },

    #[error("end-group tag for field {0} without matching start")]
    UnexpectedEndGroup(u32),

    #[error("group for field {0} is never closed")]
    UnterminatedGroup(u32),

    #[error("nesting exceeds recursion limit of {0}")]
    RecursionLimitExceeded(u32),

    #[error("input of {len} bytes exceeds limit of {limit}")]
    InputTooLarge { len: usize, limit: usize },
}

/// Wire type half of a field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    StartGroup,
    EndGroup,
    Fixed32,
}

impl WireType {
    /// Numeric value used on the wire.
    pub fn as_u8(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::StartGroup => 3,
            WireType::EndGroup => 4,
            WireType::Fixed32 => 5,
        }
    }

    /// Parse the low three bits of a key.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::StartGroup => "start-group",
            WireType::EndGroup => "end-group",
            WireType::Fixed32 => "fixed32",
        };
        write!(f, "{} ({})", name, self.as_u8())
    }
}

/// A decoded field key, remembering where it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    field_number: u32,
    wire_type: WireType,
    offset: usize,
}

impl Tag {
    /// Field number of the key.
    pub fn field_number(&self) -> u32 {
        self.field_number
    }

    /// Wire type of the key.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// Absolute offset of the first byte of the key.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Fail unless the key carries the wire type the schema declares.
    pub fn expect(&self, expected: WireType) -> Result<(), MalformedInputError> {
        if self.wire_type == expected {
            Ok(())
        } else {
            Err(MalformedInputError::new(
                self.offset,
                MalformedReason::WireTypeMismatch {
                    field: self.field_number,
                    expected,
                    found: self.wire_type,
                },
            ))
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

pub use prost::encoding::{encode_varint, encoded_len_varint, key_len};

impl From<WireType> for prost::encoding::WireType {
    fn from(wire_type: WireType) -> Self {
        match wire_type {
            WireType::Varint => Self::Varint,
            WireType::Fixed64 => Self::SixtyFourBit,
            WireType::LengthDelimited => Self::LengthDelimited,
            WireType::StartGroup => Self::StartGroup,
            WireType::EndGroup => Self::EndGroup,
            WireType::Fixed32 => Self::ThirtyTwoBit,
        }
    }
}

impl From<prost::encoding::WireType> for WireType {
    fn from(wire_type: prost::encoding::WireType) -> Self {
        use prost::encoding::WireType as Raw;
        match wire_type {
            Raw::Varint => WireType::Varint,
            Raw::SixtyFourBit => WireType::Fixed64,
            Raw::LengthDelimited => WireType::LengthDelimited,
            Raw::StartGroup => WireType::StartGroup,
            Raw::EndGroup => WireType::EndGroup,
            Raw::ThirtyTwoBit => WireType::Fixed32,
        }
    }
}

/// Write a field key.
pub fn encode_key(field_number: u32, wire_type: WireType, buf: &mut impl BufMut) {
    prost::encoding::encode_key(field_number, wire_type.into(), buf);
}

/// Write a length-delimited string field.
pub fn encode_string(field_number: u32, value: &str, buf: &mut impl BufMut) {
    encode_key(field_number, WireType::LengthDelimited, buf);
    encode_varint(value.len() as u64, buf);
    buf.put_slice(value.as_bytes());
}

/// Encoded size of a length-delimited field with a `len`-byte payload.
pub fn length_delimited_len(field_number: u32, len: usize) -> usize {
    key_len(field_number) + encoded_len_varint(len as u64) + len
}

/// Write an `int32`-typed varint field. Negative values are sign-extended
/// to ten bytes.
pub fn encode_int32(field_number: u32, value: i32, buf: &mut impl BufMut) {
    int32::encode(field_number, &value, buf);
}

/// Encoded size of an `int32`-typed varint field.
pub fn int32_len(field_number: u32, value: i32) -> usize {
    int32::encoded_len(field_number, &value)
}

// =============================================================================
// Decoding
// =============================================================================

/// Nesting budget carried through a decode.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext {
    depth: u32,
    limit: u32,
}

impl DecodeContext {
    /// Start at depth zero with the given recursion limit.
    pub fn new(limit: u32) -> Self {
        Self { depth: 0, limit }
    }

    /// Descend one level for an embedded message or group opened by `tag`.
    pub fn enter(self, tag: &Tag) -> Result<Self, MalformedInputError> {
        if self.depth >= self.limit {
            return Err(MalformedInputError::new(
                tag.offset(),
                MalformedReason::RecursionLimitExceeded(self.limit),
            ));
        }
        Ok(Self {
            depth: self.depth + 1,
            limit: self.limit,
        })
    }
}

/// Cursor over an input buffer with absolute offset tracking.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    /// Reader over a whole input buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::nested(buf, 0)
    }

    /// Reader over a slice that starts at absolute offset `base`.
    pub fn nested(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn error_at(&self, offset: usize, reason: MalformedReason) -> MalformedInputError {
        MalformedInputError::new(offset, reason)
    }

    /// Run one prost decoding step over the unread bytes and advance past
    /// whatever it consumed. Nothing is consumed on failure.
    fn run<T>(
        &mut self,
        step: impl FnOnce(&mut &'a [u8]) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        let mut cursor = &self.buf[self.pos..];
        let value = step(&mut cursor)?;
        self.pos = self.buf.len() - cursor.remaining();
        Ok(value)
    }

    /// Read a base-128 varint.
    pub fn read_varint(&mut self) -> Result<u64, MalformedInputError> {
        self.run(|buf| prost::encoding::decode_varint(buf))
            .map_err(|_| self.varint_error())
    }

    /// Read the next field key, or `None` at end of input.
    pub fn read_tag(&mut self) -> Result<Option<Tag>, MalformedInputError> {
        if self.is_empty() {
            return Ok(None);
        }

        let offset = self.offset();
        let (field_number, wire_type) = self
            .run(|buf| prost::encoding::decode_key(buf))
            .map_err(|_| self.key_error())?;

        Ok(Some(Tag {
            field_number,
            wire_type: wire_type.into(),
            offset,
        }))
    }

    /// Read a length prefix and the payload it announces.
    ///
    /// Returns the payload and its absolute starting offset. A declared
    /// length larger than the remaining input fails at the offset of the
    /// length prefix.
    pub fn read_length_delimited(&mut self) -> Result<(&'a [u8], usize), MalformedInputError> {
        let len_offset = self.offset();
        let declared = self.read_varint()?;
        let remaining = self.remaining();
        if declared > remaining as u64 {
            return Err(self.error_at(
                len_offset,
                MalformedReason::LengthOverrun {
                    declared,
                    remaining,
                },
            ));
        }

        let start = self.offset();
        let len = declared as usize;
        let payload = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok((payload, start))
    }

    /// Read a length-delimited UTF-8 string for `field`.
    pub fn read_string(&mut self, field: u32) -> Result<String, MalformedInputError> {
        let mut value = String::new();
        self.run(|buf| {
            string::merge(
                prost::encoding::WireType::LengthDelimited,
                &mut value,
                buf,
                prost::encoding::DecodeContext::default(),
            )
        })
        .map_err(|_| self.string_error(field))?;
        Ok(value)
    }

    /// Skip the payload of a field the schema does not declare.
    ///
    /// `tag` must already have been read. Groups are skipped up to their
    /// matching end-group key; a bare end-group key is malformed.
    pub fn skip_field(&mut self, tag: &Tag, ctx: DecodeContext) -> Result<(), MalformedInputError> {
        match tag.wire_type() {
            WireType::StartGroup => self.skip_group(tag, ctx),
            WireType::EndGroup => Err(self.error_at(
                tag.offset(),
                MalformedReason::UnexpectedEndGroup(tag.field_number()),
            )),
            _ => self.skip_scalar(tag),
        }
    }

    fn skip_scalar(&mut self, tag: &Tag) -> Result<(), MalformedInputError> {
        let wire_type = tag.wire_type();
        let field_number = tag.field_number();
        self.run(|buf| {
            prost::encoding::skip_field(
                wire_type.into(),
                field_number,
                buf,
                prost::encoding::DecodeContext::default(),
            )
        })
        .map_err(|_| match wire_type {
            WireType::Fixed64 => self.fixed_error(8),
            WireType::Fixed32 => self.fixed_error(4),
            WireType::LengthDelimited => self.length_error(),
            _ => self.varint_error(),
        })
    }

    /// Skip a group whose start key has been read, without recursing.
    ///
    /// Every nested group still enters `ctx`, so the recursion limit bounds
    /// group depth the same way it bounds embedded messages.
    fn skip_group(&mut self, start: &Tag, ctx: DecodeContext) -> Result<(), MalformedInputError> {
        // Open groups, innermost last, each with the context outside it.
        let mut open = vec![(*start, ctx)];
        let mut ctx = ctx.enter(start)?;

        while let Some((group, _)) = open.last().copied() {
            let Some(inner) = self.read_tag()? else {
                return Err(self.error_at(
                    group.offset(),
                    MalformedReason::UnterminatedGroup(group.field_number()),
                ));
            };

            match inner.wire_type() {
                WireType::StartGroup => {
                    let nested = ctx.enter(&inner)?;
                    open.push((inner, ctx));
                    ctx = nested;
                }
                WireType::EndGroup if inner.field_number() == group.field_number() => {
                    if let Some((_, outer)) = open.pop() {
                        ctx = outer;
                    }
                }
                WireType::EndGroup => {
                    return Err(self.error_at(
                        inner.offset(),
                        MalformedReason::UnexpectedEndGroup(inner.field_number()),
                    ));
                }
                _ => self.skip_scalar(&inner)?,
            }
        }
        Ok(())
    }

    // prost reports failures without a position or cause. The helpers below
    // re-inspect the unread bytes to say where and why.

    fn varint_error(&self) -> MalformedInputError {
        let rest = &self.buf[self.pos..];
        let truncated = rest.len() < MAX_VARINT_LEN && rest.iter().all(|b| b & 0x80 != 0);
        let reason = if truncated {
            MalformedReason::TruncatedVarint
        } else {
            MalformedReason::VarintOverflow
        };
        self.error_at(self.offset(), reason)
    }

    fn key_error(&self) -> MalformedInputError {
        let offset = self.offset();
        match self.clone().read_varint() {
            Err(err) => err,
            Ok(key) if key > u64::from(u32::MAX) || (key >> 3) == 0 => {
                self.error_at(offset, MalformedReason::InvalidFieldNumber(key))
            }
            Ok(key) => self.error_at(offset, MalformedReason::InvalidWireType((key & 0x7) as u8)),
        }
    }

    fn fixed_error(&self, width: usize) -> MalformedInputError {
        self.error_at(self.offset(), MalformedReason::TruncatedFixed { width })
    }

    fn length_error(&self) -> MalformedInputError {
        let mut rest = self.clone();
        match rest.read_varint() {
            Err(err) => err,
            Ok(declared) => self.error_at(
                self.offset(),
                MalformedReason::LengthOverrun {
                    declared,
                    remaining: rest.remaining(),
                },
            ),
        }
    }

    fn string_error(&self, field: u32) -> MalformedInputError {
        match self.clone().read_length_delimited() {
            Err(err) => err,
            Ok((payload, start)) => {
                let valid = std::str::from_utf8(payload).map_or_else(|e| e.valid_up_to(), |_| 0);
                self.error_at(start + valid, MalformedReason::InvalidUtf8 { field })
            }
        }
    }
}
