//! core::metadata::descriptor
//!
//! Static reflection tables for the schema.
//!
//! The tables mirror the record and enum declarations one-to-one. They are
//! plain `static` data: nothing registers itself at runtime and nothing here
//! is mutable.
//!
//! # Reserved numbers
//!
//! `Metadata` reserves field numbers 13 and 14 and the field name
//! `third_party`. Decoders skip those numbers like any unknown field; new
//! fields must never reuse them.
//!
//! # Example
//!
//! ```
//! use dir_metadata::core::metadata::descriptor::{enum_name, field_names, EnumKind, RecordKind};
//!
//! let names: Vec<_> = field_names(RecordKind::Metadata).collect();
//! assert_eq!(names, ["monorail", "team_email", "os"]);
//!
//! assert_eq!(enum_name(EnumKind::Os, 1), "LINUX");
//! assert_eq!(enum_name(EnumKind::Os, 99), "99");
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::core::wire::WireType;

/// The records declared by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Metadata,
    Monorail,
}

impl RecordKind {
    /// Every record, in declaration order.
    pub const ALL: [RecordKind; 2] = [RecordKind::Metadata, RecordKind::Monorail];

    /// Static descriptor for this record.
    pub fn descriptor(self) -> &'static RecordDescriptor {
        match self {
            RecordKind::Metadata => &METADATA,
            RecordKind::Monorail => &MONORAIL,
        }
    }

    /// Declared record name.
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The enumerations declared by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    Os,
}

impl EnumKind {
    /// Static descriptor for this enumeration.
    pub fn descriptor(self) -> &'static EnumDescriptor {
        match self {
            EnumKind::Os => &OS,
        }
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 text
    String,
    /// One of the schema's enumerations
    Enum(EnumKind),
    /// An embedded record
    Message(RecordKind),
}

impl FieldType {
    /// Wire type producers must use for this field type.
    pub fn wire_type(self) -> WireType {
        match self {
            FieldType::String | FieldType::Message(_) => WireType::LengthDelimited,
            FieldType::Enum(_) => WireType::Varint,
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared (snake_case) name
    pub name: &'static str,
    /// lowerCamelCase name used by the JSON mapping
    pub json_name: &'static str,
    /// Field number
    pub number: u32,
    /// Declared type
    pub field_type: FieldType,
}

impl FieldDescriptor {
    /// Wire type for this field.
    pub fn wire_type(&self) -> WireType {
        self.field_type.wire_type()
    }
}

/// An inclusive range of reserved field numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedRange {
    pub start: u32,
    pub end: u32,
}

impl ReservedRange {
    /// Whether `number` falls in the range.
    pub fn contains(&self, number: u32) -> bool {
        (self.start..=self.end).contains(&number)
    }
}

/// Static description of a record.
#[derive(Debug)]
pub struct RecordDescriptor {
    /// Declared name
    pub name: &'static str,
    /// Fields in declaration order
    pub fields: &'static [FieldDescriptor],
    /// Field numbers that may never be assigned
    pub reserved_ranges: &'static [ReservedRange],
    /// Field names that may never be assigned
    pub reserved_names: &'static [&'static str],
}

impl RecordDescriptor {
    /// Look up a field by number.
    pub fn field_by_number(&self, number: u32) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// Look up a field by declared or JSON name.
    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name || f.json_name == name)
    }

    /// Whether `number` is reserved.
    pub fn is_reserved(&self, number: u32) -> bool {
        self.reserved_ranges.iter().any(|r| r.contains(number))
    }

    /// Whether `name` is reserved.
    pub fn is_reserved_name(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|n| *n == name)
    }
}

/// One declared enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    pub name: &'static str,
    pub number: i32,
}

/// Static description of an enumeration.
#[derive(Debug)]
pub struct EnumDescriptor {
    pub name: &'static str,
    /// Values in declaration order
    pub values: &'static [EnumValueDescriptor],
}

impl EnumDescriptor {
    /// Value declared with `number`, if any.
    pub fn value_by_number(&self, number: i32) -> Option<&'static EnumValueDescriptor> {
        self.values.iter().find(|v| v.number == number)
    }

    /// Value declared with `name`, if any.
    pub fn value_by_name(&self, name: &str) -> Option<&'static EnumValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }
}

static METADATA: RecordDescriptor = RecordDescriptor {
    name: "Metadata",
    fields: &[
        FieldDescriptor {
            name: "monorail",
            json_name: "monorail",
            number: 1,
            field_type: FieldType::Message(RecordKind::Monorail),
        },
        FieldDescriptor {
            name: "team_email",
            json_name: "teamEmail",
            number: 2,
            field_type: FieldType::String,
        },
        FieldDescriptor {
            name: "os",
            json_name: "os",
            number: 3,
            field_type: FieldType::Enum(EnumKind::Os),
        },
    ],
    reserved_ranges: &[ReservedRange { start: 13, end: 14 }],
    reserved_names: &["third_party"],
};

static MONORAIL: RecordDescriptor = RecordDescriptor {
    name: "Monorail",
    fields: &[
        FieldDescriptor {
            name: "project",
            json_name: "project",
            number: 1,
            field_type: FieldType::String,
        },
        FieldDescriptor {
            name: "component",
            json_name: "component",
            number: 2,
            field_type: FieldType::String,
        },
    ],
    reserved_ranges: &[],
    reserved_names: &[],
};

static OS: EnumDescriptor = EnumDescriptor {
    name: "OS",
    values: &[
        EnumValueDescriptor {
            name: "OS_UNSPECIFIED",
            number: 0,
        },
        EnumValueDescriptor {
            name: "LINUX",
            number: 1,
        },
        EnumValueDescriptor {
            name: "WINDOWS",
            number: 2,
        },
        EnumValueDescriptor {
            name: "MAC",
            number: 3,
        },
        EnumValueDescriptor {
            name: "ANDROID",
            number: 4,
        },
        EnumValueDescriptor {
            name: "IOS",
            number: 5,
        },
        EnumValueDescriptor {
            name: "CHROME",
            number: 6,
        },
        EnumValueDescriptor {
            name: "FUCHSIA",
            number: 7,
        },
    ],
};

/// Declared field names of `kind`, in declaration order.
pub fn field_names(kind: RecordKind) -> impl Iterator<Item = &'static str> {
    kind.descriptor().fields.iter().map(|f| f.name)
}

/// Name of `value` in `kind`, or its decimal text when undeclared.
pub fn enum_name(kind: EnumKind, value: i32) -> Cow<'static, str> {
    match kind.descriptor().value_by_number(value) {
        Some(v) => Cow::Borrowed(v.name),
        None => Cow::Owned(value.to_string()),
    }
}
