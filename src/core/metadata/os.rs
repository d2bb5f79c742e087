//! core::metadata::os
//!
//! Target operating system of a directory.
//!
//! Values outside the declared set survive a decode as
//! [`Os::Unrecognized`] so newer producers can add platforms without
//! breaking older readers.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::descriptor::{enum_name, EnumKind};

/// Operating system a directory targets.
///
/// Build values from integers with [`Os::from`], which maps declared
/// numbers to their named variant. Equality and hashing go by wire value,
/// so `Unrecognized(1)` is the same value as `Linux`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Os {
    #[default]
    Unspecified,
    Linux,
    Windows,
    Mac,
    Android,
    Ios,
    Chrome,
    Fuchsia,
    /// A value this schema does not declare, kept verbatim
    Unrecognized(i32),
}

impl Os {
    /// Every declared variant, in declaration order.
    pub const DECLARED: [Os; 8] = [
        Os::Unspecified,
        Os::Linux,
        Os::Windows,
        Os::Mac,
        Os::Android,
        Os::Ios,
        Os::Chrome,
        Os::Fuchsia,
    ];

    /// Numeric value on the wire.
    pub fn as_i32(self) -> i32 {
        match self {
            Os::Unspecified => 0,
            Os::Linux => 1,
            Os::Windows => 2,
            Os::Mac => 3,
            Os::Android => 4,
            Os::Ios => 5,
            Os::Chrome => 6,
            Os::Fuchsia => 7,
            Os::Unrecognized(value) => value,
        }
    }

    /// Declared name, or the decimal value when unrecognized.
    pub fn name(self) -> Cow<'static, str> {
        enum_name(EnumKind::Os, self.as_i32())
    }

    /// Look up a declared variant by name.
    pub fn from_name(name: &str) -> Option<Self> {
        EnumKind::Os
            .descriptor()
            .value_by_name(name)
            .map(|v| Os::from(v.number))
    }

    /// Whether this is the default value.
    pub fn is_unspecified(&self) -> bool {
        self.as_i32() == 0
    }

    /// Whether this value is declared by the schema.
    pub fn is_known(&self) -> bool {
        !matches!(Os::from(self.as_i32()), Os::Unrecognized(_))
    }
}

impl PartialEq for Os {
    fn eq(&self, other: &Self) -> bool {
        self.as_i32() == other.as_i32()
    }
}

impl Eq for Os {}

impl Hash for Os {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_i32().hash(state);
    }
}

impl From<i32> for Os {
    fn from(value: i32) -> Self {
        match value {
            0 => Os::Unspecified,
            1 => Os::Linux,
            2 => Os::Windows,
            3 => Os::Mac,
            4 => Os::Android,
            5 => Os::Ios,
            6 => Os::Chrome,
            7 => Os::Fuchsia,
            other => Os::Unrecognized(other),
        }
    }
}

impl From<Os> for i32 {
    fn from(os: Os) -> Self {
        os.as_i32()
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// JSON mapping: declared values as names, anything else as a number.

impl Serialize for Os {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match Os::from(self.as_i32()) {
            Os::Unrecognized(value) => serializer.serialize_i32(value),
            known => serializer.serialize_str(&known.name()),
        }
    }
}

impl<'de> Deserialize<'de> for Os {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OsVisitor)
    }
}

struct OsVisitor;

impl Visitor<'_> for OsVisitor {
    type Value = Os;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an OS name or 32-bit integer")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Os, E> {
        Os::from_name(value).ok_or_else(|| E::custom(format!("unknown OS name '{}'", value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Os, E> {
        i32::try_from(value)
            .map(Os::from)
            .map_err(|_| E::custom(format!("OS value {} out of range", value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Os, E> {
        i32::try_from(value)
            .map(Os::from)
            .map_err(|_| E::custom(format!("OS value {} out of range", value)))
    }
}
