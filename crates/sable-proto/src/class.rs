//! DNS record classes.
//!
//! The class field identifies the protocol family of the resource record.
//! IN (Internet) is used almost exclusively; the query classes NONE and ANY
//! appear only in questions.

use crate::error::{Error, Result};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record class.
///
/// See RFC 1035 Section 3.2.4 and RFC 6895 for the registry. Values outside
/// this registry fail decoding with [`Error::UnknownClass`]; record types,
/// by contrast, are allowed to stay opaque.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordClass {
    /// Internet - RFC 1035
    IN = 1,

    /// CSNET - RFC 1035 (obsolete)
    #[deprecated(note = "Obsolete - CSNET no longer exists")]
    CS = 2,

    /// CHAOS - RFC 1035
    ///
    /// Also used by some servers for special queries like `version.bind`.
    CH = 3,

    /// Hesiod - RFC 1035
    HS = 4,

    /// Query class: NONE - RFC 2136
    NONE = 254,

    /// Query class: ANY - RFC 1035
    ///
    /// Matches any class. Only valid in queries, not in resource records.
    ANY = 255,
}

impl RecordClass {
    /// Returns the numeric value of the class.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Creates a class from its numeric value.
    ///
    /// Fails with [`Error::UnknownClass`] for values outside the registry.
    #[inline]
    pub fn from_u16(value: u16) -> Result<Self> {
        Self::try_from(value).map_err(|_| Error::UnknownClass { value })
    }

    /// Returns true if this is a query-only class (NONE or ANY).
    #[inline]
    pub const fn is_query_class(self) -> bool {
        matches!(self, Self::NONE | Self::ANY)
    }

    /// Returns true if this is the Internet class.
    #[inline]
    pub const fn is_internet(self) -> bool {
        matches!(self, Self::IN)
    }

    /// Returns the human-readable name of the class.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IN => "IN",
            #[allow(deprecated)]
            Self::CS => "CS",
            Self::CH => "CH",
            Self::HS => "HS",
            Self::NONE => "NONE",
            Self::ANY => "ANY",
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for RecordClass {
    fn default() -> Self {
        Self::IN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_values() {
        assert_eq!(RecordClass::IN.to_u16(), 1);
        assert_eq!(RecordClass::CH.to_u16(), 3);
        assert_eq!(RecordClass::HS.to_u16(), 4);
        assert_eq!(RecordClass::NONE.to_u16(), 254);
        assert_eq!(RecordClass::ANY.to_u16(), 255);
    }

    #[test]
    fn test_class_from_u16() {
        assert_eq!(RecordClass::from_u16(1), Ok(RecordClass::IN));
        assert_eq!(RecordClass::from_u16(255), Ok(RecordClass::ANY));
        assert_eq!(
            RecordClass::from_u16(1000),
            Err(Error::UnknownClass { value: 1000 })
        );
    }

    #[test]
    fn test_class_predicates() {
        assert!(RecordClass::IN.is_internet());
        assert!(!RecordClass::CH.is_internet());
        assert!(RecordClass::ANY.is_query_class());
        assert!(RecordClass::NONE.is_query_class());
        assert!(!RecordClass::IN.is_query_class());
    }
}
