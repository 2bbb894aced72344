//! DNS response codes.
//!
//! With EDNS(0) the response code is 12 bits wide: the low 4 bits live in
//! the header, the upper 8 bits in the OPT pseudo-record's TTL field.
//! See RFC 1035, RFC 6891, and RFC 6895.

use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS response code.
///
/// Values outside the assigned registry decode to
/// [`ResponseCode::Unassigned`]; the message encoder refuses the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCode {
    /// No error condition - RFC 1035
    NoError,

    /// Format error - the server could not interpret the query - RFC 1035
    FormErr,

    /// Server failure - RFC 1035
    ServFail,

    /// Name error - the queried name does not exist - RFC 1035
    NXDomain,

    /// Not implemented - RFC 1035
    NotImp,

    /// Query refused for policy reasons - RFC 1035
    Refused,

    /// Name exists when it should not - RFC 2136
    YXDomain,

    /// RR set exists when it should not - RFC 2136
    YXRRSet,

    /// RR set that should exist does not - RFC 2136
    NXRRSet,

    /// Server not authoritative for zone / not authorized - RFC 2136, RFC 8945
    NotAuth,

    /// Name not contained in zone - RFC 2136
    NotZone,

    /// Bad OPT version - RFC 6891 (extended, value 16)
    BadVers,

    /// Bad/missing server cookie - RFC 7873 (extended, value 23)
    BadCookie,

    /// An unassigned response code value, preserved from the wire.
    Unassigned(u16),
}

impl ResponseCode {
    /// Returns the full 12-bit numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::NoError => 0,
            Self::FormErr => 1,
            Self::ServFail => 2,
            Self::NXDomain => 3,
            Self::NotImp => 4,
            Self::Refused => 5,
            Self::YXDomain => 6,
            Self::YXRRSet => 7,
            Self::NXRRSet => 8,
            Self::NotAuth => 9,
            Self::NotZone => 10,
            Self::BadVers => 16,
            Self::BadCookie => 23,
            Self::Unassigned(v) => v,
        }
    }

    /// Creates a response code from its full numeric value.
    #[inline]
    pub const fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::FormErr,
            2 => Self::ServFail,
            3 => Self::NXDomain,
            4 => Self::NotImp,
            5 => Self::Refused,
            6 => Self::YXDomain,
            7 => Self::YXRRSet,
            8 => Self::NXRRSet,
            9 => Self::NotAuth,
            10 => Self::NotZone,
            16 => Self::BadVers,
            23 => Self::BadCookie,
            v => Self::Unassigned(v),
        }
    }

    /// Combines the header nibble with the OPT extended byte.
    #[inline]
    pub const fn from_parts(header_rcode: u8, extended_rcode: u8) -> Self {
        Self::from_u16(((extended_rcode as u16) << 4) | (header_rcode & 0x0F) as u16)
    }

    /// Returns the 4-bit value for the header RCODE field.
    #[inline]
    pub const fn header_rcode(self) -> u8 {
        (self.to_u16() & 0x0F) as u8
    }

    /// Returns the 8-bit extended RCODE for the OPT record.
    #[inline]
    pub const fn extended_rcode(self) -> u8 {
        (self.to_u16() >> 4) as u8
    }

    /// Returns true if this code is in the assigned registry.
    #[inline]
    pub const fn is_assigned(self) -> bool {
        !matches!(self, Self::Unassigned(_))
    }

    /// Returns true if this response indicates success.
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::NoError)
    }

    /// Returns true if encoding this code needs the OPT extended byte.
    #[inline]
    pub const fn is_extended(self) -> bool {
        self.to_u16() > 15
    }

    /// Returns the human-readable name of the response code.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::YXDomain => "YXDOMAIN",
            Self::YXRRSet => "YXRRSET",
            Self::NXRRSet => "NXRRSET",
            Self::NotAuth => "NOTAUTH",
            Self::NotZone => "NOTZONE",
            Self::BadVers => "BADVERS",
            Self::BadCookie => "BADCOOKIE",
            Self::Unassigned(_) => "RESERVED",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned(v) => write!(f, "RESERVED{v}"),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl Default for ResponseCode {
    fn default() -> Self {
        Self::NoError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rcode_values() {
        assert_eq!(ResponseCode::NoError.to_u16(), 0);
        assert_eq!(ResponseCode::FormErr.to_u16(), 1);
        assert_eq!(ResponseCode::ServFail.to_u16(), 2);
        assert_eq!(ResponseCode::NXDomain.to_u16(), 3);
        assert_eq!(ResponseCode::BadVers.to_u16(), 16);
    }

    #[test]
    fn test_rcode_parts() {
        assert_eq!(ResponseCode::NoError.header_rcode(), 0);
        assert_eq!(ResponseCode::NoError.extended_rcode(), 0);

        // BADVERS: header nibble 0, extended byte 1
        assert_eq!(ResponseCode::BadVers.header_rcode(), 0);
        assert_eq!(ResponseCode::BadVers.extended_rcode(), 1);

        assert_eq!(ResponseCode::from_parts(0, 1), ResponseCode::BadVers);
        assert_eq!(ResponseCode::from_parts(3, 0), ResponseCode::NXDomain);
        assert_eq!(ResponseCode::from_parts(7, 1), ResponseCode::BadCookie);
    }

    #[test]
    fn test_rcode_sentinel() {
        assert_eq!(ResponseCode::from_u16(12), ResponseCode::Unassigned(12));
        assert!(!ResponseCode::from_u16(12).is_assigned());
        assert_eq!(ResponseCode::Unassigned(12).to_u16(), 12);
        assert_eq!(ResponseCode::from_parts(12, 0), ResponseCode::Unassigned(12));
    }

    #[test]
    fn test_rcode_predicates() {
        assert!(ResponseCode::NoError.is_success());
        assert!(!ResponseCode::NXDomain.is_success());
        assert!(ResponseCode::BadVers.is_extended());
        assert!(!ResponseCode::NoError.is_extended());
    }
}
