//! DNS operation codes.
//!
//! OpCodes specify the kind of query in a DNS message header. Defined in
//! RFC 1035 Section 4.1.1 with extensions from subsequent RFCs. Value 3 is
//! reserved and has never been assigned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS operation code.
///
/// Values outside the assigned registry decode to [`OpCode::Unassigned`];
/// the message encoder refuses to serialize the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    /// Standard query (QUERY) - RFC 1035
    Query,

    /// Inverse query (IQUERY) - RFC 1035 (obsoleted by RFC 3425)
    IQuery,

    /// Server status request (STATUS) - RFC 1035
    Status,

    /// Notify - RFC 1996
    ///
    /// Sent by primary servers to tell secondaries that zone data changed.
    Notify,

    /// Update - RFC 2136
    Update,

    /// A reserved or unassigned opcode value, preserved from the wire.
    Unassigned(u8),
}

impl OpCode {
    /// Returns the numeric value of the opcode.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Query => 0,
            Self::IQuery => 1,
            Self::Status => 2,
            Self::Notify => 4,
            Self::Update => 5,
            Self::Unassigned(v) => v,
        }
    }

    /// Creates an opcode from its 4-bit numeric value.
    ///
    /// Reserved and unassigned values (3, 6..) become the sentinel.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Query,
            1 => Self::IQuery,
            2 => Self::Status,
            4 => Self::Notify,
            5 => Self::Update,
            v => Self::Unassigned(v),
        }
    }

    /// Returns true if this opcode is in the assigned registry.
    #[inline]
    pub const fn is_assigned(self) -> bool {
        !matches!(self, Self::Unassigned(_))
    }

    /// Returns the human-readable name of the opcode.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::IQuery => "IQUERY",
            Self::Status => "STATUS",
            Self::Notify => "NOTIFY",
            Self::Update => "UPDATE",
            Self::Unassigned(_) => "RESERVED",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned(v) => write!(f, "RESERVED{v}"),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl Default for OpCode {
    fn default() -> Self {
        Self::Query
    }
}
