//! Codec error types.
//!
//! Every decode and encode failure in this crate is one of the variants
//! below. Decoding fails atomically: a malformed field anywhere in the
//! message fails the whole operation.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// DNS codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer ended before the next field could be read.
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEnd {
        /// Byte offset where the data ran out.
        offset: usize,
    },

    /// A label header used the reserved `01`/`10` bit patterns.
    #[error("malformed label at offset {offset}: type bits 0x{bits:02X}")]
    MalformedName {
        /// Byte offset of the offending label header.
        offset: usize,
        /// The raw length byte.
        bits: u8,
    },

    /// A compression pointer targeted an offset at or past the end of the
    /// message.
    #[error("compression pointer at offset {offset} targets {target}, past the message end")]
    InvalidPointer {
        /// Offset of the pointer.
        offset: usize,
        /// Target offset the pointer references.
        target: usize,
    },

    /// A compression pointer revisited an offset already followed while
    /// decoding this name.
    #[error("compression pointer cycle through offset {offset}")]
    PointerCycle {
        /// The revisited target offset.
        offset: usize,
    },

    /// Label exceeds 63 bytes.
    #[error("label too long: {length} bytes exceeds maximum of 63")]
    LabelTooLong {
        /// Actual label length.
        length: usize,
    },

    /// Name exceeds 255 wire bytes.
    #[error("name too long: {length} bytes exceeds maximum of 255")]
    NameTooLong {
        /// Actual wire-format length.
        length: usize,
    },

    /// A name built from text contained an empty label, whitespace, or an
    /// embedded dot. Raised on the encode side only.
    #[error("invalid name: {message}")]
    InvalidName {
        /// Description of the offending label.
        message: String,
    },

    /// Opcode outside the assigned registry. Decoding keeps the raw value
    /// as a sentinel; the encoder rejects it with this error.
    #[error("unknown opcode: {value}")]
    UnknownOpcode {
        /// The unassigned opcode value.
        value: u8,
    },

    /// Response code outside the assigned registry, rejected on encode.
    #[error("unknown response code: {value}")]
    UnknownResponseCode {
        /// The unassigned response code value.
        value: u16,
    },

    /// Class value outside the registry. Unlike record types, classes are
    /// rejected on decode as well.
    #[error("unknown record class: {value}")]
    UnknownClass {
        /// The unrecognized class value.
        value: u16,
    },

    /// Record data the encoder cannot serialize (opaque RDATA carried over
    /// from an unrecognized type).
    #[error("unsupported record type for encoding: TYPE{rtype}")]
    UnsupportedType {
        /// The numeric record type.
        rtype: u16,
    },

    /// RDATA did not match the shape its record type requires.
    #[error("bad RDATA for {rtype}: {message}")]
    BadRData {
        /// Record type mnemonic.
        rtype: &'static str,
        /// Description of the mismatch.
        message: String,
    },

    /// OPT pseudo-record with a non-empty owner name, or otherwise
    /// unparsable EDNS data.
    #[error("malformed EDNS: {message}")]
    MalformedEdns {
        /// Description of the violation.
        message: String,
    },

    /// Encoded response exceeds the transport's limit (512 octets for UDP,
    /// 65535 for TCP).
    #[error("response too large: {size} bytes exceeds maximum of {max}")]
    ResponseTooLarge {
        /// Actual encoded size.
        size: usize,
        /// Transport limit.
        max: usize,
    },
}

impl Error {
    /// Creates a new `UnexpectedEnd` error.
    #[inline]
    pub fn unexpected_end(offset: usize) -> Self {
        Self::UnexpectedEnd { offset }
    }

    /// Creates a new `BadRData` error.
    #[inline]
    pub fn bad_rdata(rtype: &'static str, message: impl Into<String>) -> Self {
        Self::BadRData {
            rtype,
            message: message.into(),
        }
    }

    /// Creates a new `BadRData` error for a length mismatch.
    #[inline]
    pub fn rdata_length(rtype: &'static str, expected: usize, actual: usize) -> Self {
        Self::BadRData {
            rtype,
            message: format!("expected {expected} bytes, got {actual}"),
        }
    }

    /// Creates a new `InvalidName` error.
    #[inline]
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::InvalidName {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedEdns` error.
    #[inline]
    pub fn malformed_edns(message: impl Into<String>) -> Self {
        Self::MalformedEdns {
            message: message.into(),
        }
    }

    /// Returns true if this error means the incoming bytes were not a DNS
    /// message at all (drop, don't answer).
    #[inline]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEnd { .. }
                | Self::MalformedName { .. }
                | Self::InvalidPointer { .. }
                | Self::PointerCycle { .. }
                | Self::LabelTooLong { .. }
                | Self::NameTooLong { .. }
        )
    }
}
