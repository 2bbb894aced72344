//! Opaque record type handling.

use crate::error::Result;
use bytes::BytesMut;
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// RDATA of an unrecognized record type, preserved as raw bytes.
///
/// Decoding keeps the payload untouched so unrecognized records survive
/// inspection; the message encoder refuses to serialize them. Rendered in
/// RFC 3597 form: `\# <length> <hex-data>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Opaque {
    /// The numeric record type.
    type_code: u16,
    /// The raw RDATA bytes.
    data: Vec<u8>,
}

impl Opaque {
    /// Creates opaque RDATA for the given type code.
    pub fn new(type_code: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_code,
            data: data.into(),
        }
    }

    /// Returns the numeric record type.
    #[inline]
    pub const fn type_code(&self) -> u16 {
        self.type_code
    }

    /// Returns the raw RDATA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Parses opaque RDATA (a straight copy).
    pub fn parse(type_code: u16, data: &[u8]) -> Result<Self> {
        Ok(Self {
            type_code,
            data: data.to_vec(),
        })
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.data.len()
    }

    /// Writes the raw bytes back out. Reachable only from tests and
    /// diagnostic paths; the message encoder rejects opaque RDATA first.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.data);
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\# {} {}", self.data.len(), HEXLOWER.encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_preserved() {
        let opaque = Opaque::new(65534, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(opaque.type_code(), 65534);
        assert_eq!(opaque.data(), &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(opaque.wire_len(), 4);
    }

    #[test]
    fn test_opaque_display() {
        let opaque = Opaque::new(65534, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(opaque.to_string(), "\\# 4 deadbeef");
    }
}
