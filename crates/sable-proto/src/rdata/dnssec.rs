//! DNSSEC record types (DS).
//!
//! Only the delegation signer is round-trippable here; validation and the
//! remaining DNSSEC types are out of scope.

use crate::error::{Error, Result};
use bytes::{BufMut, BytesMut};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DS record - delegation signer (RFC 4034).
///
/// Links a child zone's DNSKEY into its parent via a digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DS {
    /// Key tag of the referenced DNSKEY.
    key_tag: u16,
    /// Signing algorithm number.
    algorithm: u8,
    /// Digest algorithm number.
    digest_type: u8,
    /// Digest bytes.
    digest: Vec<u8>,
}

impl DS {
    /// Creates a new DS record.
    pub fn new(key_tag: u16, algorithm: u8, digest_type: u8, digest: impl Into<Vec<u8>>) -> Self {
        Self {
            key_tag,
            algorithm,
            digest_type,
            digest: digest.into(),
        }
    }

    /// Returns the key tag.
    #[inline]
    pub const fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// Returns the algorithm number.
    #[inline]
    pub const fn algorithm(&self) -> u8 {
        self.algorithm
    }

    /// Returns the digest type.
    #[inline]
    pub const fn digest_type(&self) -> u8 {
        self.digest_type
    }

    /// Returns the digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Returns the digest as lowercase hex.
    pub fn digest_hex(&self) -> String {
        HEXLOWER.encode(&self.digest)
    }

    /// Parses a DS record from its RDATA.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::bad_rdata("DS", "shorter than the fixed header"));
        }

        Ok(Self {
            key_tag: u16::from_be_bytes([data[0], data[1]]),
            algorithm: data[2],
            digest_type: data[3],
            digest: data[4..].to_vec(),
        })
    }

    /// Returns the wire format length.
    pub fn wire_len(&self) -> usize {
        4 + self.digest.len()
    }

    /// Writes the RDATA.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.key_tag);
        buf.put_u8(self.algorithm);
        buf.put_u8(self.digest_type);
        buf.extend_from_slice(&self.digest);
    }
}

impl fmt::Display for DS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            self.digest_hex()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ds_roundtrip() {
        let ds = DS::new(60485, 5, 1, vec![0x2b, 0xb1, 0x83, 0xaf]);
        let mut buf = BytesMut::new();
        ds.encode(&mut buf);

        let parsed = DS::parse(&buf).unwrap();
        assert_eq!(parsed, ds);
        assert_eq!(parsed.key_tag(), 60485);
        assert_eq!(parsed.digest_hex(), "2bb183af");
    }

    #[test]
    fn test_ds_too_short() {
        assert!(matches!(
            DS::parse(&[0, 1, 2]),
            Err(Error::BadRData { rtype: "DS", .. })
        ));
    }

    #[test]
    fn test_ds_display() {
        let ds = DS::new(1, 8, 2, vec![0xde, 0xad]);
        assert_eq!(ds.to_string(), "1 8 2 dead");
    }
}
