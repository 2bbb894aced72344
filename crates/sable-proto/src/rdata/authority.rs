//! Authority record types (SOA).

use crate::error::{Error, Result};
use crate::name::{Name, NameCompressor, NameParser};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOA record - start of authority (RFC 1035).
///
/// Identifies the zone's primary server, the responsible mailbox, the
/// serial, and the transfer/negative-caching timers.
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     MNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    SERIAL                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    REFRESH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     RETRY                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    EXPIRE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    MINIMUM                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SOA {
    /// Primary name server for the zone.
    mname: Name,
    /// Responsible mailbox as a domain name (first label is the local
    /// part; presented with `@` by [`SOA::email`]).
    rname: Name,
    /// Zone serial number.
    serial: u32,
    /// Refresh interval (seconds).
    refresh: u32,
    /// Retry interval (seconds).
    retry: u32,
    /// Expire time (seconds).
    expire: u32,
    /// Minimum TTL / negative caching TTL (seconds).
    minimum: u32,
}

impl SOA {
    /// Creates a new SOA record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Self {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Returns the primary name server.
    #[inline]
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// Returns the responsible mailbox in domain-name form.
    #[inline]
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// Returns the mailbox in `local@domain` form: the first unescaped dot
    /// of the domain-name rendering becomes `@`. Purely presentational;
    /// the wire form always carries the dotted name.
    pub fn email(&self) -> String {
        let rname = self.rname.to_text();
        let mut result = String::with_capacity(rname.len());
        let mut chars = rname.chars();
        let mut replaced = false;

        while let Some(c) = chars.next() {
            if c == '\\' {
                result.push(c);
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            } else if c == '.' && !replaced {
                result.push('@');
                replaced = true;
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Returns the zone serial number.
    #[inline]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns the refresh interval in seconds.
    #[inline]
    pub const fn refresh(&self) -> u32 {
        self.refresh
    }

    /// Returns the retry interval in seconds.
    #[inline]
    pub const fn retry(&self) -> u32 {
        self.retry
    }

    /// Returns the expire time in seconds.
    #[inline]
    pub const fn expire(&self) -> u32 {
        self.expire
    }

    /// Returns the minimum TTL (negative caching TTL) in seconds.
    #[inline]
    pub const fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Parses an SOA record; `offset` is where the RDATA starts.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let parser = NameParser::new(message);

        let (mname, mname_len) = parser.parse_name(offset)?;
        let (rname, rname_len) = parser.parse_name(offset + mname_len)?;

        let nums = offset + mname_len + rname_len;
        if nums + 20 > message.len() {
            return Err(Error::unexpected_end(nums + 20));
        }

        let read_u32 = |at: usize| {
            u32::from_be_bytes(message[at..at + 4].try_into().expect("length checked"))
        };

        Ok(Self {
            mname,
            rname,
            serial: read_u32(nums),
            refresh: read_u32(nums + 4),
            retry: read_u32(nums + 8),
            expire: read_u32(nums + 12),
            minimum: read_u32(nums + 16),
        })
    }

    /// Writes the RDATA. Both names may be compressed; the rname's anchor
    /// accounts for however many octets the mname took.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        let start = buf.len();
        cmp.write_name(buf, &self.mname, position, true)?;
        let rname_position = position + (buf.len() - start);
        cmp.write_name(buf, &self.rname, rname_position, true)?;

        buf.put_u32(self.serial);
        buf.put_u32(self.refresh);
        buf.put_u32(self.retry);
        buf.put_u32(self.expire);
        buf.put_u32(self.minimum);
        Ok(())
    }

    /// RFC 1982 serial arithmetic: true if `serial1` is newer than
    /// `serial2`, with 32-bit wraparound handled.
    pub fn serial_gt(serial1: u32, serial2: u32) -> bool {
        if serial1 == serial2 {
            return false;
        }
        let diff = serial1.wrapping_sub(serial2);
        diff > 0 && diff < 0x8000_0000
    }

    /// Returns true if this SOA's serial is newer than `other`'s.
    pub fn is_newer_than(&self, other: &SOA) -> bool {
        Self::serial_gt(self.serial, other.serial)
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname,
            self.email(),
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> SOA {
        SOA::new(
            Name::from_str("ns1.example.com").unwrap(),
            Name::from_str("hostmaster.example.com").unwrap(),
            2024010101,
            3600,
            900,
            604800,
            86400,
        )
    }

    #[test]
    fn test_soa_fields() {
        let soa = sample();
        assert_eq!(soa.mname().to_string(), "ns1.example.com");
        assert_eq!(soa.serial(), 2024010101);
        assert_eq!(soa.minimum(), 86400);
    }

    #[test]
    fn test_soa_email_presentation() {
        let soa = sample();
        assert_eq!(soa.email(), "hostmaster@example.com");
        // The stored name is untouched.
        assert_eq!(soa.rname().to_string(), "hostmaster.example.com");
    }

    #[test]
    fn test_soa_roundtrip() {
        let soa = sample();

        let mut buf = BytesMut::new();
        let mut cmp = NameCompressor::new();
        soa.encode(&mut buf, &mut cmp, 0).unwrap();

        let parsed = SOA::parse(&buf, 0).unwrap();
        assert_eq!(parsed, soa);
    }

    #[test]
    fn test_soa_rname_compresses_against_mname() {
        let soa = sample();

        let mut buf = BytesMut::new();
        let mut cmp = NameCompressor::new();
        soa.encode(&mut buf, &mut cmp, 0).unwrap();

        // mname is 17 literal bytes; rname shares the "example.com" suffix
        // so it is "hostmaster" (11) plus a 2-byte pointer; 20 fixed bytes.
        assert_eq!(buf.len(), 17 + 11 + 2 + 20);
    }

    #[test]
    fn test_soa_truncated() {
        let mut buf = BytesMut::new();
        let mut cmp = NameCompressor::new();
        sample().encode(&mut buf, &mut cmp, 0).unwrap();
        buf.truncate(buf.len() - 4);

        assert!(matches!(
            SOA::parse(&buf, 0),
            Err(Error::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_serial_arithmetic() {
        assert!(SOA::serial_gt(2, 1));
        assert!(!SOA::serial_gt(1, 2));
        assert!(!SOA::serial_gt(1, 1));

        // Wraparound
        assert!(SOA::serial_gt(1, 0xFFFF_FFFF));
        assert!(!SOA::serial_gt(0xFFFF_FFFF, 1));
        assert!(!SOA::serial_gt(0, 0x8000_0000));
    }
}
