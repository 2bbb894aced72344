//! EDNS(0) support (RFC 6891).
//!
//! EDNS rides in the OPT pseudo-record: the record's class field carries
//! the advertised UDP payload size, the TTL field packs the extended
//! RCODE, version, and flags, and the RDATA is a sequence of
//! `(code, length, data)` option TLVs. The OPT record belongs in the
//! additional section with an empty owner name; placement is validated by
//! the server, not by this codec.

use crate::error::{Error, Result};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mask of the DO (DNSSEC OK) bit inside the OPT flags word.
const FLAG_DO: u16 = 0x8000;

/// A single EDNS option TLV.
///
/// Option semantics are opaque to this codec; code and payload round-trip
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdnsOption {
    /// Option code.
    pub code: u16,
    /// Option payload.
    pub data: Vec<u8>,
}

impl EdnsOption {
    /// Creates a new option.
    pub fn new(code: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            data: data.into(),
        }
    }
}

/// EDNS(0) data carried by an OPT pseudo-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edns {
    /// Advertised UDP payload size, as sent. Consumers clamp to >= 512
    /// where the protocol requires it.
    udp_size: u16,
    /// Extended RCODE byte (upper 8 bits of the 12-bit response code).
    extended_rcode: u8,
    /// EDNS version. Only version 0 is served; higher versions still
    /// decode so the server can answer BADVERS.
    version: u8,
    /// DNSSEC OK flag.
    dnssec_ok: bool,
    /// Remaining 15 flag bits, preserved verbatim.
    flags: u16,
    /// Option TLVs in wire order.
    options: Vec<EdnsOption>,
}

impl Edns {
    /// Default advertised UDP payload size.
    pub const DEFAULT_UDP_SIZE: u16 = 4096;

    /// Creates EDNS data with default settings.
    pub fn new() -> Self {
        Self {
            udp_size: Self::DEFAULT_UDP_SIZE,
            extended_rcode: 0,
            version: 0,
            dnssec_ok: false,
            flags: 0,
            options: Vec::new(),
        }
    }

    /// Creates EDNS data advertising the given UDP size.
    pub fn with_udp_size(udp_size: u16) -> Self {
        Self {
            udp_size,
            ..Self::new()
        }
    }

    /// Returns the advertised UDP payload size exactly as sent.
    #[inline]
    pub const fn udp_size(&self) -> u16 {
        self.udp_size
    }

    /// Returns the advertised UDP size clamped to the protocol floor of
    /// 512 octets.
    #[inline]
    pub fn effective_udp_size(&self) -> u16 {
        self.udp_size.max(512)
    }

    /// Sets the advertised UDP payload size.
    pub fn set_udp_size(&mut self, size: u16) {
        self.udp_size = size;
    }

    /// Returns the extended RCODE byte.
    #[inline]
    pub const fn extended_rcode(&self) -> u8 {
        self.extended_rcode
    }

    /// Returns the EDNS version.
    #[inline]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Sets the EDNS version.
    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    /// Returns true if the DNSSEC OK flag is set.
    #[inline]
    pub const fn dnssec_ok(&self) -> bool {
        self.dnssec_ok
    }

    /// Sets the DNSSEC OK flag.
    pub fn set_dnssec_ok(&mut self, ok: bool) {
        self.dnssec_ok = ok;
    }

    /// Returns the 15 flag bits besides DO.
    #[inline]
    pub const fn flags(&self) -> u16 {
        self.flags
    }

    /// Returns the option TLVs.
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Appends an option TLV.
    pub fn add_option(&mut self, option: EdnsOption) {
        self.options.push(option);
    }

    /// Parses EDNS data from an OPT record's class, TTL, and RDATA.
    ///
    /// Per RFC 6891 the class field IS the UDP size; it is preserved, not
    /// reinterpreted as a class.
    pub fn parse(class: u16, ttl: u32, rdata: &[u8]) -> Result<Self> {
        let extended_rcode = (ttl >> 24) as u8;
        let version = ((ttl >> 16) & 0xFF) as u8;
        let raw_flags = (ttl & 0xFFFF) as u16;

        let mut options = Vec::new();
        let mut pos = 0;

        while pos < rdata.len() {
            if pos + 4 > rdata.len() {
                return Err(Error::malformed_edns("truncated option header"));
            }
            let code = u16::from_be_bytes([rdata[pos], rdata[pos + 1]]);
            let length = u16::from_be_bytes([rdata[pos + 2], rdata[pos + 3]]) as usize;
            pos += 4;

            if pos + length > rdata.len() {
                return Err(Error::malformed_edns(format!(
                    "option {code} length {length} exceeds RDATA"
                )));
            }
            options.push(EdnsOption::new(code, &rdata[pos..pos + length]));
            pos += length;
        }

        Ok(Self {
            udp_size: class,
            extended_rcode,
            version,
            dnssec_ok: raw_flags & FLAG_DO != 0,
            flags: raw_flags & !FLAG_DO,
            options,
        })
    }

    /// Returns the RDATA length (option TLVs only).
    pub fn rdata_len(&self) -> usize {
        self.options.iter().map(|o| 4 + o.data.len()).sum()
    }

    /// Returns the full pseudo-record length on the wire.
    pub fn wire_len(&self) -> usize {
        // root name (1) + TYPE (2) + CLASS (2) + TTL (4) + RDLENGTH (2)
        11 + self.rdata_len()
    }

    /// Writes the OPT pseudo-record.
    ///
    /// `extended_rcode` comes from the message's response code; the upper
    /// eight bits of an extended code live here rather than in the header.
    pub fn encode(&self, buf: &mut BytesMut, extended_rcode: u8) {
        buf.put_u8(0); // empty owner name
        buf.put_u16(41); // OPT
        buf.put_u16(self.udp_size);

        let flags = self.flags | if self.dnssec_ok { FLAG_DO } else { 0 };
        let ttl = u32::from(extended_rcode) << 24
            | u32::from(self.version) << 16
            | u32::from(flags);
        buf.put_u32(ttl);

        buf.put_u16(self.rdata_len() as u16);
        for option in &self.options {
            buf.put_u16(option.code);
            buf.put_u16(option.data.len() as u16);
            buf.extend_from_slice(&option.data);
        }
    }
}

impl Default for Edns {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Edns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EDNS(version={}, udp={}, do={})",
            self.version, self.udp_size, self.dnssec_ok
        )?;

        for option in &self.options {
            write!(f, " [opt {}: {} bytes]", option.code, option.data.len())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edns_defaults() {
        let edns = Edns::new();
        assert_eq!(edns.version(), 0);
        assert_eq!(edns.udp_size(), 4096);
        assert!(!edns.dnssec_ok());
        assert!(edns.options().is_empty());
    }

    #[test]
    fn test_edns_roundtrip() {
        let mut original = Edns::with_udp_size(1232);
        original.set_dnssec_ok(true);
        original.add_option(EdnsOption::new(10, vec![1, 2, 3, 4, 5, 6, 7, 8]));

        let mut buf = BytesMut::new();
        original.encode(&mut buf, 0);

        // Fields sit after the 1-byte name and 2-byte type.
        let class = u16::from_be_bytes([buf[3], buf[4]]);
        let ttl = u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]);
        let rdlength = u16::from_be_bytes([buf[9], buf[10]]) as usize;
        let rdata = &buf[11..11 + rdlength];

        let parsed = Edns::parse(class, ttl, rdata).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.udp_size(), 1232);
        assert!(parsed.dnssec_ok());
        assert_eq!(parsed.options().len(), 1);
    }

    #[test]
    fn test_edns_version_preserved() {
        // Version 1 decodes; the server answers BADVERS, the codec does
        // not reject.
        let edns = Edns::parse(512, 1 << 16, &[]).unwrap();
        assert_eq!(edns.version(), 1);
    }

    #[test]
    fn test_edns_udp_size_not_clamped_in_storage() {
        let edns = Edns::parse(100, 0, &[]).unwrap();
        assert_eq!(edns.udp_size(), 100);
        assert_eq!(edns.effective_udp_size(), 512);
    }

    #[test]
    fn test_edns_truncated_option() {
        assert!(matches!(
            Edns::parse(512, 0, &[0, 10, 0, 8, 1, 2]),
            Err(Error::MalformedEdns { .. })
        ));
        assert!(matches!(
            Edns::parse(512, 0, &[0, 10]),
            Err(Error::MalformedEdns { .. })
        ));
    }

    #[test]
    fn test_extended_rcode_in_ttl_byte() {
        let edns = Edns::new();
        let mut buf = BytesMut::new();
        edns.encode(&mut buf, 1);
        // TTL high byte carries the extended RCODE.
        assert_eq!(buf[5], 1);
    }
}
