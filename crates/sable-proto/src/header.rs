//! DNS message header.
//!
//! The DNS header is a fixed 12-byte structure at the start of every
//! message: an ID, a flags word carrying the opcode and response code, and
//! the four section counts.

use crate::error::{Error, Result};
use crate::opcode::OpCode;
use crate::rcode::ResponseCode;
use bitflags::bitflags;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the DNS header in bytes.
pub const HEADER_SIZE: usize = 12;

bitflags! {
    /// DNS header flags.
    ///
    /// The Z bit is reserved-zero but preserved verbatim so decoded
    /// messages re-encode bit-for-bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HeaderFlags: u16 {
        /// Query/Response flag: 0 = query, 1 = response
        const QR = 0x8000;

        /// Authoritative Answer
        const AA = 0x0400;

        /// Truncation
        const TC = 0x0200;

        /// Recursion Desired
        const RD = 0x0100;

        /// Recursion Available
        const RA = 0x0080;

        /// Reserved for future use (must be zero)
        const Z = 0x0040;

        /// Authentic Data (DNSSEC)
        const AD = 0x0020;

        /// Checking Disabled (DNSSEC)
        const CD = 0x0010;
    }
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// DNS message header.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    QDCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ANCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    NSCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ARCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Message identifier, echoed in the response.
    pub id: u16,

    /// Header flags (QR, AA, TC, RD, RA, Z, AD, CD).
    pub flags: HeaderFlags,

    /// Operation code. Unassigned wire values survive as a sentinel and
    /// are rejected on encode.
    pub opcode: OpCode,

    /// Response code. The full 12-bit value; the upper 8 bits travel in
    /// the OPT record when present.
    pub rcode: ResponseCode,

    /// Number of questions.
    pub qd_count: u16,

    /// Number of answer records.
    pub an_count: u16,

    /// Number of authority records.
    pub ns_count: u16,

    /// Number of additional records.
    pub ar_count: u16,
}

impl Header {
    /// Creates a new header with the given message ID.
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            flags: HeaderFlags::empty(),
            opcode: OpCode::Query,
            rcode: ResponseCode::NoError,
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }

    /// Creates a query header with a random ID and RD set.
    pub fn query() -> Self {
        Self {
            id: rand::random(),
            flags: HeaderFlags::RD,
            opcode: OpCode::Query,
            rcode: ResponseCode::NoError,
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }

    /// Creates a response header echoing a query's ID, opcode, and RD bit.
    pub fn response_to(query: &Header) -> Self {
        Self {
            id: query.id,
            flags: HeaderFlags::QR | (query.flags & HeaderFlags::RD),
            opcode: query.opcode,
            rcode: ResponseCode::NoError,
            qd_count: query.qd_count,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }

    /// Returns true if this is a query.
    #[inline]
    pub fn is_query(&self) -> bool {
        !self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if the AA flag is set.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.flags.contains(HeaderFlags::AA)
    }

    /// Returns true if the TC flag is set.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TC)
    }

    /// Returns true if the RD flag is set.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.flags.contains(HeaderFlags::RD)
    }

    /// Returns true if the RA flag is set.
    #[inline]
    pub fn recursion_available(&self) -> bool {
        self.flags.contains(HeaderFlags::RA)
    }

    /// Returns true if the AD flag is set.
    #[inline]
    pub fn is_authentic_data(&self) -> bool {
        self.flags.contains(HeaderFlags::AD)
    }

    /// Returns true if the CD flag is set.
    #[inline]
    pub fn checking_disabled(&self) -> bool {
        self.flags.contains(HeaderFlags::CD)
    }

    /// Sets or clears the QR flag.
    #[inline]
    pub fn set_response(&mut self, response: bool) {
        self.flags.set(HeaderFlags::QR, response);
    }

    /// Sets or clears the AA flag.
    #[inline]
    pub fn set_authoritative(&mut self, aa: bool) {
        self.flags.set(HeaderFlags::AA, aa);
    }

    /// Sets or clears the RD flag.
    #[inline]
    pub fn set_recursion_desired(&mut self, rd: bool) {
        self.flags.set(HeaderFlags::RD, rd);
    }

    /// Sets or clears the RA flag.
    #[inline]
    pub fn set_recursion_available(&mut self, ra: bool) {
        self.flags.set(HeaderFlags::RA, ra);
    }

    /// Parses a header from the start of a message buffer.
    ///
    /// Unassigned opcode and rcode values become sentinels rather than
    /// failing; an extended rcode byte from an OPT record is merged in
    /// later by the message decoder.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::unexpected_end(data.len()));
        }

        let id = u16::from_be_bytes([data[0], data[1]]);
        let raw_flags = u16::from_be_bytes([data[2], data[3]]);

        let opcode = OpCode::from_u8(((raw_flags >> 11) & 0x0F) as u8);
        let rcode = ResponseCode::from_u16(raw_flags & 0x0F);

        let mask = HeaderFlags::all().bits();
        let flags = HeaderFlags::from_bits_truncate(raw_flags & mask);

        Ok(Self {
            id,
            flags,
            opcode,
            rcode,
            qd_count: u16::from_be_bytes([data[4], data[5]]),
            an_count: u16::from_be_bytes([data[6], data[7]]),
            ns_count: u16::from_be_bytes([data[8], data[9]]),
            ar_count: u16::from_be_bytes([data[10], data[11]]),
        })
    }

    /// Serializes the header.
    ///
    /// Fails on sentinel opcode or response-code values; only the low
    /// nibble of the response code is written here.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if !self.opcode.is_assigned() {
            return Err(Error::UnknownOpcode {
                value: self.opcode.to_u8(),
            });
        }
        if !self.rcode.is_assigned() {
            return Err(Error::UnknownResponseCode {
                value: self.rcode.to_u16(),
            });
        }

        let mut raw_flags = self.flags.bits();
        raw_flags |= u16::from(self.opcode.to_u8()) << 11;
        raw_flags |= u16::from(self.rcode.header_rcode());

        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&raw_flags.to_be_bytes());
        buf.extend_from_slice(&self.qd_count.to_be_bytes());
        buf.extend_from_slice(&self.an_count.to_be_bytes());
        buf.extend_from_slice(&self.ns_count.to_be_bytes());
        buf.extend_from_slice(&self.ar_count.to_be_bytes());
        Ok(())
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID:{:04X} {} {}",
            self.id, self.opcode, self.rcode
        )?;

        if self.is_response() {
            write!(f, " QR")?;
        }
        if self.is_authoritative() {
            write!(f, " AA")?;
        }
        if self.is_truncated() {
            write!(f, " TC")?;
        }
        if self.recursion_desired() {
            write!(f, " RD")?;
        }
        if self.recursion_available() {
            write!(f, " RA")?;
        }
        if self.is_authentic_data() {
            write!(f, " AD")?;
        }
        if self.checking_disabled() {
            write!(f, " CD")?;
        }

        write!(
            f,
            " QD:{} AN:{} NS:{} AR:{}",
            self.qd_count, self.an_count, self.ns_count, self.ar_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let mut header = Header::new(0x1234);
        header.set_recursion_desired(true);
        header.qd_count = 1;

        let mut buf = BytesMut::new();
        header.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);

        let parsed = Header::parse(&buf).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_flag_bits() {
        // id=0x007B, flags=0x0100 (RD), one question
        let data = [0x00, 0x7B, 0x01, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0];
        let header = Header::parse(&data).unwrap();

        assert_eq!(header.id, 0x007B);
        assert!(header.is_query());
        assert!(header.recursion_desired());
        assert!(!header.recursion_available());
        assert_eq!(header.opcode, OpCode::Query);
        assert_eq!(header.qd_count, 1);
    }

    #[test]
    fn test_header_sentinel_opcode() {
        // Opcode 3 (reserved) in bits 11-14
        let data = [0, 0, 0x18, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        let header = Header::parse(&data).unwrap();
        assert_eq!(header.opcode, OpCode::Unassigned(3));

        let mut buf = BytesMut::new();
        assert_eq!(
            header.encode(&mut buf),
            Err(Error::UnknownOpcode { value: 3 })
        );
    }

    #[test]
    fn test_header_sentinel_rcode() {
        let data = [0, 0, 0x80, 0x0C, 0, 0, 0, 0, 0, 0, 0, 0];
        let header = Header::parse(&data).unwrap();
        assert_eq!(header.rcode, ResponseCode::Unassigned(12));

        let mut buf = BytesMut::new();
        assert_eq!(
            header.encode(&mut buf),
            Err(Error::UnknownResponseCode { value: 12 })
        );
    }

    #[test]
    fn test_header_parse_too_short() {
        assert!(matches!(
            Header::parse(&[0; 10]),
            Err(Error::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_response_to_query() {
        let mut query = Header::query();
        query.qd_count = 1;
        let response = Header::response_to(&query);

        assert_eq!(query.id, response.id);
        assert!(query.is_query());
        assert!(response.is_response());
        assert_eq!(query.recursion_desired(), response.recursion_desired());
        assert_eq!(response.qd_count, 1);
    }
}
