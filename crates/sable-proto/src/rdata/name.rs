//! Name-based record types (NS, CNAME, PTR, MX).
//!
//! These RDATA shapes are a single embedded domain name, optionally behind
//! a fixed prefix (MX preference). Embedded names may be compressed on the
//! wire, so parsing takes the full message buffer, and encoding goes
//! through the message's name compressor.

use crate::error::{Error, Result};
use crate::name::{Name, NameCompressor, NameParser};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// NS record - authoritative name server (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NS {
    /// The name server domain name.
    nsdname: Name,
}

impl NS {
    /// Creates a new NS record.
    #[inline]
    pub fn new(nsdname: Name) -> Self {
        Self { nsdname }
    }

    /// Returns the name server name.
    #[inline]
    pub fn nsdname(&self) -> &Name {
        &self.nsdname
    }

    /// Parses an NS record; `offset` is where the RDATA starts.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let (nsdname, _) = NameParser::new(message).parse_name(offset)?;
        Ok(Self { nsdname })
    }

    /// Writes the RDATA; `position` is the absolute offset of its first
    /// octet in the final message.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        cmp.write_name(buf, &self.nsdname, position, true)
    }
}

impl fmt::Display for NS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nsdname)
    }
}

/// CNAME record - canonical name alias (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CNAME {
    /// The canonical domain name.
    cname: Name,
}

impl CNAME {
    /// Creates a new CNAME record.
    #[inline]
    pub fn new(cname: Name) -> Self {
        Self { cname }
    }

    /// Returns the canonical name (target).
    #[inline]
    pub fn target(&self) -> &Name {
        &self.cname
    }

    /// Parses a CNAME record; `offset` is where the RDATA starts.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let (cname, _) = NameParser::new(message).parse_name(offset)?;
        Ok(Self { cname })
    }

    /// Writes the RDATA.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        cmp.write_name(buf, &self.cname, position, true)
    }
}

impl fmt::Display for CNAME {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cname)
    }
}

/// PTR record - domain name pointer for reverse lookups (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PTR {
    /// The pointed-to domain name.
    ptrdname: Name,
}

impl PTR {
    /// Creates a new PTR record.
    #[inline]
    pub fn new(ptrdname: Name) -> Self {
        Self { ptrdname }
    }

    /// Returns the pointed-to domain name.
    #[inline]
    pub fn ptrdname(&self) -> &Name {
        &self.ptrdname
    }

    /// Parses a PTR record; `offset` is where the RDATA starts.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let (ptrdname, _) = NameParser::new(message).parse_name(offset)?;
        Ok(Self { ptrdname })
    }

    /// Writes the RDATA.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        cmp.write_name(buf, &self.ptrdname, position, true)
    }
}

impl fmt::Display for PTR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ptrdname)
    }
}

/// MX record - mail exchange (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MX {
    /// The preference (lower is more preferred).
    preference: u16,
    /// The mail exchange domain name.
    exchange: Name,
}

impl MX {
    /// Creates a new MX record.
    #[inline]
    pub fn new(preference: u16, exchange: Name) -> Self {
        Self {
            preference,
            exchange,
        }
    }

    /// Returns the preference value.
    #[inline]
    pub const fn preference(&self) -> u16 {
        self.preference
    }

    /// Returns the mail exchange domain name.
    #[inline]
    pub fn exchange(&self) -> &Name {
        &self.exchange
    }

    /// Parses an MX record; `offset` is where the RDATA starts.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        if offset + 2 > message.len() {
            return Err(Error::unexpected_end(offset + 2));
        }

        let preference = u16::from_be_bytes([message[offset], message[offset + 1]]);
        let (exchange, _) = NameParser::new(message).parse_name(offset + 2)?;

        Ok(Self {
            preference,
            exchange,
        })
    }

    /// Writes the RDATA. The exchange name lands two octets past
    /// `position`, after the preference field.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        buf.put_u16(self.preference);
        cmp.write_name(buf, &self.exchange, position + 2, true)
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

impl PartialOrd for MX {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MX {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Lower preference = higher priority
        self.preference.cmp(&other.preference)
    }
}
