//! DNS resource records.
//!
//! A resource record is the fundamental unit of DNS data: owner name,
//! type, class, TTL, and typed data. OPT pseudo-records share this wire
//! shape but reinterpret the class and TTL fields, so the section walker
//! yields them separately as EDNS data.

use crate::class::RecordClass;
use crate::edns::Edns;
use crate::error::{Error, Result};
use crate::name::{Name, NameCompressor, NameParser};
use crate::rdata::RData;
use crate::rtype::{RecordType, Type};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A DNS resource record.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                      NAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     CLASS                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TTL                      |
/// |                                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   RDLENGTH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RDATA                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// The domain name this record applies to.
    name: Name,
    /// The record type.
    rtype: Type,
    /// The record class.
    rclass: RecordClass,
    /// Time to live in seconds.
    ttl: u32,
    /// The record data.
    rdata: RData,
}

impl ResourceRecord {
    /// Creates a new resource record.
    pub fn new(name: Name, rtype: impl Into<Type>, rclass: RecordClass, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype: rtype.into(),
            rclass,
            ttl,
            rdata,
        }
    }

    /// Creates a record whose type is derived from its RDATA.
    pub fn from_rdata(name: Name, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype: rdata.rtype(),
            rclass: RecordClass::IN,
            ttl,
            rdata,
        }
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::from_rdata(name, ttl, RData::A(crate::rdata::A::new(addr)))
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::from_rdata(name, ttl, RData::AAAA(crate::rdata::AAAA::new(addr)))
    }

    /// Creates an NS record.
    pub fn ns(name: Name, ttl: u32, nsdname: Name) -> Self {
        Self::from_rdata(name, ttl, RData::NS(crate::rdata::NS::new(nsdname)))
    }

    /// Creates a CNAME record.
    pub fn cname(name: Name, ttl: u32, target: Name) -> Self {
        Self::from_rdata(name, ttl, RData::CNAME(crate::rdata::CNAME::new(target)))
    }

    /// Creates a PTR record.
    pub fn ptr(name: Name, ttl: u32, ptrdname: Name) -> Self {
        Self::from_rdata(name, ttl, RData::PTR(crate::rdata::PTR::new(ptrdname)))
    }

    /// Creates an MX record.
    pub fn mx(name: Name, ttl: u32, preference: u16, exchange: Name) -> Self {
        Self::from_rdata(
            name,
            ttl,
            RData::MX(crate::rdata::MX::new(preference, exchange)),
        )
    }

    /// Creates a TXT record from a single string.
    pub fn txt(name: Name, ttl: u32, text: impl Into<Vec<u8>>) -> Self {
        Self::from_rdata(name, ttl, RData::TXT(crate::rdata::TXT::from_string(text)))
    }

    /// Creates an SRV record.
    pub fn srv(name: Name, ttl: u32, priority: u16, weight: u16, port: u16, target: Name) -> Self {
        Self::from_rdata(
            name,
            ttl,
            RData::SRV(crate::rdata::SRV::new(priority, weight, port, target)),
        )
    }

    /// Creates an SOA record.
    pub fn soa(name: Name, ttl: u32, soa: crate::rdata::SOA) -> Self {
        Self::from_rdata(name, ttl, RData::SOA(soa))
    }

    /// Returns the owner name.
    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the record type if registered.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        self.rtype.as_known()
    }

    /// Returns the record class.
    #[inline]
    pub fn rclass(&self) -> RecordClass {
        self.rclass
    }

    /// Returns the TTL in seconds.
    #[inline]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns a copy with a different TTL.
    #[must_use]
    pub fn with_ttl(&self, ttl: u32) -> Self {
        let mut record = self.clone();
        record.ttl = ttl;
        record
    }

    /// Returns the record data.
    #[inline]
    pub fn rdata(&self) -> &RData {
        &self.rdata
    }

    /// Returns true if this record answers the given IN-class type.
    #[inline]
    pub fn is(&self, rtype: RecordType) -> bool {
        self.rtype.is(rtype)
    }

    /// Writes the record. `position` is the absolute offset of the owner
    /// name in the final message; returns the octets written.
    ///
    /// RDATA serializes into a scratch buffer first so RDLENGTH can be
    /// emitted ahead of it; the scratch content is positioned at
    /// `position + name + 10` and the compressor anchors are computed
    /// accordingly.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<usize> {
        let start = buf.len();

        cmp.write_name(buf, &self.name, position, true)?;
        buf.put_u16(self.rtype.to_u16());
        buf.put_u16(self.rclass.to_u16());
        buf.put_u32(self.ttl);

        // The RDATA begins after the 2-octet RDLENGTH still to be written.
        let rdata_position = position + (buf.len() - start) + 2;
        let mut rdata = BytesMut::new();
        self.rdata.encode(&mut rdata, cmp, rdata_position)?;

        buf.put_u16(rdata.len() as u16);
        buf.extend_from_slice(&rdata);

        Ok(buf.len() - start)
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.ttl, self.rclass, self.rtype, self.rdata
        )
    }
}

/// One entry yielded while walking a record section.
#[derive(Debug, Clone)]
pub enum SectionEntry {
    /// A regular resource record.
    Record(ResourceRecord),
    /// An OPT pseudo-record, already reinterpreted as EDNS data.
    Opt(Edns),
}

impl SectionEntry {
    /// Parses one section entry; returns it with the octets consumed.
    pub fn parse(message: &[u8], offset: usize) -> Result<(Self, usize)> {
        let parser = NameParser::new(message);
        let (name, name_len) = parser.parse_name(offset)?;

        let fixed = offset + name_len;
        if fixed + 10 > message.len() {
            return Err(Error::unexpected_end(fixed + 10));
        }

        let rtype_value = u16::from_be_bytes([message[fixed], message[fixed + 1]]);
        let class_value = u16::from_be_bytes([message[fixed + 2], message[fixed + 3]]);
        let ttl = u32::from_be_bytes(
            message[fixed + 4..fixed + 8]
                .try_into()
                .expect("length checked"),
        );
        let rdlength = u16::from_be_bytes([message[fixed + 8], message[fixed + 9]]);

        let rdata_start = fixed + 10;
        let rdata_end = rdata_start + rdlength as usize;
        if rdata_end > message.len() {
            return Err(Error::unexpected_end(rdata_end));
        }

        let consumed = name_len + 10 + rdlength as usize;

        // OPT reinterprets the fixed fields: class is the UDP size, the
        // TTL packs extended RCODE/version/flags. The owner must be root.
        if rtype_value == RecordType::OPT.to_u16() {
            if !name.is_root() {
                return Err(Error::malformed_edns("OPT owner name is not empty"));
            }
            let edns = Edns::parse(class_value, ttl, &message[rdata_start..rdata_end])?;
            return Ok((Self::Opt(edns), consumed));
        }

        let rtype = Type::from_u16(rtype_value);
        let rclass = RecordClass::from_u16(class_value)?;
        let rdata = RData::parse(rclass, rtype, message, rdata_start, rdlength)?;

        Ok((
            Self::Record(ResourceRecord {
                name,
                rtype,
                rclass,
                ttl,
                rdata,
            }),
            consumed,
        ))
    }
}

/// Cursor-walking parser for one record section.
#[derive(Debug)]
pub struct RecordParser<'a> {
    /// The complete message buffer.
    message: &'a [u8],
    /// Current offset into the message.
    offset: usize,
    /// Entries left in this section.
    remaining: u16,
}

impl<'a> RecordParser<'a> {
    /// Creates a parser for `count` entries starting at `offset`.
    #[inline]
    pub const fn new(message: &'a [u8], offset: usize, count: u16) -> Self {
        Self {
            message,
            offset,
            remaining: count,
        }
    }

    /// Returns the current offset.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Parses the next entry, or `None` when the section is exhausted.
    pub fn next_entry(&mut self) -> Result<Option<SectionEntry>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let (entry, consumed) = SectionEntry::parse(self.message, self.offset)?;
        self.offset += consumed;
        self.remaining -= 1;

        Ok(Some(entry))
    }
}
