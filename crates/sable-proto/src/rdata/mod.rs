//! DNS record data (RDATA) types.
//!
//! The round-trippable set is A, AAAA, NS, CNAME, PTR, MX, SRV, SOA, TXT,
//! and DS. Everything else decodes as opaque bytes and is rejected by the
//! encoder.

pub mod address;
pub mod authority;
pub mod dnssec;
pub mod name;
pub mod service;
pub mod text;
pub mod unknown;

pub use address::{A, AAAA};
pub use authority::SOA;
pub use dnssec::DS;
pub use name::{CNAME, MX, NS, PTR};
pub use service::SRV;
pub use text::TXT;
pub use unknown::Opaque;

use crate::class::RecordClass;
use crate::error::{Error, Result};
use crate::name::{Name, NameCompressor};
use crate::rtype::{RecordType, Type};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Parsed record data, tagged by record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RData {
    /// IPv4 address (A record)
    A(A),

    /// IPv6 address (AAAA record)
    AAAA(AAAA),

    /// Name server (NS record)
    NS(NS),

    /// Canonical name (CNAME record)
    CNAME(CNAME),

    /// Pointer (PTR record)
    PTR(PTR),

    /// Mail exchange (MX record)
    MX(MX),

    /// Service locator (SRV record)
    SRV(SRV),

    /// Start of authority (SOA record)
    SOA(SOA),

    /// Text (TXT record)
    TXT(TXT),

    /// Delegation signer (DS record)
    DS(DS),

    /// Unrecognized `(class, type)` combination, preserved as raw bytes
    Opaque(Opaque),
}

impl RData {
    /// Parses RDATA from wire format.
    ///
    /// `message` is the complete message buffer so embedded names can
    /// resolve compression pointers; `offset` points at the RDATA start.
    /// Combinations outside the supported set stay opaque.
    pub fn parse(
        rclass: RecordClass,
        rtype: Type,
        message: &[u8],
        offset: usize,
        rdlength: u16,
    ) -> Result<Self> {
        let end = offset + rdlength as usize;
        let slice = message
            .get(offset..end)
            .ok_or_else(|| Error::unexpected_end(end))?;

        let known = match rtype.as_known() {
            Some(t) if rclass == RecordClass::IN => t,
            _ => return Ok(Self::Opaque(Opaque::parse(rtype.to_u16(), slice)?)),
        };

        match known {
            RecordType::A => Ok(Self::A(A::parse(slice)?)),
            RecordType::AAAA => Ok(Self::AAAA(AAAA::parse(slice)?)),
            RecordType::NS => Ok(Self::NS(NS::parse(message, offset)?)),
            RecordType::CNAME => Ok(Self::CNAME(CNAME::parse(message, offset)?)),
            RecordType::PTR => Ok(Self::PTR(PTR::parse(message, offset)?)),
            RecordType::MX => Ok(Self::MX(MX::parse(message, offset)?)),
            RecordType::SRV => Ok(Self::SRV(SRV::parse(message, offset)?)),
            RecordType::SOA => Ok(Self::SOA(SOA::parse(message, offset)?)),
            RecordType::TXT => Ok(Self::TXT(TXT::parse(slice)?)),
            RecordType::DS => Ok(Self::DS(DS::parse(slice)?)),
            _ => Ok(Self::Opaque(Opaque::parse(rtype.to_u16(), slice)?)),
        }
    }

    /// Returns the record type this RDATA belongs to.
    pub fn rtype(&self) -> Type {
        match self {
            Self::A(_) => Type::Known(RecordType::A),
            Self::AAAA(_) => Type::Known(RecordType::AAAA),
            Self::NS(_) => Type::Known(RecordType::NS),
            Self::CNAME(_) => Type::Known(RecordType::CNAME),
            Self::PTR(_) => Type::Known(RecordType::PTR),
            Self::MX(_) => Type::Known(RecordType::MX),
            Self::SRV(_) => Type::Known(RecordType::SRV),
            Self::SOA(_) => Type::Known(RecordType::SOA),
            Self::TXT(_) => Type::Known(RecordType::TXT),
            Self::DS(_) => Type::Known(RecordType::DS),
            Self::Opaque(o) => Type::from_u16(o.type_code()),
        }
    }

    /// Writes the RDATA into `buf`.
    ///
    /// `position` is the absolute offset of the RDATA's first octet in the
    /// final message, so embedded names compress with correct anchors.
    /// Opaque payloads are rejected.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        match self {
            Self::A(r) => r.encode(buf),
            Self::AAAA(r) => r.encode(buf),
            Self::NS(r) => r.encode(buf, cmp, position)?,
            Self::CNAME(r) => r.encode(buf, cmp, position)?,
            Self::PTR(r) => r.encode(buf, cmp, position)?,
            Self::MX(r) => r.encode(buf, cmp, position)?,
            Self::SRV(r) => r.encode(buf, cmp, position)?,
            Self::SOA(r) => r.encode(buf, cmp, position)?,
            Self::TXT(r) => r.encode(buf),
            Self::DS(r) => r.encode(buf),
            Self::Opaque(o) => {
                return Err(Error::UnsupportedType {
                    rtype: o.type_code(),
                });
            }
        }
        Ok(())
    }

    /// Returns the IPv4 address if this is an A record.
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        match self {
            Self::A(a) => Some(a.address()),
            _ => None,
        }
    }

    /// Returns the IPv6 address if this is an AAAA record.
    pub fn as_aaaa(&self) -> Option<Ipv6Addr> {
        match self {
            Self::AAAA(aaaa) => Some(aaaa.address()),
            _ => None,
        }
    }

    /// Returns the target name if this is a CNAME record.
    pub fn as_cname(&self) -> Option<&Name> {
        match self {
            Self::CNAME(cname) => Some(cname.target()),
            _ => None,
        }
    }

    /// Returns the SOA payload if this is an SOA record.
    pub fn as_soa(&self) -> Option<&SOA> {
        match self {
            Self::SOA(soa) => Some(soa),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(r) => write!(f, "{r}"),
            Self::AAAA(r) => write!(f, "{r}"),
            Self::NS(r) => write!(f, "{r}"),
            Self::CNAME(r) => write!(f, "{r}"),
            Self::PTR(r) => write!(f, "{r}"),
            Self::MX(r) => write!(f, "{r}"),
            Self::SRV(r) => write!(f, "{r}"),
            Self::SOA(r) => write!(f, "{r}"),
            Self::TXT(r) => write!(f, "{r}"),
            Self::DS(r) => write!(f, "{r}"),
            Self::Opaque(r) => write!(f, "{r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_unknown_type_stays_opaque() {
        let payload = [0xde, 0xad, 0xbe, 0xef];
        let rdata = RData::parse(
            RecordClass::IN,
            Type::Unknown(65000),
            &payload,
            0,
            payload.len() as u16,
        )
        .unwrap();

        assert!(matches!(rdata, RData::Opaque(_)));
        assert_eq!(rdata.rtype(), Type::Unknown(65000));
    }

    #[test]
    fn test_opaque_rejected_on_encode() {
        let rdata = RData::Opaque(Opaque::new(65000, vec![1, 2, 3]));
        let mut buf = BytesMut::new();
        let mut cmp = NameCompressor::new();

        assert_eq!(
            rdata.encode(&mut buf, &mut cmp, 0),
            Err(Error::UnsupportedType { rtype: 65000 })
        );
    }

    #[test]
    fn test_non_internet_class_stays_opaque() {
        // CH-class payloads are not interpreted.
        let payload = [1, 2, 3, 4];
        let rdata = RData::parse(
            RecordClass::CH,
            Type::Known(RecordType::A),
            &payload,
            0,
            4,
        )
        .unwrap();
        assert!(matches!(rdata, RData::Opaque(_)));
    }

    #[test]
    fn test_rdlength_overrun() {
        let payload = [1, 2];
        assert!(matches!(
            RData::parse(RecordClass::IN, Type::Known(RecordType::A), &payload, 0, 4),
            Err(Error::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_accessors() {
        let a = RData::A(A::new(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(a.as_a(), Some(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(a.as_cname(), None);

        let cname = RData::CNAME(CNAME::new(Name::from_str("www.example.com").unwrap()));
        assert_eq!(cname.as_cname().unwrap().to_string(), "www.example.com");
    }
}
