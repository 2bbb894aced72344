//! DNS question section.
//!
//! Question entries carry an owner name, a query type, and a query class;
//! unlike resource records they have no TTL or RDATA.

use crate::class::RecordClass;
use crate::error::Result;
use crate::name::{Name, NameCompressor, NameParser};
use crate::rtype::{RecordType, Type};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS question.
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     QNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     QTYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     QCLASS                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The domain name being queried.
    pub qname: Name,

    /// The type of record being requested.
    pub qtype: Type,

    /// The class of the query (IN for virtually all traffic).
    pub qclass: RecordClass,
}

impl Question {
    /// Creates a new question.
    #[inline]
    pub fn new(qname: Name, qtype: impl Into<Type>, qclass: RecordClass) -> Self {
        Self {
            qname,
            qtype: qtype.into(),
            qclass,
        }
    }

    /// Creates an IN A question.
    #[inline]
    pub fn a(name: Name) -> Self {
        Self::new(name, RecordType::A, RecordClass::IN)
    }

    /// Creates an IN AAAA question.
    #[inline]
    pub fn aaaa(name: Name) -> Self {
        Self::new(name, RecordType::AAAA, RecordClass::IN)
    }

    /// Creates an IN MX question.
    #[inline]
    pub fn mx(name: Name) -> Self {
        Self::new(name, RecordType::MX, RecordClass::IN)
    }

    /// Creates an IN TXT question.
    #[inline]
    pub fn txt(name: Name) -> Self {
        Self::new(name, RecordType::TXT, RecordClass::IN)
    }

    /// Creates an IN SOA question.
    #[inline]
    pub fn soa(name: Name) -> Self {
        Self::new(name, RecordType::SOA, RecordClass::IN)
    }

    /// Creates an IN PTR question.
    #[inline]
    pub fn ptr(name: Name) -> Self {
        Self::new(name, RecordType::PTR, RecordClass::IN)
    }

    /// Returns the query type if registered.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        self.qtype.as_known()
    }

    /// Returns true if this asks for an IN record of the given type.
    #[inline]
    pub fn is_in(&self, rtype: RecordType) -> bool {
        self.qclass == RecordClass::IN && self.qtype.is(rtype)
    }

    /// Parses a question entry; returns it with the octets consumed.
    pub fn parse(message: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (qname, name_len) = NameParser::new(message).parse_name(offset)?;

        let fixed = offset + name_len;
        if fixed + 4 > message.len() {
            return Err(crate::error::Error::unexpected_end(fixed + 4));
        }

        let qtype = Type::from_u16(u16::from_be_bytes([message[fixed], message[fixed + 1]]));
        let qclass =
            RecordClass::from_u16(u16::from_be_bytes([message[fixed + 2], message[fixed + 3]]))?;

        Ok((
            Self {
                qname,
                qtype,
                qclass,
            },
            name_len + 4,
        ))
    }

    /// Writes the question. `position` is the absolute offset of the owner
    /// name in the final message.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        cmp.write_name(buf, &self.qname, position, true)?;
        buf.put_u16(self.qtype.to_u16());
        buf.put_u16(self.qclass.to_u16());
        Ok(())
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.qname, self.qclass, self.qtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::str::FromStr;

    #[test]
    fn test_question_roundtrip() {
        let q = Question::txt(Name::from_str("example.com").unwrap());

        let mut buf = BytesMut::new();
        let mut cmp = NameCompressor::new();
        q.encode(&mut buf, &mut cmp, 0).unwrap();

        let (parsed, consumed) = Question::parse(&buf, 0).unwrap();
        assert_eq!(parsed, q);
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn test_question_unknown_class_rejected() {
        let mut buf = BytesMut::new();
        let mut cmp = NameCompressor::new();
        let name = Name::from_str("example.com").unwrap();
        cmp.write_name(&mut buf, &name, 0, true).unwrap();
        buf.put_u16(1); // A
        buf.put_u16(999); // bogus class

        assert_eq!(
            Question::parse(&buf, 0).unwrap_err(),
            Error::UnknownClass { value: 999 }
        );
    }

    #[test]
    fn test_question_unknown_type_tolerated() {
        let mut buf = BytesMut::new();
        let mut cmp = NameCompressor::new();
        let name = Name::from_str("example.com").unwrap();
        cmp.write_name(&mut buf, &name, 0, true).unwrap();
        buf.put_u16(65000);
        buf.put_u16(1);

        let (q, _) = Question::parse(&buf, 0).unwrap();
        assert_eq!(q.qtype, Type::Unknown(65000));
    }

    #[test]
    fn test_is_in() {
        let q = Question::a(Name::from_str("example.com").unwrap());
        assert!(q.is_in(RecordType::A));
        assert!(!q.is_in(RecordType::AAAA));
    }
}
