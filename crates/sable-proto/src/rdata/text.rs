//! Text record types (TXT).

use crate::error::{Error, Result};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// TXT record - text strings (RFC 1035).
///
/// A TXT record carries one or more character-strings, each up to 255
/// bytes. The segmentation is significant on the wire and is preserved
/// exactly; [`TXT::text`] gives the joined semantic value for protocols
/// like SPF that span segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TXT {
    /// The character-strings, each up to 255 bytes.
    strings: SmallVec<[Vec<u8>; 2]>,
}

impl TXT {
    /// Creates a TXT record from a sequence of strings.
    pub fn new(strings: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Self {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a TXT record holding a single string.
    pub fn from_string(s: impl Into<Vec<u8>>) -> Self {
        Self {
            strings: smallvec::smallvec![s.into()],
        }
    }

    /// Returns the character-strings.
    pub fn strings(&self) -> &[Vec<u8>] {
        &self.strings
    }

    /// Returns the single string when exactly one segment is present.
    pub fn single(&self) -> Option<&[u8]> {
        match self.strings.as_slice() {
            [one] => Some(one),
            _ => None,
        }
    }

    /// Returns all segments joined, as UTF-8 if valid.
    pub fn text(&self) -> Option<String> {
        let joined: Vec<u8> = self
            .strings
            .iter()
            .flat_map(|s| s.iter().copied())
            .collect();
        String::from_utf8(joined).ok()
    }

    /// Parses a TXT record from its RDATA.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut strings = SmallVec::new();
        let mut pos = 0;

        while pos < data.len() {
            let len = data[pos] as usize;
            pos += 1;

            if pos + len > data.len() {
                return Err(Error::bad_rdata(
                    "TXT",
                    format!("string length {len} exceeds remaining data"),
                ));
            }

            strings.push(data[pos..pos + len].to_vec());
            pos += len;
        }

        Ok(Self { strings })
    }

    /// Returns the wire format length.
    pub fn wire_len(&self) -> usize {
        self.strings.iter().map(|s| 1 + s.len()).sum()
    }

    /// Writes the RDATA.
    ///
    /// Oversized segments are split into 255-byte chunks.
    pub fn encode(&self, buf: &mut BytesMut) {
        for s in &self.strings {
            if s.is_empty() {
                buf.put_u8(0);
                continue;
            }
            for chunk in s.chunks(255) {
                buf.put_u8(chunk.len() as u8);
                buf.extend_from_slice(chunk);
            }
        }
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for s in &self.strings {
            if !first {
                write!(f, " ")?;
            }
            first = false;

            write!(f, "\"")?;
            for &byte in s {
                if byte == b'"' || byte == b'\\' {
                    write!(f, "\\{}", byte as char)?;
                } else if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "{}", byte as char)?;
                } else {
                    write!(f, "\\{byte:03}")?;
                }
            }
            write!(f, "\"")?;
        }
        Ok(())
    }
}
