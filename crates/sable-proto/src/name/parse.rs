//! Name decoding from wire format with compression support.
//!
//! Decoding walks length-prefixed labels and follows compression pointers
//! (RFC 1035 Section 4.1.4) against the full message buffer. Each pointer
//! target may be visited at most once per name; a revisit is a cycle and
//! fails the decode.

use super::Name;
use crate::MAX_NAME_LENGTH;
use crate::error::{Error, Result};
use smallvec::SmallVec;

/// Parser for reading domain names from DNS wire format.
///
/// Holds the complete message buffer so compression pointers can be
/// resolved from anywhere inside it.
#[derive(Debug, Clone)]
pub struct NameParser<'a> {
    /// The complete message buffer.
    message: &'a [u8],
}

impl<'a> NameParser<'a> {
    /// Creates a new name parser over the given message buffer.
    #[inline]
    pub const fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    /// Parses a domain name starting at the given offset.
    ///
    /// Returns the parsed name and the number of octets consumed in the
    /// original stream: everything up to and including the first pointer
    /// (two octets), never the expanded length. Callers use the count to
    /// keep their section cursor aligned.
    pub fn parse_name(&self, offset: usize) -> Result<(Name, usize)> {
        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut consumed = 0;
        let mut pos = offset;
        let mut followed_pointer = false;
        let mut visited: SmallVec<[u16; 8]> = SmallVec::new();
        let mut label_count = 0u8;

        loop {
            if pos >= self.message.len() {
                return Err(Error::unexpected_end(pos));
            }

            let len_byte = self.message[pos];

            match len_byte & 0xC0 {
                // Compression pointer: 14-bit offset into the message.
                0xC0 => {
                    if pos + 1 >= self.message.len() {
                        return Err(Error::unexpected_end(pos + 1));
                    }

                    let target =
                        u16::from_be_bytes([len_byte & 0x3F, self.message[pos + 1]]) as usize;

                    if target >= self.message.len() {
                        return Err(Error::InvalidPointer {
                            offset: pos,
                            target,
                        });
                    }

                    if visited.contains(&(target as u16)) {
                        return Err(Error::PointerCycle { offset: target });
                    }
                    visited.push(target as u16);

                    if !followed_pointer {
                        consumed = pos - offset + 2;
                        followed_pointer = true;
                    }

                    pos = target;
                }

                // Reserved label types 01/10.
                0x40 | 0x80 => {
                    return Err(Error::MalformedName {
                        offset: pos,
                        bits: len_byte,
                    });
                }

                // Plain label, length 0-63.
                _ => {
                    let len = len_byte as usize;

                    if len == 0 {
                        wire.push(0);
                        label_count += 1;

                        if !followed_pointer {
                            consumed = pos - offset + 1;
                        }
                        break;
                    }

                    if pos + 1 + len > self.message.len() {
                        return Err(Error::unexpected_end(pos + 1 + len));
                    }

                    if wire.len() + 1 + len + 1 > MAX_NAME_LENGTH {
                        return Err(Error::NameTooLong {
                            length: wire.len() + 1 + len + 1,
                        });
                    }

                    wire.push(len_byte);
                    wire.extend_from_slice(&self.message[pos + 1..pos + 1 + len]);
                    label_count += 1;

                    pos += 1 + len;
                }
            }
        }

        Ok((Name { wire, label_count }, consumed))
    }

    /// Parses a name, discarding the consumed-octet count.
    #[inline]
    pub fn parse(&self, offset: usize) -> Result<Name> {
        self.parse_name(offset).map(|(name, _)| name)
    }
}
