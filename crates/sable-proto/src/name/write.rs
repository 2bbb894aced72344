//! Name encoding with RFC 1035 compression.
//!
//! One compressor instance lives for the duration of a single message
//! encode. It remembers, for every name suffix written literally, the
//! absolute offset that suffix occupies in the final message; later names
//! sharing a recorded suffix are emitted as a two-octet pointer.

use super::Name;
use crate::error::Result;
use bytes::{BufMut, BytesMut};
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Largest offset a 14-bit compression pointer can reference.
const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// Compressing name writer scoped to one message.
///
/// The dictionary maps lowercased wire-form suffixes to absolute message
/// offsets. Because records are serialized into per-section buffers before
/// the final concatenation, callers pass the absolute offset the name will
/// occupy (header plus everything emitted before it, including the pending
/// RDLENGTH field and any fixed RDATA prefix).
#[derive(Debug, Default)]
pub struct NameCompressor {
    /// Lowercased suffix bytes -> absolute offset of the first occurrence.
    table: HashMap<SmallVec<[u8; 64]>, u16>,
}

impl NameCompressor {
    /// Creates an empty compressor.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Writes `name` into `buf`.
    ///
    /// `position` is the absolute offset in the final message where the
    /// first octet of this name will land. With `compress` set, the longest
    /// already-recorded suffix is replaced by a pointer and the literally
    /// emitted labels are recorded for later names; without it the name is
    /// written fully literal and nothing is recorded (SRV targets).
    pub fn write_name(
        &mut self,
        buf: &mut BytesMut,
        name: &Name,
        position: usize,
        compress: bool,
    ) -> Result<()> {
        let wire = name.as_wire();
        if wire.is_empty() {
            buf.put_u8(0);
            return Ok(());
        }

        let mut pos = 0;
        while pos < wire.len() {
            let len = wire[pos] as usize;

            if len == 0 {
                buf.put_u8(0);
                return Ok(());
            }

            if compress {
                let key = suffix_key(&wire[pos..]);

                if let Some(&offset) = self.table.get(&key) {
                    buf.put_u16(0xC000 | offset);
                    return Ok(());
                }

                let offset = position + pos;
                if offset <= MAX_POINTER_OFFSET {
                    self.table.insert(key, offset as u16);
                }
            }

            buf.put_u8(len as u8);
            buf.extend_from_slice(&wire[pos + 1..pos + 1 + len]);
            pos += 1 + len;
        }

        // Stored names always carry their terminator; this is unreachable
        // for validated input but keeps the writer total.
        buf.put_u8(0);
        Ok(())
    }
}

/// Lowercased copy of a wire suffix, terminator stripped.
fn suffix_key(suffix: &[u8]) -> SmallVec<[u8; 64]> {
    let end = suffix.len().saturating_sub(1);
    suffix[..end].iter().map(u8::to_ascii_lowercase).collect()
}
