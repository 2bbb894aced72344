//! TCP receive framing.
//!
//! DNS over TCP prefixes every message with a 2-octet big-endian length.
//! The reader accepts arbitrary chunks as they arrive, splices the length
//! field across chunk boundaries, and yields complete messages in order.
//! Surplus bytes after a message stay buffered for the next one.

use bytes::{Buf, Bytes, BytesMut};

/// Pull-parser for length-prefixed DNS frames on one TCP connection.
///
/// Two states: awaiting the 2-octet length, then awaiting that many body
/// octets. After each yielded frame the reader falls back to awaiting a
/// length, keeping whatever tail bytes have already arrived.
#[derive(Debug, Default)]
pub struct FrameReader {
    /// Bytes received but not yet consumed.
    buf: BytesMut,
    /// Body length once the prefix has been read.
    expected: Option<usize>,
}

impl FrameReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            expected: None,
        }
    }

    /// Feeds a received chunk into the buffer.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Returns how many unconsumed bytes are buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Pops the next complete message, if one has fully arrived.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        if self.expected.is_none() {
            if self.buf.len() < 2 {
                return None;
            }
            let length = usize::from(u16::from_be_bytes([self.buf[0], self.buf[1]]));
            self.buf.advance(2);
            self.expected = Some(length);
        }

        let length = self.expected?;
        if self.buf.len() < length {
            return None;
        }

        let frame = self.buf.split_to(length).freeze();
        self.expected = None;
        Some(frame)
    }
}
