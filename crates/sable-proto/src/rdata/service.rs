//! Service record types (SRV).

use crate::error::{Error, Result};
use crate::name::{Name, NameCompressor, NameParser};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SRV record - service locator (RFC 2782).
///
/// Used by protocols like SIP, XMPP, and LDAP to find service endpoints.
/// RFC 2782 forbids compressing the target name, so encoding always writes
/// it literally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SRV {
    /// Priority (lower is more preferred).
    priority: u16,
    /// Weight for load balancing among equal priority.
    weight: u16,
    /// TCP/UDP port number.
    port: u16,
    /// Target host name.
    target: Name,
}

impl SRV {
    /// Creates a new SRV record.
    pub fn new(priority: u16, weight: u16, port: u16, target: Name) -> Self {
        Self {
            priority,
            weight,
            port,
            target,
        }
    }

    /// Returns the priority (lower = more preferred).
    #[inline]
    pub const fn priority(&self) -> u16 {
        self.priority
    }

    /// Returns the weight for load balancing.
    #[inline]
    pub const fn weight(&self) -> u16 {
        self.weight
    }

    /// Returns the port number.
    #[inline]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the target host name.
    #[inline]
    pub fn target(&self) -> &Name {
        &self.target
    }

    /// Returns true if the service is explicitly unavailable (target `.`).
    pub fn is_unavailable(&self) -> bool {
        self.target.is_root()
    }

    /// Parses an SRV record; `offset` is where the RDATA starts. Lenient
    /// decoders accept a compressed target even though RFC 2782 forbids
    /// emitting one.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        if offset + 6 > message.len() {
            return Err(Error::unexpected_end(offset + 6));
        }

        let priority = u16::from_be_bytes([message[offset], message[offset + 1]]);
        let weight = u16::from_be_bytes([message[offset + 2], message[offset + 3]]);
        let port = u16::from_be_bytes([message[offset + 4], message[offset + 5]]);

        let (target, _) = NameParser::new(message).parse_name(offset + 6)?;

        Ok(Self {
            priority,
            weight,
            port,
            target,
        })
    }

    /// Writes the RDATA. The target is never compressed.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
        cmp: &mut NameCompressor,
        position: usize,
    ) -> Result<()> {
        buf.put_u16(self.priority);
        buf.put_u16(self.weight);
        buf.put_u16(self.port);
        cmp.write_name(buf, &self.target, position + 6, false)
    }
}

impl fmt::Display for SRV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}
