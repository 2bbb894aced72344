//! Transport capability handed to request handlers.
//!
//! A [`ServerSocket`] abstracts UDP and TCP sends behind one `send` call:
//! UDP transmits one datagram, TCP prepends the 2-octet length frame.
//! Transport size ceilings are enforced here.

use crate::{Result, ServerError};
use bytes::Bytes;
use sable_proto::{MAX_TCP_MESSAGE_SIZE, MAX_UDP_MESSAGE_SIZE};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::UdpSocket;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// DNS transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain UDP, one message per datagram.
    Udp,
    /// Plain TCP with length-prefixed framing.
    Tcp,
}

impl Protocol {
    /// Returns the largest DNS payload this transport carries.
    pub const fn max_message_size(self) -> usize {
        match self {
            Protocol::Udp => MAX_UDP_MESSAGE_SIZE,
            Protocol::Tcp => MAX_TCP_MESSAGE_SIZE,
        }
    }

    /// Returns the protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            Protocol::Udp => "UDP",
            Protocol::Tcp => "TCP",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shared write side of one client conversation.
#[derive(Clone)]
enum Sender {
    Udp(Arc<UdpSocket>),
    Tcp(Arc<Mutex<OwnedWriteHalf>>),
}

/// The socket capability carried by requests and responses.
///
/// Cheap to clone; all clones write to the same underlying transport.
#[derive(Clone)]
pub struct ServerSocket {
    protocol: Protocol,
    peer: SocketAddr,
    sender: Sender,
}

impl ServerSocket {
    /// Creates the capability for a UDP exchange.
    pub(crate) fn udp(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self {
            protocol: Protocol::Udp,
            peer,
            sender: Sender::Udp(socket),
        }
    }

    /// Creates the capability for a TCP connection.
    pub(crate) fn tcp(writer: Arc<Mutex<OwnedWriteHalf>>, peer: SocketAddr) -> Self {
        Self {
            protocol: Protocol::Tcp,
            peer,
            sender: Sender::Tcp(writer),
        }
    }

    /// Returns the transport protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the client's address.
    pub fn remote_address(&self) -> IpAddr {
        self.peer.ip()
    }

    /// Returns the client's port.
    pub fn remote_port(&self) -> u16 {
        self.peer.port()
    }

    /// Returns the full peer socket address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Sends one encoded DNS message to the peer.
    ///
    /// Messages beyond the transport ceiling (512 octets on UDP, 65535 on
    /// TCP) fail without touching the wire.
    pub async fn send(&self, payload: Bytes) -> Result<()> {
        let max = self.protocol.max_message_size();
        if payload.len() > max {
            return Err(ServerError::Codec(
                sable_proto::Error::ResponseTooLarge {
                    size: payload.len(),
                    max,
                },
            ));
        }

        match &self.sender {
            Sender::Udp(socket) => {
                socket.send_to(&payload, self.peer).await?;
            }
            Sender::Tcp(writer) => {
                let mut writer = writer.lock().await;
                writer.write_all(&(payload.len() as u16).to_be_bytes()).await?;
                writer.write_all(&payload).await?;
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for ServerSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSocket")
            .field("protocol", &self.protocol)
            .field("peer", &self.peer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_limits() {
        assert_eq!(Protocol::Udp.max_message_size(), 512);
        assert_eq!(Protocol::Tcp.max_message_size(), 65535);
        assert_eq!(Protocol::Udp.to_string(), "UDP");
    }

    #[tokio::test]
    async fn test_udp_oversize_rejected() {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let peer = socket.local_addr().unwrap();
        let capability = ServerSocket::udp(socket, peer);

        let oversized = Bytes::from(vec![0u8; 513]);
        let err = capability.send(oversized).await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Codec(sable_proto::Error::ResponseTooLarge { size: 513, max: 512 })
        ));

        // At the limit is fine.
        let exact = Bytes::from(vec![0u8; 512]);
        capability.send(exact).await.unwrap();
    }
}
