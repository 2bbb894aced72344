//! UDP transport.
//!
//! One datagram carries one DNS message. Datagrams are handled inline so
//! queries dispatch in arrival order.

use crate::dispatch;
use crate::socket::ServerSocket;
use crate::{ServerEvent, ServerState};
use socket2::{Domain, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Binds a UDP socket with address reuse enabled.
pub(crate) fn bind(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, None)?;
    socket.set_reuse_address(true)?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    let std_socket: std::net::UdpSocket = socket.into();
    let socket = UdpSocket::from_std(std_socket)?;

    info!(addr = %socket.local_addr()?, "UDP listener bound");
    Ok(socket)
}

/// Runs the datagram receive loop until shutdown.
pub(crate) async fn run(
    state: Arc<ServerState>,
    socket: Arc<UdpSocket>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut buf = vec![0u8; 65535];

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok((len, peer)) => {
                    let capability = ServerSocket::udp(socket.clone(), peer);
                    dispatch::handle_query(&state, &buf[..len], capability).await;
                }
                Err(err) => {
                    error!(error = %err, "UDP receive failed");
                    state.emit(ServerEvent::Error(Arc::new(err.into())));
                }
            },
        }
    }

    // The transport going away closes the whole server; no-op when the
    // shutdown signal got here first.
    state.begin_close();
}
