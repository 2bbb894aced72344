//! TCP transport.
//!
//! Each connection is a stream of length-prefixed DNS messages. The
//! [`FrameReader`](crate::frame::FrameReader) reassembles frames across
//! arbitrary chunk boundaries; messages on one connection dispatch in
//! order. A query that finalizes to nothing closes the connection with no
//! payload.

use crate::dispatch::{self, Outcome};
use crate::frame::FrameReader;
use crate::socket::ServerSocket;
use crate::{ServerEvent, ServerState};
use socket2::{Domain, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, trace};

/// Binds a TCP listener with address reuse enabled.
pub(crate) fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;

    let std_listener: std::net::TcpListener = socket.into();
    let listener = TcpListener::from_std(std_listener)?;

    info!(addr = %listener.local_addr()?, "TCP listener bound");
    Ok(listener)
}

/// Runs the accept loop until shutdown.
pub(crate) async fn run(
    state: Arc<ServerState>,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            result = listener.accept() => match result {
                Ok((stream, peer)) => {
                    let state = state.clone();
                    let shutdown = shutdown.resubscribe();
                    tokio::spawn(async move {
                        handle_connection(state, stream, peer, shutdown).await;
                    });
                }
                Err(err) => {
                    error!(error = %err, "TCP accept failed");
                    state.emit(ServerEvent::Error(Arc::new(err.into())));
                }
            },
        }
    }

    // The transport going away closes the whole server; no-op when the
    // shutdown signal got here first.
    state.begin_close();
}

/// Serves one client connection until EOF, shutdown, or a silent query.
async fn handle_connection(
    state: Arc<ServerState>,
    stream: TcpStream,
    peer: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) {
    trace!(client = %peer, "TCP connection opened");

    let (mut read_half, write_half) = stream.into_split();
    let capability = ServerSocket::tcp(Arc::new(Mutex::new(write_half)), peer);

    let mut reader = FrameReader::new();
    let mut chunk = [0u8; 4096];

    'connection: loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            result = read_half.read(&mut chunk) => match result {
                Ok(0) => {
                    trace!(client = %peer, "TCP connection closed by client");
                    break;
                }
                Ok(n) => {
                    reader.extend(&chunk[..n]);
                    // Pipelined queries dispatch in order; surplus bytes
                    // stay buffered for the next frame.
                    while let Some(frame) = reader.next_frame() {
                        let outcome =
                            dispatch::handle_query(&state, &frame, capability.clone()).await;
                        if outcome == Outcome::Silent {
                            break 'connection;
                        }
                    }
                }
                Err(err) => {
                    debug!(client = %peer, error = %err, "TCP read failed");
                    break;
                }
            },
        }
    }
}
