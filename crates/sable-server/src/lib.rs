//! # Sable DNS Server
//!
//! A minimal authoritative DNS server façade over [`sable_proto`].
//!
//! The server binds UDP and TCP on the same port, decodes each query,
//! validates its EDNS(0) usage, and hands the request to a user-supplied
//! [`Handler`] paired with a response object. After the handler returns,
//! the server applies the authoritative conveniences: AA forced on, RA
//! forced off, the zone SOA answering apex SOA questions or backing empty
//! answers in the authority section, and default TTL/class fill-in.
//! Queries outside every registered zone produce no response at all.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sable_server::{FnHandler, Serial, Server, ServerOptions};
//! use std::sync::Arc;
//!
//! # async fn run() -> sable_server::Result<()> {
//! let server = Server::new(
//!     Arc::new(FnHandler(
//!         |request: &sable_server::Request, response: &mut sable_server::Response| {
//!             response.answer_address(request, "1.2.3.4");
//!         },
//!     )),
//!     ServerOptions::default(),
//! );
//!
//! server.zone(
//!     "example.com",
//!     "ns1.example.com",
//!     "hostmaster.example.com",
//!     Serial::Now,
//!     "2h",
//!     "30m",
//!     "2w",
//!     600u32,
//! );
//!
//! server.listen(5353).await?;
//! # Ok(())
//! # }
//! ```

use parking_lot::{Mutex, RwLock};
use sable_proto::rdata::SOA;
use sable_proto::{Name, ResourceRecord};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

mod dispatch;
pub mod frame;
pub mod handler;
pub mod socket;
mod tcp;
mod udp;
pub mod zone;

pub use frame::FrameReader;
pub use handler::{FnHandler, Handler, NoopHandler, Request, Response, StagedRecord};
pub use socket::{Protocol, ServerSocket};
pub use zone::{Serial, Span, Zone, ZoneRegistry, span_seconds};

/// Server error types.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Socket-level failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Message codec failure.
    #[error("codec error: {0}")]
    Codec(#[from] sable_proto::Error),

    /// The server has been closed.
    #[error("server is closed")]
    Closed,
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Events emitted over the server's broadcast stream.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// Both the UDP and TCP listeners are bound and serving.
    Listening,
    /// The server has been closed; emitted exactly once.
    Closed,
    /// A transport or codec error that did not stop the server.
    Error(Arc<ServerError>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Default TTL for response records that carry none, applied when no
    /// zone SOA supplies a floor.
    pub ttl: u32,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { ttl: 3600 }
    }
}

/// The bound listener addresses.
#[derive(Debug, Clone, Copy)]
pub struct BoundAddrs {
    /// The UDP socket address.
    pub udp: SocketAddr,
    /// The TCP listener address.
    pub tcp: SocketAddr,
}

/// Shared state visible to the transport tasks.
pub(crate) struct ServerState {
    pub(crate) options: ServerOptions,
    pub(crate) handler: Arc<dyn Handler>,
    pub(crate) zones: RwLock<ZoneRegistry>,
    events: broadcast::Sender<ServerEvent>,
    shutdown: broadcast::Sender<()>,
    closing: AtomicBool,
}

impl ServerState {
    pub(crate) fn emit(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }

    /// Sticky close: the first caller wins, later calls are no-ops.
    pub(crate) fn begin_close(&self) -> bool {
        if self.closing.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _ = self.shutdown.send(());
        self.emit(ServerEvent::Closed);
        true
    }
}

/// An authoritative DNS server bound to one UDP socket and one TCP
/// listener.
pub struct Server {
    state: Arc<ServerState>,
    bound: Mutex<Option<BoundAddrs>>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("bound", &*self.bound.lock())
            .finish()
    }
}

impl Server {
    /// Creates a server around a handler. Nothing is bound until
    /// [`Server::listen`].
    pub fn new(handler: Arc<dyn Handler>, options: ServerOptions) -> Self {
        let (events, _) = broadcast::channel(64);
        let (shutdown, _) = broadcast::channel(1);

        Self {
            state: Arc::new(ServerState {
                options,
                handler,
                zones: RwLock::new(ZoneRegistry::new()),
                events,
                shutdown,
                closing: AtomicBool::new(false),
            }),
            bound: Mutex::new(None),
        }
    }

    /// Subscribes to the server's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.state.events.subscribe()
    }

    /// Registers a zone by its SOA parameters. Fluent.
    ///
    /// `refresh`, `retry`, `expire`, and `neg_ttl` accept raw seconds or
    /// time-span strings (`"2h"`, `"30m"`, `"2w"`). Invalid names or
    /// unresolvable spans log a warning: a span falls back to 0, a bad
    /// name skips the registration.
    #[allow(clippy::too_many_arguments)]
    pub fn zone(
        &self,
        name: &str,
        mname: &str,
        rname: &str,
        serial: impl Into<Serial>,
        refresh: impl Into<Span>,
        retry: impl Into<Span>,
        expire: impl Into<Span>,
        neg_ttl: impl Into<Span>,
    ) -> &Self {
        let parsed = (
            Name::from_str(name),
            Name::from_str(mname),
            Name::from_str(rname),
        );
        let (Ok(apex), Ok(mname), Ok(rname)) = parsed else {
            warn!(zone = name, "skipping zone with unparsable name");
            return self;
        };

        let span = |span: Span, field: &str| -> u32 {
            span.seconds().unwrap_or_else(|| {
                warn!(zone = name, field, "unresolvable time span, using 0");
                0
            })
        };

        let neg_ttl = span(neg_ttl.into(), "neg_ttl");
        let soa = SOA::new(
            mname,
            rname,
            serial.into().resolve(),
            span(refresh.into(), "refresh"),
            span(retry.into(), "retry"),
            span(expire.into(), "expire"),
            neg_ttl,
        );

        let record = ResourceRecord::soa(apex.clone(), neg_ttl, soa);
        self.state
            .zones
            .write()
            .insert(Zone::new(apex.clone(), record));

        info!(zone = %apex, "zone registered");
        self
    }

    /// Returns the zone covering `qname`, if any.
    pub fn find_zone_for_name(&self, qname: &Name) -> Option<Zone> {
        self.state.zones.read().find(qname).cloned()
    }

    /// Binds UDP and TCP on `port` across all IPv4 interfaces and starts
    /// serving. Emits [`ServerEvent::Listening`] once both are ready.
    pub async fn listen(&self, port: u16) -> Result<&Self> {
        self.listen_on(port, IpAddr::V4(Ipv4Addr::UNSPECIFIED)).await
    }

    /// Binds UDP and TCP on `port` at `address` and starts serving.
    pub async fn listen_on(&self, port: u16, address: IpAddr) -> Result<&Self> {
        if self.state.closing.load(Ordering::SeqCst) {
            return Err(ServerError::Closed);
        }

        let addr = SocketAddr::new(address, port);

        // Both sockets must be up before the listening event fires.
        let udp_socket = Arc::new(udp::bind(addr)?);
        let tcp_listener = tcp::bind(addr)?;

        let bound = BoundAddrs {
            udp: udp_socket.local_addr()?,
            tcp: tcp_listener.local_addr()?,
        };
        *self.bound.lock() = Some(bound);

        tokio::spawn(udp::run(
            self.state.clone(),
            udp_socket,
            self.state.shutdown.subscribe(),
        ));
        tokio::spawn(tcp::run(
            self.state.clone(),
            tcp_listener,
            self.state.shutdown.subscribe(),
        ));

        info!(udp = %bound.udp, tcp = %bound.tcp, "server listening");
        self.state.emit(ServerEvent::Listening);
        Ok(self)
    }

    /// Returns the bound addresses once listening.
    pub fn local_addr(&self) -> Option<BoundAddrs> {
        *self.bound.lock()
    }

    /// Closes the server: releases both sockets and emits
    /// [`ServerEvent::Closed`] once. Safe to call repeatedly.
    pub fn close(&self) {
        if self.state.begin_close() {
            info!("server closed");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.state.begin_close();
    }
}
