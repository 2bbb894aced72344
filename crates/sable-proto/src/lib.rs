//! # Sable DNS Protocol Library
//!
//! Wire-format codec for RFC 1035 DNS messages: a bit-exact decoder and
//! encoder with domain-name compression, RFC 6891 EDNS(0) OPT
//! pseudo-records, and typed RDATA for the common record set.
//!
//! ## Highlights
//!
//! - **Round-trip fidelity**: decoded messages re-encode byte-for-byte,
//!   including name compression pointers
//! - **Strict pointer handling**: out-of-bounds targets and pointer cycles
//!   are rejected, never followed
//! - **EDNS(0) support** with UDP size, extended RCODE, DO flag, and raw
//!   option TLVs
//! - **Opaque fallback**: unrecognized record types decode as raw bytes
//!
//! ## Example
//!
//! ```rust
//! use sable_proto::{Message, Name, Question};
//! use std::str::FromStr;
//!
//! let mut query = Message::query(Question::a(Name::from_str("example.com").unwrap()));
//! query.set_id(0x1234);
//!
//! let wire = query.encode().unwrap();
//! let parsed = Message::decode(&wire).unwrap();
//! assert_eq!(parsed, query);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod class;
pub mod edns;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod opcode;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
pub mod rtype;

// Re-exports for convenience
pub use class::RecordClass;
pub use edns::{Edns, EdnsOption};
pub use error::{Error, Result};
pub use header::Header;
pub use message::{Message, Section};
pub use name::Name;
pub use opcode::OpCode;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::ResourceRecord;
pub use rtype::{RecordType, Type};

/// Maximum length of a DNS label (63 bytes per RFC 1035).
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum wire length of a domain name (255 bytes per RFC 1035).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum size of a UDP DNS message without EDNS(0) (512 bytes per RFC 1035).
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

/// Maximum size of a TCP DNS message (bounded by the 16-bit length prefix).
pub const MAX_TCP_MESSAGE_SIZE: usize = 65535;

/// DNS port (53).
pub const DNS_PORT: u16 = 53;
