//! Per-query dispatch: decode, EDNS gate, handler, finalize, transmit.
//!
//! Both transports funnel every received message through
//! [`handle_query`]. The EDNS checks run before the user handler; the
//! zone conveniences and TTL defaults run after it.

use crate::handler::{Request, Response};
use crate::socket::ServerSocket;
use crate::{ServerEvent, ServerState};
use sable_proto::{
    Edns, Error as ProtoError, Header, Message, RecordType, ResourceRecord, ResponseCode,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// What happened to one received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// A response was transmitted.
    Answered,
    /// Nothing was transmitted; TCP connections close on this.
    Silent,
}

/// Handles one raw DNS message from either transport.
pub(crate) async fn handle_query(
    state: &Arc<ServerState>,
    data: &[u8],
    socket: ServerSocket,
) -> Outcome {
    let message = match Message::decode(data) {
        Ok(message) => message,
        Err(err @ ProtoError::MalformedEdns { .. }) => {
            // The message was parseable up to a broken OPT record; answer
            // FORMERR with a floor-size OPT of our own.
            debug!(client = %socket.peer(), error = %err, "malformed EDNS in query");
            let id = match data {
                [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
                _ => 0,
            };
            let mut response = Message::new(Header::new(id));
            response.header_mut().set_response(true);
            response.set_rcode(ResponseCode::FormErr);
            response.set_edns(Some(Edns::with_udp_size(512)));
            return transmit(state, &socket, &response).await;
        }
        Err(err) => {
            trace!(client = %socket.peer(), error = %err, "dropping undecodable packet");
            state.emit(ServerEvent::Error(Arc::new(err.into())));
            return Outcome::Silent;
        }
    };

    if message.header().is_response() {
        trace!(client = %socket.peer(), "ignoring unsolicited response message");
        return Outcome::Silent;
    }

    // EDNS validation precedes the handler: one OPT at most, only in the
    // additional section, version 0 only.
    if message.opt_record_count() > 1 || message.has_misplaced_opt() {
        debug!(client = %socket.peer(), "OPT record misplaced or duplicated");
        let udp_size = message.edns().map(Edns::effective_udp_size).unwrap_or(512);
        let mut response = Message::response_to(&message);
        response.set_rcode(ResponseCode::FormErr);
        response.set_edns(Some(Edns::with_udp_size(udp_size)));
        return transmit(state, &socket, &response).await;
    }

    if let Some(edns) = message.edns() {
        if edns.version() > 0 {
            debug!(client = %socket.peer(), version = edns.version(), "unsupported EDNS version");
            let udp_size = edns.effective_udp_size();
            let mut response = Message::response_to(&message);
            response.set_rcode(ResponseCode::BadVers);
            response.set_edns(Some(Edns::with_udp_size(udp_size)));
            return transmit(state, &socket, &response).await;
        }
    }

    let request = Request::new(message, socket.clone());
    let mut response = Response::new();
    state.handler.handle(&request, &mut response).await;

    match finalize(state, &request, response) {
        Some(message) => transmit(state, &socket, &message).await,
        None => {
            trace!(client = %socket.peer(), "no answer and no authority, staying silent");
            Outcome::Silent
        }
    }
}

/// Applies the post-handler conveniences and decides whether to respond.
///
/// Forces AA on and RA off, pushes the zone SOA as the answer to an apex
/// `IN SOA` question, falls back to the zone SOA in authority when the
/// response would otherwise be empty, fills missing classes and TTLs, and
/// returns `None` (transmit nothing) when neither answers nor authority
/// remain.
fn finalize(state: &Arc<ServerState>, request: &Request, response: Response) -> Option<Message> {
    let query = request.message();
    let zones = state.zones.read();

    // The zone of the first question sets the TTL floor for defaulted
    // records; outside any zone the configured default applies.
    let first_zone = query.question().and_then(|q| zones.find(&q.qname));
    let default_ttl = first_zone
        .map(|zone| zone.negative_ttl())
        .unwrap_or(state.options.ttl)
        .max(1);

    let (rcode, answer, authority, additional) = response.into_sections();

    let mut answers: Vec<ResourceRecord> = answer
        .into_iter()
        .map(|staged| staged.into_record(default_ttl))
        .collect();
    let mut authority: Vec<ResourceRecord> = authority
        .into_iter()
        .map(|staged| staged.into_record(default_ttl))
        .collect();
    let additional: Vec<ResourceRecord> = additional
        .into_iter()
        .map(|staged| staged.into_record(default_ttl))
        .collect();

    for question in query.questions() {
        let Some(zone) = zones.find(&question.qname) else {
            continue;
        };

        // An apex SOA question answers itself.
        if question.is_in(RecordType::SOA)
            && question.qname == *zone.name()
            && answers.is_empty()
        {
            answers.push(zone.soa().clone());
        }

        // Empty responses for covered names carry the SOA in authority.
        if answers.is_empty() && authority.is_empty() {
            authority.push(zone.soa().clone());
        }
    }

    if answers.is_empty() && authority.is_empty() {
        return None;
    }

    let mut message = Message::response_to(query);
    message.header_mut().set_authoritative(true);
    message.header_mut().set_recursion_available(false);
    message.set_rcode(rcode);

    for record in answers {
        message.add_answer(record);
    }
    for record in authority {
        message.add_authority(record);
    }
    for record in additional {
        message.add_additional(record);
    }

    Some(message)
}

/// Encodes and sends one response, reporting failures as events.
async fn transmit(state: &Arc<ServerState>, socket: &ServerSocket, message: &Message) -> Outcome {
    let wire = match message.encode() {
        Ok(wire) => wire,
        Err(err) => {
            debug!(client = %socket.peer(), error = %err, "failed to encode response");
            state.emit(ServerEvent::Error(Arc::new(err.into())));
            return Outcome::Silent;
        }
    };

    match socket.send(wire).await {
        Ok(()) => Outcome::Answered,
        Err(err) => {
            debug!(client = %socket.peer(), error = %err, "failed to send response");
            state.emit(ServerEvent::Error(Arc::new(err)));
            Outcome::Silent
        }
    }
}
