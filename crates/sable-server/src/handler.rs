//! Request handler interface.
//!
//! Handlers receive a decoded [`Request`] paired with a mutable
//! [`Response`] to stage records into. When the handler returns, the
//! server finalizes the response: authority defaults, zone SOA fallbacks,
//! and TTL/class fill-in happen there, not in the handler.

use crate::socket::ServerSocket;
use async_trait::async_trait;
use sable_proto::rdata::{A, RData};
use sable_proto::{Message, Name, Question, RecordClass, RecordType, ResourceRecord, ResponseCode, Type};
use std::str::FromStr;

/// An incoming DNS query with its transport capability.
#[derive(Debug)]
pub struct Request {
    message: Message,
    socket: ServerSocket,
}

impl Request {
    pub(crate) fn new(message: Message, socket: ServerSocket) -> Self {
        Self { message, socket }
    }

    /// Returns the decoded query message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the first question if present.
    pub fn question(&self) -> Option<&Question> {
        self.message.question()
    }

    /// Returns the transport capability for this exchange.
    pub fn socket(&self) -> &ServerSocket {
        &self.socket
    }
}

/// A record staged into a response.
///
/// Class and TTL are optional: the server defaults a missing class to IN
/// and raises a missing TTL to the zone SOA minimum (or the configured
/// default) when the response is finalized.
#[derive(Debug, Clone)]
pub struct StagedRecord {
    /// The owner name.
    pub name: Name,
    /// The record type.
    pub rtype: Type,
    /// The record class; `None` defaults to IN at finalization.
    pub class: Option<RecordClass>,
    /// The TTL; `None` takes the finalization default.
    pub ttl: Option<u32>,
    /// The record data.
    pub rdata: RData,
}

impl StagedRecord {
    /// Stages a record for `name` with the type its RDATA implies.
    pub fn new(name: Name, rdata: RData) -> Self {
        Self {
            name,
            rtype: rdata.rtype(),
            class: None,
            ttl: None,
            rdata,
        }
    }

    /// Sets an explicit TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets an explicit class.
    #[must_use]
    pub fn with_class(mut self, class: RecordClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Converts to a concrete record, filling gaps from the defaults.
    pub(crate) fn into_record(self, default_ttl: u32) -> ResourceRecord {
        ResourceRecord::new(
            self.name,
            self.rtype,
            self.class.unwrap_or(RecordClass::IN),
            self.ttl.unwrap_or(default_ttl),
            self.rdata,
        )
    }
}

impl From<ResourceRecord> for StagedRecord {
    /// A concrete record stages with its class and TTL pinned.
    fn from(record: ResourceRecord) -> Self {
        Self {
            name: record.name().clone(),
            rtype: record.rtype(),
            class: Some(record.rclass()),
            ttl: Some(record.ttl()),
            rdata: record.rdata().clone(),
        }
    }
}

/// The response under construction for one request.
///
/// Handlers stage records here; everything else (flags, zone SOA
/// behavior, defaults, the decision to stay silent) is applied by the
/// server after the handler returns.
#[derive(Debug, Default)]
pub struct Response {
    rcode: ResponseCode,
    answer: Vec<StagedRecord>,
    authority: Vec<StagedRecord>,
    additional: Vec<StagedRecord>,
}

impl Response {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the staged response code.
    pub fn rcode(&self) -> ResponseCode {
        self.rcode
    }

    /// Sets the response code.
    pub fn set_rcode(&mut self, rcode: ResponseCode) -> &mut Self {
        self.rcode = rcode;
        self
    }

    /// Stages a record into the answer section.
    pub fn answer(&mut self, record: impl Into<StagedRecord>) -> &mut Self {
        self.answer.push(record.into());
        self
    }

    /// Stages a record into the authority section.
    pub fn authority(&mut self, record: impl Into<StagedRecord>) -> &mut Self {
        self.authority.push(record.into());
        self
    }

    /// Stages a record into the additional section.
    pub fn additional(&mut self, record: impl Into<StagedRecord>) -> &mut Self {
        self.additional.push(record.into());
        self
    }

    /// Returns the staged answer records.
    pub fn answers(&self) -> &[StagedRecord] {
        &self.answer
    }

    /// Returns the staged authority records.
    pub fn authority_records(&self) -> &[StagedRecord] {
        &self.authority
    }

    /// Returns the staged additional records.
    pub fn additional_records(&self) -> &[StagedRecord] {
        &self.additional
    }

    /// Answers a bare address string: when the request's sole question is
    /// `IN A` and nothing has been staged yet, stages an A record for the
    /// question name. Returns whether a record was staged.
    pub fn answer_address(&mut self, request: &Request, address: &str) -> bool {
        if !self.answer.is_empty() {
            return false;
        }

        let questions = request.message().questions();
        let [question] = questions else {
            return false;
        };
        if !question.is_in(RecordType::A) {
            return false;
        }

        let Ok(a) = A::from_str(address) else {
            return false;
        };

        self.answer
            .push(StagedRecord::new(question.qname.clone(), RData::A(a)));
        true
    }

    /// Discards everything staged so far, starting the response over on
    /// the same connection.
    pub fn reset(&mut self) -> &mut Self {
        self.rcode = ResponseCode::NoError;
        self.answer.clear();
        self.authority.clear();
        self.additional.clear();
        self
    }

    pub(crate) fn into_sections(
        self,
    ) -> (
        ResponseCode,
        Vec<StagedRecord>,
        Vec<StagedRecord>,
        Vec<StagedRecord>,
    ) {
        (self.rcode, self.answer, self.authority, self.additional)
    }
}

/// Request handler contract.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handles one query. Stage records into `response`; the server
    /// finalizes and transmits after this returns.
    async fn handle(&self, request: &Request, response: &mut Response);
}

/// Wraps a synchronous closure as a [`Handler`].
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    async fn handle(&self, request: &Request, response: &mut Response) {
        (self.0)(request, response);
    }
}

/// A handler that stages nothing, leaving every decision to the server's
/// zone logic.
pub struct NoopHandler;

#[async_trait]
impl Handler for NoopHandler {
    async fn handle(&self, _request: &Request, _response: &mut Response) {}
}
