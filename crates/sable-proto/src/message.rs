//! DNS message representation.
//!
//! A message is the 12-byte header plus four sections: question, answer,
//! authority, and additional. The OPT pseudo-record is lifted out of the
//! sections into [`Message::edns`] on decode and appended to the additional
//! section on encode.

use crate::edns::Edns;
use crate::error::Result;
use crate::header::{HEADER_SIZE, Header};
use crate::name::NameCompressor;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::record::{RecordParser, ResourceRecord, SectionEntry};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The record sections of a DNS message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    /// The answer section.
    Answer,
    /// The authority section.
    Authority,
    /// The additional section.
    Additional,
}

/// A complete DNS message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The message header.
    header: Header,
    /// The question section.
    questions: Vec<Question>,
    /// The answer section.
    answers: Vec<ResourceRecord>,
    /// The authority section.
    authority: Vec<ResourceRecord>,
    /// The additional section (excluding OPT).
    additional: Vec<ResourceRecord>,
    /// EDNS(0) data from the first OPT pseudo-record, if any.
    edns: Option<Edns>,
    /// How many OPT entries the decoder saw, anywhere in the message.
    opt_seen: u8,
    /// Whether any OPT entry sat outside the additional section.
    opt_misplaced: bool,
}

impl Message {
    /// Creates an empty message with the given header.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            questions: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            edns: None,
            opt_seen: 0,
            opt_misplaced: false,
        }
    }

    /// Creates a query message with a random ID and RD set.
    pub fn query(question: Question) -> Self {
        let mut header = Header::query();
        header.qd_count = 1;

        let mut msg = Self::new(header);
        msg.questions.push(question);
        msg
    }

    /// Creates a response message echoing a query's ID, RD bit, questions,
    /// and EDNS data.
    pub fn response_to(query: &Message) -> Self {
        let mut msg = Self::new(Header::response_to(&query.header));
        msg.questions = query.questions.clone();
        msg.edns = query.edns.clone();
        msg.opt_seen = u8::from(msg.edns.is_some());
        msg.update_counts();
        msg
    }

    // =========================================================================
    // Header accessors
    // =========================================================================

    /// Returns the message header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the message ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Sets the message ID.
    #[inline]
    pub fn set_id(&mut self, id: u16) {
        self.header.id = id;
    }

    /// Returns the response code.
    #[inline]
    pub fn rcode(&self) -> ResponseCode {
        self.header.rcode
    }

    /// Sets the response code.
    #[inline]
    pub fn set_rcode(&mut self, rcode: ResponseCode) {
        self.header.rcode = rcode;
    }

    // =========================================================================
    // Section accessors
    // =========================================================================

    /// Returns the question section.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the first question if present.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the additional section (excluding OPT).
    #[inline]
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    /// Returns the EDNS data if an OPT record was present.
    #[inline]
    pub fn edns(&self) -> Option<&Edns> {
        self.edns.as_ref()
    }

    /// Returns a mutable reference to the EDNS data.
    #[inline]
    pub fn edns_mut(&mut self) -> Option<&mut Edns> {
        self.edns.as_mut()
    }

    /// Sets or clears the EDNS data.
    pub fn set_edns(&mut self, edns: Option<Edns>) {
        self.edns = edns;
        self.opt_seen = u8::from(self.edns.is_some());
        self.update_counts();
    }

    /// How many OPT entries the decoder saw anywhere in the message.
    /// More than one is a protocol violation the server answers FORMERR.
    #[inline]
    pub fn opt_record_count(&self) -> u8 {
        self.opt_seen
    }

    /// Returns true if an OPT entry sat outside the additional section.
    #[inline]
    pub fn has_misplaced_opt(&self) -> bool {
        self.opt_misplaced
    }

    // =========================================================================
    // Section mutators
    // =========================================================================

    /// Adds a question.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
        self.update_counts();
    }

    /// Adds an answer record.
    pub fn add_answer(&mut self, record: ResourceRecord) {
        self.answers.push(record);
        self.update_counts();
    }

    /// Adds an authority record.
    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority.push(record);
        self.update_counts();
    }

    /// Adds an additional record.
    pub fn add_additional(&mut self, record: ResourceRecord) {
        self.additional.push(record);
        self.update_counts();
    }

    /// Adds a record to the given section.
    pub fn add_record(&mut self, section: Section, record: ResourceRecord) {
        match section {
            Section::Answer => self.answers.push(record),
            Section::Authority => self.authority.push(record),
            Section::Additional => self.additional.push(record),
        }
        self.update_counts();
    }

    fn update_counts(&mut self) {
        self.header.qd_count = self.questions.len() as u16;
        self.header.an_count = self.answers.len() as u16;
        self.header.ns_count = self.authority.len() as u16;
        self.header.ar_count = self.additional.len() as u16 + u16::from(self.edns.is_some());
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Decodes a message from wire format.
    ///
    /// Section counts in the header drive the walk, so they always match
    /// the decoded section lengths. OPT pseudo-records anywhere in the
    /// message are lifted into [`Message::edns`]; their count and
    /// placement stay observable for server-side validation. The OPT
    /// extended-RCODE byte is merged into the response code.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut header = Header::parse(data)?;

        let mut questions = Vec::with_capacity(header.qd_count as usize);
        let mut offset = HEADER_SIZE;

        for _ in 0..header.qd_count {
            let (question, consumed) = Question::parse(data, offset)?;
            questions.push(question);
            offset += consumed;
        }

        let mut answers = Vec::with_capacity(header.an_count as usize);
        let mut authority = Vec::with_capacity(header.ns_count as usize);
        let mut additional = Vec::new();
        let mut edns = None;
        let mut opt_seen = 0u8;
        let mut opt_misplaced = false;

        let sections = [
            (Section::Answer, header.an_count),
            (Section::Authority, header.ns_count),
            (Section::Additional, header.ar_count),
        ];

        for (section, count) in sections {
            let mut parser = RecordParser::new(data, offset, count);
            while let Some(entry) = parser.next_entry()? {
                match entry {
                    SectionEntry::Record(record) => match section {
                        Section::Answer => answers.push(record),
                        Section::Authority => authority.push(record),
                        Section::Additional => additional.push(record),
                    },
                    SectionEntry::Opt(parsed) => {
                        opt_seen = opt_seen.saturating_add(1);
                        if section != Section::Additional {
                            opt_misplaced = true;
                        }
                        if edns.is_none() {
                            edns = Some(parsed);
                        }
                    }
                }
            }
            offset = parser.offset();
        }

        if let Some(edns) = &edns {
            header.rcode =
                ResponseCode::from_parts(header.rcode.header_rcode(), edns.extended_rcode());
        }

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
            edns,
            opt_seen,
            opt_misplaced,
        })
    }

    /// Encodes the message to wire format.
    ///
    /// The header is buffered separately from four per-section byte
    /// vectors; one name compressor spans all of them so later names can
    /// point into earlier sections. Section counts are finalized from the
    /// serialized sections, and the OPT pseudo-record (carrying the upper
    /// bits of an extended response code) lands at the end of the
    /// additional section.
    pub fn encode(&self) -> Result<Bytes> {
        let mut cmp = NameCompressor::new();
        let mut question = BytesMut::new();
        let mut answer = BytesMut::new();
        let mut authority = BytesMut::new();
        let mut additional = BytesMut::new();

        let mut position = HEADER_SIZE;

        for q in &self.questions {
            let before = question.len();
            q.encode(&mut question, &mut cmp, position)?;
            position += question.len() - before;
        }

        for r in &self.answers {
            position += r.encode(&mut answer, &mut cmp, position)?;
        }

        for r in &self.authority {
            position += r.encode(&mut authority, &mut cmp, position)?;
        }

        for r in &self.additional {
            position += r.encode(&mut additional, &mut cmp, position)?;
        }

        if let Some(edns) = &self.edns {
            edns.encode(&mut additional, self.header.rcode.extended_rcode());
        }

        let mut header = self.header.clone();
        header.qd_count = self.questions.len() as u16;
        header.an_count = self.answers.len() as u16;
        header.ns_count = self.authority.len() as u16;
        header.ar_count = self.additional.len() as u16 + u16::from(self.edns.is_some());

        let mut out = BytesMut::with_capacity(
            HEADER_SIZE + question.len() + answer.len() + authority.len() + additional.len(),
        );
        header.encode(&mut out)?;
        out.extend_from_slice(&question);
        out.extend_from_slice(&answer);
        out.extend_from_slice(&authority);
        out.extend_from_slice(&additional);

        Ok(out.freeze())
    }
}

impl PartialEq for Message {
    /// Structural equality over header, sections, and EDNS data; decoder
    /// bookkeeping (OPT count/placement) does not participate.
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.questions == other.questions
            && self.answers == other.answers
            && self.authority == other.authority
            && self.additional == other.additional
            && self.edns == other.edns
    }
}

impl Eq for Message {}

impl Default for Message {
    fn default() -> Self {
        Self::new(Header::default())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; ->>HEADER<<- {}", self.header)?;

        if let Some(edns) = &self.edns {
            writeln!(f, ";; OPT: {edns}")?;
        }

        writeln!(f, "\n;; QUESTION SECTION:")?;
        for q in &self.questions {
            writeln!(f, ";{q}")?;
        }

        if !self.answers.is_empty() {
            writeln!(f, "\n;; ANSWER SECTION:")?;
            for r in &self.answers {
                writeln!(f, "{r}")?;
            }
        }

        if !self.authority.is_empty() {
            writeln!(f, "\n;; AUTHORITY SECTION:")?;
            for r in &self.authority {
                writeln!(f, "{r}")?;
            }
        }

        if !self.additional.is_empty() {
            writeln!(f, "\n;; ADDITIONAL SECTION:")?;
            for r in &self.additional {
                writeln!(f, "{r}")?;
            }
        }

        Ok(())
    }
}
