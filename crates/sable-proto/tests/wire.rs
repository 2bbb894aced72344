//! Wire-corpus round-trip tests.
//!
//! The packets below mirror real server traffic: compressed owner names,
//! compressed names inside RDATA, EDNS OPT trailers. Re-encoding a decoded
//! packet must reproduce it byte for byte, except where the encoder finds
//! a compression opportunity the original sender skipped.

use sable_proto::{Message, Name, Question, RecordType, ResponseCode};
use std::str::FromStr;

/// Builds a byte vector from a whitespace-separated hex dump.
fn hex(dump: &str) -> Vec<u8> {
    dump.split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap())
        .collect()
}

/// A query for `example.com TXT` with RD set.
fn txt_query() -> Vec<u8> {
    hex("00 7B 01 00 00 01 00 00 00 00 00 00 \
         07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 10 00 01")
}

/// A recursive resolver's answer for `example.com A`: the answer owner is
/// a pointer to the question name.
fn a_response() -> Vec<u8> {
    hex("2B 67 81 80 00 01 00 01 00 00 00 00 \
         07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 01 00 01 \
         C0 0C 00 01 00 01 00 00 0E 10 00 04 5D B8 D8 22")
}

/// An `example.com MX` answer with two exchanges, both compressed against
/// the question name inside their RDATA.
fn mx_response() -> Vec<u8> {
    hex("A0 01 85 00 00 01 00 02 00 00 00 00 \
         07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 0F 00 01 \
         C0 0C 00 0F 00 01 00 00 0E 10 00 09 00 0A 04 6D 61 69 6C C0 0C \
         C0 0C 00 0F 00 01 00 00 0E 10 00 0B 00 14 06 62 61 63 6B 75 70 C0 0C")
}

/// An NXDOMAIN answer carrying the zone SOA in the authority section,
/// with mname and rname tails pointing at the question name.
fn nxdomain_soa_response() -> Vec<u8> {
    hex("13 37 85 03 00 01 00 00 00 01 00 00 \
         03 66 6F 6F 07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 01 00 01 \
         C0 10 00 06 00 01 00 00 02 58 00 27 \
         03 6E 73 31 C0 10 \
         0A 68 6F 73 74 6D 61 73 74 65 72 C0 10 \
         78 9A BC DE 00 00 1C 20 00 00 03 84 00 12 75 00 00 00 02 58")
}

/// A TXT answer trailing an OPT pseudo-record advertising 1232 bytes.
fn txt_response_with_opt() -> Vec<u8> {
    hex("0F 0F 81 80 00 01 00 01 00 00 00 01 \
         07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 10 00 01 \
         C0 0C 00 10 00 01 00 00 0E 10 00 0C 0B 76 3D 73 70 66 31 20 2D 61 6C 6C \
         00 00 29 04 D0 00 00 00 00 00 00")
}

/// An SRV answer; the target is written literally per RFC 2782.
fn srv_response() -> Vec<u8> {
    hex("51 F0 84 00 00 01 00 01 00 00 00 00 \
         04 5F 73 69 70 04 5F 74 63 70 07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 21 00 01 \
         C0 0C 00 21 00 01 00 00 00 3C 00 17 \
         00 0A 00 3C 13 C4 03 73 69 70 07 65 78 61 6D 70 6C 65 03 63 6F 6D 00")
}

/// An AAAA answer.
fn aaaa_response() -> Vec<u8> {
    hex("77 10 81 80 00 01 00 01 00 00 00 00 \
         07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 1C 00 01 \
         C0 0C 00 1C 00 01 00 00 0E 10 00 10 \
         26 06 28 00 02 20 00 01 02 48 18 93 25 C8 19 46")
}

/// A DS answer.
fn ds_response() -> Vec<u8> {
    hex("00 01 84 00 00 01 00 01 00 00 00 00 \
         07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 2B 00 01 \
         C0 0C 00 2B 00 01 00 01 51 80 00 08 EC 45 05 01 2B B1 83 AF")
}

fn corpus() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("txt_query", txt_query()),
        ("a_response", a_response()),
        ("mx_response", mx_response()),
        ("nxdomain_soa_response", nxdomain_soa_response()),
        ("txt_response_with_opt", txt_response_with_opt()),
        ("srv_response", srv_response()),
        ("aaaa_response", aaaa_response()),
        ("ds_response", ds_response()),
    ]
}

#[test]
fn encode_of_decode_is_byte_exact() {
    for (label, packet) in corpus() {
        let decoded = Message::decode(&packet).unwrap_or_else(|e| panic!("{label}: {e}"));
        let encoded = decoded.encode().unwrap_or_else(|e| panic!("{label}: {e}"));
        assert_eq!(encoded.as_ref(), packet.as_slice(), "{label}");
    }
}

#[test]
fn decode_is_idempotent() {
    for (label, packet) in corpus() {
        let once = Message::decode(&packet).unwrap();
        let twice = Message::decode(&once.encode().unwrap()).unwrap();
        assert_eq!(once, twice, "{label}");
    }
}

#[test]
fn txt_query_encodes_to_known_bytes() {
    let mut query = Message::query(Question::txt(Name::from_str("example.com").unwrap()));
    query.set_id(123);

    assert_eq!(query.encode().unwrap().as_ref(), txt_query().as_slice());
}

#[test]
fn a_response_fields() {
    let msg = Message::decode(&a_response()).unwrap();

    assert!(msg.header().is_response());
    assert!(msg.header().recursion_available());
    assert_eq!(msg.rcode(), ResponseCode::NoError);

    let answer = &msg.answers()[0];
    assert_eq!(answer.name().to_string(), "example.com");
    assert_eq!(answer.ttl(), 3600);
    assert_eq!(
        answer.rdata().as_a().unwrap(),
        "93.184.216.34".parse::<std::net::Ipv4Addr>().unwrap()
    );
}

#[test]
fn mx_rdata_names_decompress() {
    let msg = Message::decode(&mx_response()).unwrap();
    assert_eq!(msg.answers().len(), 2);

    let first = match msg.answers()[0].rdata() {
        sable_proto::RData::MX(mx) => mx,
        other => panic!("expected MX, got {other}"),
    };
    assert_eq!(first.preference(), 10);
    assert_eq!(first.exchange().to_string(), "mail.example.com");

    let second = match msg.answers()[1].rdata() {
        sable_proto::RData::MX(mx) => mx,
        other => panic!("expected MX, got {other}"),
    };
    assert_eq!(second.exchange().to_string(), "backup.example.com");
}

#[test]
fn soa_authority_decodes() {
    let msg = Message::decode(&nxdomain_soa_response()).unwrap();
    assert_eq!(msg.rcode(), ResponseCode::NXDomain);

    let soa = msg.authority()[0].rdata().as_soa().unwrap();
    assert_eq!(soa.mname().to_string(), "ns1.example.com");
    assert_eq!(soa.rname().to_string(), "hostmaster.example.com");
    assert_eq!(soa.email(), "hostmaster@example.com");
    assert_eq!(soa.serial(), 0x789A_BCDE);
    assert_eq!(soa.minimum(), 600);
}

#[test]
fn opt_trailer_decodes() {
    let msg = Message::decode(&txt_response_with_opt()).unwrap();

    let edns = msg.edns().unwrap();
    assert_eq!(edns.udp_size(), 1232);
    assert_eq!(edns.version(), 0);
    assert!(!edns.dnssec_ok());
    assert_eq!(msg.opt_record_count(), 1);
    assert!(!msg.has_misplaced_opt());

    let txt = match msg.answers()[0].rdata() {
        sable_proto::RData::TXT(txt) => txt,
        other => panic!("expected TXT, got {other}"),
    };
    assert_eq!(txt.single(), Some(b"v=spf1 -all".as_slice()));
}

#[test]
fn srv_target_stays_uncompressed() {
    let packet = srv_response();
    let msg = Message::decode(&packet).unwrap();

    let srv = match msg.answers()[0].rdata() {
        sable_proto::RData::SRV(srv) => srv,
        other => panic!("expected SRV, got {other}"),
    };
    assert_eq!(srv.priority(), 10);
    assert_eq!(srv.port(), 5060);
    assert_eq!(srv.target().to_string(), "sip.example.com");

    // Byte-exact: the literal target is reproduced, not compressed.
    assert_eq!(msg.encode().unwrap().as_ref(), packet.as_slice());
}

#[test]
fn skipped_com_suffix_shrinks_by_three_octets() {
    // The sender wrote the SOA mname's "com" tail literally even though
    // the question name made it compressible. Re-encoding takes the
    // pointer: three octets shorter, structurally identical.
    let packet = hex(
        "13 38 85 00 00 01 00 00 00 01 00 00 \
         07 65 78 61 6D 70 6C 65 03 63 6F 6D 00 00 06 00 01 \
         C0 0C 00 06 00 01 00 00 02 58 00 28 \
         01 61 03 63 6F 6D 00 \
         0A 68 6F 73 74 6D 61 73 74 65 72 C0 0C \
         00 00 00 01 00 00 1C 20 00 00 03 84 00 12 75 00 00 00 02 58",
    );

    let decoded = Message::decode(&packet).unwrap();
    let soa = decoded.authority()[0].rdata().as_soa().unwrap();
    assert_eq!(soa.mname().to_string(), "a.com");

    let encoded = decoded.encode().unwrap();
    assert_eq!(encoded.len(), packet.len() - 3);

    let redecoded = Message::decode(&encoded).unwrap();
    assert_eq!(redecoded, decoded);
}

#[test]
fn question_types_from_corpus() {
    assert_eq!(
        Message::decode(&txt_query())
            .unwrap()
            .question()
            .unwrap()
            .record_type(),
        Some(RecordType::TXT)
    );
    assert_eq!(
        Message::decode(&ds_response())
            .unwrap()
            .question()
            .unwrap()
            .record_type(),
        Some(RecordType::DS)
    );
}
