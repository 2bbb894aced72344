//! End-to-end server tests over real sockets.

use sable_proto::{Edns, Message, Name, Question, RecordType, ResponseCode};
use sable_server::{FnHandler, Handler, NoopHandler, Serial, Server, ServerOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_millis(500);

async fn start(handler: Arc<dyn Handler>) -> (Server, SocketAddr, SocketAddr) {
    let server = Server::new(handler, ServerOptions::default());
    server
        .listen_on(0, "127.0.0.1".parse().unwrap())
        .await
        .unwrap();
    let bound = server.local_addr().unwrap();
    (server, bound.udp, bound.tcp)
}

fn a_query(name: &str) -> Message {
    Message::query(Question::a(Name::from_str(name).unwrap()))
}

async fn udp_exchange(addr: SocketAddr, query: &[u8]) -> Option<Vec<u8>> {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(query, addr).await.unwrap();

    let mut buf = [0u8; 4096];
    match timeout(RECV_TIMEOUT, socket.recv(&mut buf)).await {
        Ok(Ok(n)) => Some(buf[..n].to_vec()),
        _ => None,
    }
}

async fn udp_query(addr: SocketAddr, query: &Message) -> Option<Message> {
    udp_exchange(addr, &query.encode().unwrap())
        .await
        .map(|bytes| Message::decode(&bytes).unwrap())
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

async fn read_framed(stream: &mut TcpStream) -> Option<Message> {
    let mut len_buf = [0u8; 2];
    timeout(RECV_TIMEOUT, stream.read_exact(&mut len_buf))
        .await
        .ok()?
        .ok()?;

    let len = u16::from_be_bytes(len_buf) as usize;
    let mut body = vec![0u8; len];
    timeout(RECV_TIMEOUT, stream.read_exact(&mut body))
        .await
        .ok()?
        .ok()?;

    Some(Message::decode(&body).unwrap())
}

fn address_handler(address: &'static str) -> Arc<dyn Handler> {
    Arc::new(FnHandler(move |request: &sable_server::Request, response: &mut sable_server::Response| {
        response.answer_address(request, address);
    }))
}

#[tokio::test]
async fn a_record_answer_over_udp() {
    let (server, udp, _tcp) = start(address_handler("1.2.3.4")).await;
    server.zone(
        "example",
        "ns1.example",
        "hostmaster.example",
        Serial::Now,
        "2h",
        "30m",
        "2w",
        3600u32,
    );

    let mut query = a_query("foo.example");
    query.set_id(0x4242);

    let response = udp_query(udp, &query).await.expect("expected an answer");

    assert_eq!(response.id(), 0x4242);
    assert!(response.header().is_response());
    assert!(response.header().is_authoritative());
    assert!(!response.header().recursion_available());
    // RD echoed from the query.
    assert!(response.header().recursion_desired());
    assert_eq!(response.rcode(), ResponseCode::NoError);

    let answer = &response.answers()[0];
    assert_eq!(answer.name().to_string(), "foo.example");
    assert!(answer.is(RecordType::A));
    assert_eq!(answer.ttl(), 3600);
    assert_eq!(
        answer.rdata().as_a().unwrap(),
        "1.2.3.4".parse::<std::net::Ipv4Addr>().unwrap()
    );

    server.close();
}

#[tokio::test]
async fn apex_soa_question_answers_itself() {
    let (server, udp, _tcp) = start(Arc::new(NoopHandler)).await;
    server.zone(
        "example",
        "ns1.example",
        "hostmaster.example",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let query = Message::query(Question::soa(Name::from_str("example").unwrap()));
    let response = udp_query(udp, &query).await.expect("expected an answer");

    assert_eq!(response.answers().len(), 1);
    let soa = response.answers()[0].rdata().as_soa().unwrap();
    assert_eq!(soa.mname().to_string(), "ns1.example");
    assert!(response.authority().is_empty());

    server.close();
}

#[tokio::test]
async fn empty_answer_carries_soa_in_authority() {
    let (server, udp, _tcp) = start(Arc::new(NoopHandler)).await;
    server.zone(
        "example.com",
        "ns1.example.com",
        "hostmaster.example.com",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let query = Message::query(Question::mx(Name::from_str("example.com").unwrap()));
    let response = udp_query(udp, &query).await.expect("expected a response");

    assert!(response.answers().is_empty());
    assert_eq!(response.authority().len(), 1);
    let soa = response.authority()[0].rdata().as_soa().unwrap();
    assert_eq!(soa.rname().to_string(), "hostmaster.example.com");

    server.close();
}

#[tokio::test]
async fn out_of_zone_queries_get_no_udp_response() {
    let (server, udp, _tcp) = start(Arc::new(NoopHandler)).await;
    server.zone(
        "example.com",
        "ns1.example.com",
        "hostmaster.example.com",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let response = udp_query(udp, &a_query("other.org")).await;
    assert!(response.is_none(), "out-of-zone queries must stay silent");

    server.close();
}

#[tokio::test]
async fn out_of_zone_tcp_connection_closes_without_payload() {
    let (server, _udp, tcp) = start(Arc::new(NoopHandler)).await;
    server.zone(
        "example.com",
        "ns1.example.com",
        "hostmaster.example.com",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let mut stream = TcpStream::connect(tcp).await.unwrap();
    stream
        .write_all(&frame(&a_query("other.org").encode().unwrap()))
        .await
        .unwrap();

    // The server closes without sending any bytes.
    let mut buf = [0u8; 16];
    let n = timeout(RECV_TIMEOUT, stream.read(&mut buf))
        .await
        .expect("connection should close promptly")
        .unwrap();
    assert_eq!(n, 0);

    server.close();
}

#[tokio::test]
async fn tcp_pipelined_queries_answer_in_order() {
    let (server, _udp, tcp) = start(address_handler("5.6.7.8")).await;
    server.zone(
        "example.com",
        "ns1.example.com",
        "hostmaster.example.com",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let mut first = a_query("a.example.com");
    first.set_id(1);
    let mut second = a_query("b.example.com");
    second.set_id(2);

    // Both length-prefixed queries go out in a single write.
    let mut combined = frame(&first.encode().unwrap());
    combined.extend_from_slice(&frame(&second.encode().unwrap()));

    let mut stream = TcpStream::connect(tcp).await.unwrap();
    stream.write_all(&combined).await.unwrap();

    let r1 = read_framed(&mut stream).await.expect("first response");
    let r2 = read_framed(&mut stream).await.expect("second response");
    assert_eq!(r1.id(), 1);
    assert_eq!(r2.id(), 2);
    assert_eq!(r1.answers()[0].name().to_string(), "a.example.com");
    assert_eq!(r2.answers()[0].name().to_string(), "b.example.com");

    server.close();
}

#[tokio::test]
async fn tcp_length_prefix_split_across_writes() {
    let (server, _udp, tcp) = start(address_handler("5.6.7.8")).await;
    server.zone(
        "example.com",
        "ns1.example.com",
        "hostmaster.example.com",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let mut query = a_query("c.example.com");
    query.set_id(3);
    let framed = frame(&query.encode().unwrap());

    let mut stream = TcpStream::connect(tcp).await.unwrap();
    // The length field itself straddles two writes.
    stream.write_all(&framed[..1]).await.unwrap();
    stream.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stream.write_all(&framed[1..]).await.unwrap();

    let response = read_framed(&mut stream).await.expect("response");
    assert_eq!(response.id(), 3);

    server.close();
}

#[tokio::test]
async fn unsupported_edns_version_gets_badvers_without_handler() {
    let invoked = Arc::new(AtomicBool::new(false));
    let seen = invoked.clone();
    let handler = Arc::new(FnHandler(
        move |_request: &sable_server::Request, _response: &mut sable_server::Response| {
            seen.store(true, Ordering::SeqCst);
        },
    ));

    let (server, udp, _tcp) = start(handler).await;
    server.zone(
        "example.com",
        "ns1.example.com",
        "hostmaster.example.com",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let mut query = a_query("foo.example.com");
    let mut edns = Edns::with_udp_size(1232);
    edns.set_version(1);
    query.set_edns(Some(edns));

    let response = udp_query(udp, &query).await.expect("BADVERS response");

    assert_eq!(response.rcode(), ResponseCode::BadVers);
    let edns = response.edns().expect("response carries OPT");
    assert_eq!(edns.extended_rcode(), 1);
    assert!(edns.udp_size() >= 512);
    assert!(
        !invoked.load(Ordering::SeqCst),
        "handler must not run for BADVERS"
    );

    server.close();
}

#[tokio::test]
async fn opt_outside_additional_gets_formerr() {
    let (server, udp, _tcp) = start(Arc::new(NoopHandler)).await;

    // Hand-built query claiming one answer record: an OPT pseudo-record.
    let mut packet: Vec<u8> = vec![
        0xAB, 0xCD, // id
        0x00, 0x00, // flags: plain query
        0x00, 0x01, // qdcount
        0x00, 0x01, // ancount (the misplaced OPT)
        0x00, 0x00, 0x00, 0x00,
    ];
    packet.extend_from_slice(&[
        7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0,
    ]);
    packet.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // A IN
    // OPT in the answer section, advertising 4096.
    packet.extend_from_slice(&[0, 0x00, 0x29, 0x10, 0x00, 0, 0, 0, 0, 0x00, 0x00]);

    let raw = udp_exchange(udp, &packet).await.expect("FORMERR response");
    let response = Message::decode(&raw).unwrap();

    assert_eq!(response.id(), 0xABCD);
    assert_eq!(response.rcode(), ResponseCode::FormErr);
    let edns = response.edns().expect("response carries OPT");
    assert!(edns.udp_size() >= 512);

    server.close();
}

#[tokio::test]
async fn default_ttl_comes_from_options_outside_zones() {
    // No zones at all: the configured default TTL applies.
    let (server, udp, _tcp) = start(address_handler("9.9.9.9")).await;

    let response = udp_query(udp, &a_query("anything.test"))
        .await
        .expect("handler answered, so a response is due");
    assert_eq!(response.answers()[0].ttl(), 3600);

    server.close();
}

#[tokio::test]
async fn default_ttl_comes_from_zone_soa_minimum() {
    let (server, udp, _tcp) = start(address_handler("9.9.9.9")).await;
    server.zone(
        "example.com",
        "ns1.example.com",
        "hostmaster.example.com",
        1u32,
        "2h",
        "30m",
        "2w",
        600u32,
    );

    let response = udp_query(udp, &a_query("www.example.com"))
        .await
        .expect("answer");
    assert_eq!(response.answers()[0].ttl(), 600);

    server.close();
}

#[tokio::test]
async fn listening_event_fires_after_bind() {
    let server = Server::new(Arc::new(NoopHandler), ServerOptions::default());
    let mut events = server.subscribe();

    server
        .listen_on(0, "127.0.0.1".parse().unwrap())
        .await
        .unwrap();

    match events.try_recv() {
        Ok(sable_server::ServerEvent::Listening) => {}
        other => panic!("expected Listening, got {other:?}"),
    }

    server.close();
    match events.try_recv() {
        Ok(sable_server::ServerEvent::Closed) => {}
        other => panic!("expected Closed, got {other:?}"),
    }
}
