use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cuemirror::osc::{Buffer, Message};
use cuemirror::show::settings::OscSettings;
use cuemirror::transport::{slip, Transport, TransportEvent};
use cuemirror::Protocol;

async fn console_and_transport() -> (tokio::net::TcpStream, Transport, tokio::sync::mpsc::Receiver<TransportEvent>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();

    let settings = OscSettings {
        ip_address: "127.0.0.1".to_owned(),
        port,
        osc_version: "1.1".to_owned(),
        protocol: Protocol::Tcp,
    };

    let accept = tokio::spawn(async move { listener.accept().await.expect("accept").0 });
    let (transport, events) = Transport::connect(&settings).await.expect("connect");
    let console = accept.await.expect("join");

    (console, transport, events)
}

#[tokio::test]
async fn ready_is_the_first_event() {
    let (_console, _transport, mut events) = console_and_transport().await;
    assert_eq!(events.recv().await, Some(TransportEvent::Ready));
}

#[tokio::test]
async fn inbound_frames_decode_across_segment_boundaries() {
    let (mut console, _transport, mut events) = console_and_transport().await;
    assert_eq!(events.recv().await, Some(TransportEvent::Ready));

    let msg: Buffer = Message::new_with_int("/eos/out/get/cue/1/count", 7).try_into().expect("encodes");
    let wire = slip::encode(msg.as_slice());

    // two messages, the second split mid-frame across writes
    console.write_all(&wire).await.expect("write");
    let (head, tail) = wire.split_at(wire.len() / 2);
    console.write_all(head).await.expect("write");
    console.flush().await.expect("flush");
    console.write_all(tail).await.expect("write");

    for _ in 0..2 {
        let event = events.recv().await.expect("event");
        let TransportEvent::Packet(buffer) = event else { panic!("expected packet, got {event:?}") };
        let decoded = Message::try_from(buffer).expect("decodes");
        assert_eq!(decoded.address, "/eos/out/get/cue/1/count");
    }
}

#[tokio::test]
async fn outbound_messages_are_slip_framed() {
    let (mut console, mut transport, mut events) = console_and_transport().await;
    assert_eq!(events.recv().await, Some(TransportEvent::Ready));

    let msg: Buffer = Message::new_with_int("/eos/subscribe", 1).try_into().expect("encodes");
    transport.send(&msg).await.expect("send");

    let mut received = vec![0_u8; 256];
    let len = console.read(&mut received).await.expect("read");
    received.truncate(len);

    assert_eq!(received, slip::encode(msg.as_slice()));
}

#[tokio::test]
async fn console_hangup_surfaces_closed() {
    let (console, _transport, mut events) = console_and_transport().await;
    assert_eq!(events.recv().await, Some(TransportEvent::Ready));

    drop(console);
    assert_eq!(events.recv().await, Some(TransportEvent::Closed));
}

#[tokio::test]
async fn sends_fail_fast_after_close() {
    let (_console, mut transport, _events) = console_and_transport().await;
    transport.close();

    let msg: Buffer = Message::new("/eos/get/version").try_into().expect("encodes");
    assert!(transport.send(&msg).await.is_err());
}

#[tokio::test]
async fn connect_refusal_is_surfaced() {
    let settings = OscSettings {
        ip_address: "127.0.0.1".to_owned(),
        // a port nothing listens on
        port: 1,
        osc_version: "1.1".to_owned(),
        protocol: Protocol::Tcp,
    };
    assert!(Transport::connect(&settings).await.is_err());
}
