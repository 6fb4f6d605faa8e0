// Integration tests for the NATS wrappers.
//
// Connection-failure behavior is testable without infrastructure. Tests
// that need a live server run against nats://127.0.0.1:4222 and are
// ignored by default:
//
//     nats-server &
//     cargo test -- --ignored

#![cfg(feature = "nats")]

use std::time::Duration;

use satchel::nats::{
    EventPublisher, EventSubscriber, NatsConnection, Responder, StreamPublisher,
};

const LOCAL_SERVER: &str = "nats://127.0.0.1:4222";

#[tokio::test]
async fn test_connect_to_unreachable_address_fails() {
    // Port 9 (discard) refuses connections on loopback, so no NATS
    // handshake can take place.
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        NatsConnection::connect("nats://127.0.0.1:9"),
    )
    .await;

    match result {
        Ok(Ok(_)) => panic!("connect to an unreachable address should fail"),
        Ok(Err(_)) | Err(_) => {}
    }
}

#[tokio::test]
#[ignore = "requires a NATS server on 127.0.0.1:4222"]
async fn test_publish_on_open_connection() {
    let conn = NatsConnection::connect(LOCAL_SERVER).await.unwrap();
    let publisher = EventPublisher::new(&conn);

    publisher
        .publish("demo.subject", b"hello world")
        .await
        .unwrap();

    conn.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a NATS server on 127.0.0.1:4222"]
async fn test_publish_after_close_fails() {
    let conn = NatsConnection::connect(LOCAL_SERVER).await.unwrap();
    let publisher = EventPublisher::new(&conn);
    conn.close().await.unwrap();

    // The publisher's client handle observed the drain.
    let result = publisher.publish("demo.subject", b"after close").await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires a NATS server on 127.0.0.1:4222"]
async fn test_subscribe_receives_published_event() {
    let conn = NatsConnection::connect(LOCAL_SERVER).await.unwrap();
    let subscriber = EventSubscriber::new(&conn);
    let publisher = EventPublisher::new(&conn);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _handle = subscriber
        .subscribe("demo.events", move |message| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(message.payload.to_vec());
            }
        })
        .await
        .unwrap();

    // Give the server a moment to register the subscription interest.
    tokio::time::sleep(Duration::from_millis(100)).await;
    publisher.publish("demo.events", b"evt").await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, b"evt");

    conn.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a NATS server on 127.0.0.1:4222"]
async fn test_request_reply_roundtrip() {
    let requester = NatsConnection::connect(LOCAL_SERVER).await.unwrap();
    let responder_conn = NatsConnection::connect(LOCAL_SERVER).await.unwrap();

    tokio::spawn(async move {
        let responder = Responder::new(&responder_conn, "demo.echo");
        let _ = responder
            .serve(|message| async move { Ok(message.payload.to_vec()) })
            .await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let reply = requester.request("demo.echo", b"ping").await.unwrap();
    assert_eq!(reply, b"ping");

    requester.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a NATS server with JetStream on 127.0.0.1:4222"]
async fn test_stream_publisher_submit_acks() {
    let conn = NatsConnection::connect(LOCAL_SERVER).await.unwrap();
    let publisher = StreamPublisher::new(&conn, "SATCHEL_TEST", "satchel.test");

    publisher.ensure_stream().await.unwrap();
    // Creating an existing stream is a no-op.
    publisher.ensure_stream().await.unwrap();

    let seq = publisher.submit(b"payload").await.unwrap();
    assert!(seq >= 1);

    conn.close().await.unwrap();
}
