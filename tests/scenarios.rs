//! End-to-end scenario tests, one per literal case.

mod common;

use std::sync::atomic::Ordering;

use bytes::Bytes;
use common::{ok_headers, CountingStats, Event, MockWriter, VecBody};
use h2_stream_core::{
    Config, EmptyBody, Http2Frame, Interrupt, OutboundFrame, OutgoingMessage, Reason, Role,
    StreamError, StreamId, StreamTransport,
};

#[tokio::test]
async fn happy_get_client_role() {
    let writer = MockWriter::default();
    let stats = CountingStats::default();
    let transport = StreamTransport::new(
        StreamId::new(1),
        writer.clone(),
        stats.clone(),
        Config::new(Role::Client),
    );

    let req = http::Request::new(EmptyBody);
    let send = transport
        .send(OutgoingMessage::Request(req))
        .await
        .expect("send headers");
    send.finish().await.expect("send body");

    assert!(transport
        .recv(Http2Frame::Headers {
            headers: ok_headers(200),
            end_of_stream: true,
        })
        .await);

    let message = transport.on_receive_message().await.expect("received");
    assert!(matches!(message, h2_stream_core::ReceivedMessage::Response(_)));

    transport.on_reset().await.expect("clean close");
    assert_eq!(stats.0.local_reset.load(Ordering::SeqCst), 0);
    assert!(matches!(writer.events()[0], Event::Headers { end_of_stream: true }));
}

#[tokio::test]
async fn echo_post_with_body_and_trailers() {
    let writer = MockWriter::default();
    let stats = CountingStats::default();
    let transport = StreamTransport::new(
        StreamId::new(3),
        writer.clone(),
        stats.clone(),
        Config::new(Role::Client),
    );

    let body = VecBody::new(vec![
        OutboundFrame::data(Bytes::from_static(b"hello"), false),
        OutboundFrame::data(Bytes::from_static(b"world"), false),
        OutboundFrame::Trailers {
            headers: {
                let mut h = http::HeaderMap::new();
                h.insert("x-trailing", http::HeaderValue::from_static("1"));
                h
            },
        },
    ]);
    let req = http::Request::new(body);
    let send = transport.send(OutgoingMessage::Request(req)).await.unwrap();
    send.finish().await.unwrap();

    assert!(transport
        .recv(Http2Frame::Headers {
            headers: ok_headers(200),
            end_of_stream: false,
        })
        .await);
    assert!(transport
        .recv(Http2Frame::Data {
            bytes: Bytes::from_static(b"helloworld"),
            end_of_stream: false,
            window_refund: None,
        })
        .await);
    let mut trailers = http::HeaderMap::new();
    trailers.insert("x-trailing", http::HeaderValue::from_static("1"));
    assert!(transport
        .recv(Http2Frame::Headers {
            headers: trailers,
            end_of_stream: true,
        })
        .await);

    let mut message = transport.on_receive_message().await.unwrap();
    let body = message.body_mut();
    let first = body.next().await.unwrap().unwrap();
    assert!(matches!(first, h2_stream_core::Frame::Data { .. }));
    let second = body.next().await.unwrap().unwrap();
    assert!(matches!(second, h2_stream_core::Frame::Trailers { .. }));
    assert!(body.next().await.is_none());

    transport.on_reset().await.unwrap();
    assert_eq!(stats.0.remote_bytes.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn peer_resets_mid_body() {
    let writer = MockWriter::default();
    let stats = CountingStats::default();
    let transport = StreamTransport::new(
        StreamId::new(5),
        writer.clone(),
        stats.clone(),
        Config::new(Role::Client),
    );

    let body = VecBody::new(vec![OutboundFrame::data(Bytes::from_static(b"abc"), false)]);
    let req = http::Request::new(body);
    let send = transport.send(OutgoingMessage::Request(req)).await.unwrap();

    assert!(transport
        .recv(Http2Frame::Headers {
            headers: ok_headers(200),
            end_of_stream: false,
        })
        .await);
    assert!(transport
        .recv(Http2Frame::Data {
            bytes: Bytes::from_static(b"xy"),
            end_of_stream: false,
            window_refund: None,
        })
        .await);
    assert!(
        transport
            .recv(Http2Frame::Reset {
                reason: Reason::CANCEL,
            })
            .await
    );

    let _ = send.finish().await;

    let mut message = transport.on_receive_message().await.unwrap();
    let body = message.body_mut();
    let _first = body.next().await.unwrap().unwrap();
    let err = body.next().await.unwrap().unwrap_err();
    assert!(matches!(err, StreamError::Remote(r) if r == Reason::CANCEL));

    let reset = transport.on_reset().await.unwrap_err();
    assert!(matches!(reset, StreamError::Remote(r) if r == Reason::CANCEL));
    assert!(writer.events().iter().all(|e| !matches!(e, Event::Reset { .. })));
    assert_eq!(stats.0.remote_reset.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn application_cancels_awaiting_headers() {
    let writer = MockWriter::default();
    let stats = CountingStats::default();
    let transport = StreamTransport::new(
        StreamId::new(7),
        writer.clone(),
        stats.clone(),
        Config::new(Role::Client),
    );

    let req = http::Request::new(EmptyBody);
    let send = transport.send(OutgoingMessage::Request(req)).await.unwrap();
    send.finish().await.unwrap();

    // The application cancels `on_receive_message` with a generic interrupt,
    // which maps to a local `Cancel` reset (§4.6).
    transport.interrupt_receive_message(Interrupt::Interrupted).await;

    let reset = transport.on_reset().await.unwrap_err();
    assert!(matches!(reset, StreamError::Local(r) if r == Reason::CANCEL));
    assert!(writer
        .events()
        .iter()
        .any(|e| matches!(e, Event::Reset { reason } if *reason == Reason::CANCEL)));
    assert_eq!(stats.0.local_reset.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forbidden_connection_header() {
    let writer = MockWriter::default();
    let stats = CountingStats::default();
    let transport = StreamTransport::new(
        StreamId::new(9),
        writer.clone(),
        stats.clone(),
        Config::new(Role::Client),
    );

    let mut headers = ok_headers(200);
    headers.insert("connection", http::HeaderValue::from_static("close"));
    transport
        .recv(Http2Frame::Headers {
            headers,
            end_of_stream: false,
        })
        .await;

    let reset = transport.on_reset().await.unwrap_err();
    assert!(matches!(reset, StreamError::Local(r) if r == Reason::PROTOCOL_ERROR));
    assert!(writer
        .events()
        .iter()
        .any(|e| matches!(e, Event::Reset { reason } if *reason == Reason::PROTOCOL_ERROR)));
}

#[tokio::test]
async fn trailers_after_local_close() {
    let writer = MockWriter::default();
    let stats = CountingStats::default();
    let transport = StreamTransport::new(
        StreamId::new(11),
        writer.clone(),
        stats.clone(),
        Config::new(Role::Client),
    );

    let req = http::Request::new(EmptyBody);
    let send = transport.send(OutgoingMessage::Request(req)).await.unwrap();
    send.finish().await.unwrap();

    assert!(transport
        .recv(Http2Frame::Headers {
            headers: ok_headers(200),
            end_of_stream: false,
        })
        .await);
    assert!(transport
        .recv(Http2Frame::Data {
            bytes: Bytes::from_static(b"ok"),
            end_of_stream: false,
            window_refund: None,
        })
        .await);
    let trailers = http::HeaderMap::new();
    assert!(transport
        .recv(Http2Frame::Headers {
            headers: trailers,
            end_of_stream: true,
        })
        .await);

    transport.on_reset().await.expect("clean close");

    let mut message = transport.on_receive_message().await.unwrap();
    let body = message.body_mut();
    let first = body.next().await.unwrap().unwrap();
    assert!(matches!(first, h2_stream_core::Frame::Data { .. }));
    let second = body.next().await.unwrap().unwrap();
    assert!(matches!(second, h2_stream_core::Frame::Trailers { .. }));
    assert!(body.next().await.is_none());
}
