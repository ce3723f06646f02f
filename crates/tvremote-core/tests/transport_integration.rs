//! Integration tests for `FrameTransport` and its receive loop.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tvremote_core::protocol::{encode_frame, read_frame};
use tvremote_core::{
    BincodeCodec, Body, DataMessage, Envelope, FrameTransport, LoopState, MessageListener,
    Request, TransportConfig, TransportError,
};

struct ChannelListener(mpsc::UnboundedSender<Envelope>);

#[async_trait]
impl MessageListener for ChannelListener {
    async fn on_message(&self, envelope: Envelope) {
        let _ = self.0.send(envelope);
    }
}

#[tokio::test]
async fn test_concurrent_sends_never_interleave() {
    // Arrange – a tiny pipe forces every frame to be written in many chunks
    let (local, remote) = tokio::io::duplex(16);
    let (read, write) = tokio::io::split(local);
    let transport = Arc::new(FrameTransport::new(read, write));
    let senders = 8;
    let per_sender = 10;

    // Act
    let mut handles = Vec::new();
    for sender in 0..senders {
        let transport = Arc::clone(&transport);
        handles.push(tokio::spawn(async move {
            for i in 0..per_sender {
                let value = format!("{sender}-{i}-{}", "x".repeat(200));
                let envelope =
                    Envelope::request(Request::Data(DataMessage::new("payload", value)), None);
                transport.send(&envelope).await;
            }
        }));
    }

    let reader = tokio::spawn(async move {
        let mut remote = remote;
        let mut seen = HashSet::new();
        for _ in 0..senders * per_sender {
            let envelope = read_frame(&mut remote, &BincodeCodec, 1024 * 1024)
                .await
                .expect("every frame must decode intact");
            let Body::Request(body) = envelope.body else {
                panic!("unexpected response frame");
            };
            let data = body.data.expect("data slot must be set");
            seen.insert(data.value);
        }
        seen
    });

    for handle in handles {
        handle.await.unwrap();
    }
    let seen = reader.await.unwrap();

    // Assert
    assert_eq!(seen.len(), senders * per_sender);
}

#[tokio::test]
async fn test_send_proceeds_while_receive_loop_is_blocked() {
    // Arrange – the loop parks on a stream that never delivers
    let (local, mut remote) = tokio::io::duplex(1024);
    let (read, write) = tokio::io::split(local);
    let transport = Arc::new(FrameTransport::new(read, write));
    let (tx, _rx) = mpsc::unbounded_channel();
    transport.start_receiving(Arc::new(ChannelListener(tx))).await;

    // Act
    let envelope = Envelope::request(Request::Ping, Some(1));
    tokio::time::timeout(Duration::from_secs(1), transport.send(&envelope))
        .await
        .expect("send must not wait for the input lock");
    let echoed = read_frame(&mut remote, &BincodeCodec, 1024).await.unwrap();

    // Assert
    assert_eq!(echoed, envelope);
    transport.stop().await;
}

#[tokio::test]
async fn test_malformed_frame_stops_loop_with_codec_error() {
    // Arrange
    let (local, mut remote) = tokio::io::duplex(1024);
    let (read, write) = tokio::io::split(local);
    let (errors_tx, mut errors) = mpsc::unbounded_channel::<TransportError>();
    let (tx, mut received) = mpsc::unbounded_channel();
    let transport = Arc::new(
        FrameTransport::new(read, write)
            .with_config(TransportConfig {
                max_frame_len: 64,
                stop_grace_ms: 50,
            })
            .with_error_listener(Arc::new(errors_tx)),
    );
    transport.start_receiving(Arc::new(ChannelListener(tx))).await;

    // Act – one good frame, then one whose length exceeds the ceiling
    let good = Envelope::request(Request::Ping, Some(1));
    remote
        .write_all(&encode_frame(&BincodeCodec, &good, 64).unwrap())
        .await
        .unwrap();
    remote.write_all(&[0, 0, 1, 0]).await.unwrap();

    // Assert
    assert_eq!(received.recv().await, Some(good));
    assert!(matches!(
        errors.recv().await,
        Some(TransportError::Codec(_))
    ));
    assert_eq!(transport.loop_state(), LoopState::Stopped);
}

#[tokio::test]
async fn test_close_ends_loop_and_signals_peer() {
    // Arrange
    let (local, mut remote) = tokio::io::duplex(1024);
    let (read, write) = tokio::io::split(local);
    let transport = Arc::new(FrameTransport::new(read, write));
    let (tx, _rx) = mpsc::unbounded_channel();
    transport.start_receiving(Arc::new(ChannelListener(tx))).await;

    // Act
    transport.close().await;

    // Assert
    assert_eq!(transport.loop_state(), LoopState::Stopped);
    let result = read_frame(&mut remote, &BincodeCodec, 1024).await;
    assert!(matches!(result, Err(TransportError::Read(_))), "peer sees EOF");
}
