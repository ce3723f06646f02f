//! Integration tests for the tvremote-core codecs.
//!
//! Every request and response variant goes through the event frame helpers,
//! and every pairing message goes through the framer, including streams that
//! deliver one byte per read.

use tokio::io::AsyncWriteExt;
use tvremote_core::pairing::{
    ConfigurationAckMessage, ConfigurationMessage, EncodingOption, EncodingType, OptionsMessage,
    PairingOuterEnvelope, PairingRequestAckMessage, PairingRequestMessage, ProtocolRole,
    SecretAckMessage, SecretMessage,
};
use tvremote_core::protocol::messages::{FlingMessage, KeyEventMessage, MouseMotion};
use tvremote_core::protocol::{encode_frame, read_frame};
use tvremote_core::{
    BincodeCodec, ConnectInfo, DataMessage, Envelope, FlingResult, KeyAction, KeyCode,
    PairingError, PairingFramer, PairingMessage, PairingType, Request, Response, ResponseMessage,
    SequenceCounter, StatusCode,
};

const MAX: usize = 1024 * 1024;

async fn roundtrip(envelope: &Envelope) -> Envelope {
    let frame = encode_frame(&BincodeCodec, envelope, MAX).expect("encode must succeed");
    let mut reader: &[u8] = &frame;
    let decoded = read_frame(&mut reader, &BincodeCodec, MAX)
        .await
        .expect("decode must succeed");
    assert!(reader.is_empty(), "all bytes must be consumed");
    decoded
}

fn all_pairing_messages() -> Vec<PairingMessage> {
    vec![
        PairingMessage::PairingRequest(PairingRequestMessage {
            service_name: "tvremote".to_string(),
            client_name: Some("living-room-phone".to_string()),
        }),
        PairingMessage::PairingRequestAck(PairingRequestAckMessage {
            server_name: Some("Living Room TV".to_string()),
        }),
        PairingMessage::Options(OptionsMessage {
            preferred_role: ProtocolRole::DisplayDevice,
            input_encodings: [EncodingOption::new(EncodingType::Alphanumeric, 6)]
                .into_iter()
                .collect(),
            output_encodings: [EncodingOption::new(EncodingType::Hexadecimal, 4)]
                .into_iter()
                .collect(),
        }),
        PairingMessage::Configuration(ConfigurationMessage {
            encoding: EncodingOption::new(EncodingType::Hexadecimal, 4),
            client_role: ProtocolRole::InputDevice,
        }),
        PairingMessage::ConfigurationAck(ConfigurationAckMessage),
        PairingMessage::Secret(SecretMessage {
            secret: vec![0xDE, 0xAD, 0xBE, 0xEF],
        }),
        PairingMessage::SecretAck(SecretAckMessage {
            secret: vec![0x01; 32],
        }),
    ]
}

fn frame_bytes(outer: &PairingOuterEnvelope) -> Vec<u8> {
    let body = outer.encode();
    let mut bytes = (body.len() as u32).to_be_bytes().to_vec();
    bytes.extend_from_slice(&body);
    bytes
}

// ── Event protocol ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_roundtrip_every_request_variant() {
    let counter = SequenceCounter::new();
    let requests = vec![
        Request::Ping,
        Request::KeyEvent(KeyEventMessage {
            code: KeyCode::VOLUME_UP,
            action: KeyAction::Down,
        }),
        Request::MouseMove(MouseMotion { dx: -12, dy: 40 }),
        Request::MouseWheel(MouseMotion { dx: 0, dy: -1 }),
        Request::Data(DataMessage::new("com.example.text", "héllo")),
        Request::Connect(ConnectInfo::with_version("Pixel", 2)),
        Request::Connect(ConnectInfo::new("no-version")),
        Request::Fling(FlingMessage {
            uri: "https://example.com/watch?v=1".to_string(),
        }),
    ];

    for request in requests {
        let original = Envelope::request(request, Some(counter.next()));
        assert_eq!(roundtrip(&original).await, original);
    }
}

#[tokio::test]
async fn test_roundtrip_every_response_variant() {
    let responses = vec![
        Response::Data(DataMessage::new("volume", "11")),
        Response::FlingResult(FlingResult::Success),
        Response::FlingResult(FlingResult::Failure),
        Response::Empty,
    ];

    for response in responses {
        let original = Envelope::response(ResponseMessage::from(response), Some(5));
        assert_eq!(roundtrip(&original).await, original);
    }
}

#[tokio::test]
async fn test_event_frame_survives_one_byte_reads() {
    // Arrange
    let envelope = Envelope::request(Request::Data(DataMessage::new("k", "v")), None);
    let frame = encode_frame(&BincodeCodec, &envelope, MAX).unwrap();
    let mut builder = tokio_test::io::Builder::new();
    for byte in &frame {
        builder.read(std::slice::from_ref(byte));
    }
    let mut mock = builder.build();

    // Act
    let decoded = read_frame(&mut mock, &BincodeCodec, MAX).await.unwrap();

    // Assert
    assert_eq!(decoded, envelope);
}

// ── Pairing protocol ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_every_pairing_tag_round_trips() {
    for message in all_pairing_messages() {
        // Arrange
        let mut writer = PairingFramer::new(tokio::io::empty(), Vec::new());
        writer.write_next(&message).await.unwrap();
        let (_, bytes) = writer.into_inner();

        // Act
        let mut reader = PairingFramer::new(bytes.as_slice(), tokio::io::sink());
        let decoded = reader.get_next_message(message.message_type()).await;

        // Assert
        assert_eq!(decoded.unwrap(), message);
    }
}

#[tokio::test]
async fn test_pairing_frame_survives_one_byte_reads() {
    // Arrange
    let message = PairingMessage::PairingRequest(PairingRequestMessage {
        service_name: "svc".to_string(),
        client_name: None,
    });
    let bytes = frame_bytes(&PairingOuterEnvelope::for_message(&message).unwrap());
    let mut builder = tokio_test::io::Builder::new();
    for byte in &bytes {
        builder.read(std::slice::from_ref(byte));
    }
    let mut framer = PairingFramer::new(builder.build(), tokio::io::sink());

    // Act
    let decoded = framer.read_next().await.unwrap();

    // Assert
    assert_eq!(decoded, message);
}

#[tokio::test]
async fn test_truncated_pairing_stream_is_io_error() {
    // Arrange – declare more than is delivered, then EOF
    let message = PairingMessage::Secret(SecretMessage {
        secret: vec![7; 16],
    });
    let bytes = frame_bytes(&PairingOuterEnvelope::for_message(&message).unwrap());
    let truncated = &bytes[..bytes.len() - 3];
    let mut framer = PairingFramer::new(truncated, tokio::io::sink());

    // Act
    let result = framer.read_next().await;

    // Assert
    assert!(matches!(result, Err(PairingError::Io(_))));
}

#[tokio::test]
async fn test_bad_secret_status_produces_no_message() {
    let bytes = frame_bytes(&PairingOuterEnvelope::error(StatusCode::BadSecret));
    let mut framer = PairingFramer::new(bytes.as_slice(), tokio::io::sink());

    let result = framer.read_next().await;

    match result {
        Err(PairingError::Protocol { status }) => assert_eq!(status, StatusCode::BadSecret),
        other => panic!("expected BAD_SECRET protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_pairing_tag_is_decoding_error() {
    // Arrange – a well-formed OK frame with tag 50
    let outer = PairingOuterEnvelope {
        protocol_version: 1,
        status: StatusCode::Ok,
        type_tag: 50,
        payload: Vec::new(),
    };
    let bytes = frame_bytes(&outer);
    let mut framer = PairingFramer::new(bytes.as_slice(), tokio::io::sink());

    // Act
    let result = framer.read_next().await;

    // Assert
    assert!(matches!(result, Err(PairingError::UnknownMessageType(50))));
    assert_eq!(PairingType::from_tag(50), None);
}

#[tokio::test]
async fn test_write_error_then_peer_reads_status() {
    // Arrange
    let (client, server) = tokio::io::duplex(256);
    let (c_read, c_write) = tokio::io::split(client);
    let (s_read, s_write) = tokio::io::split(server);
    let mut client = PairingFramer::new(c_read, c_write);
    let mut server = PairingFramer::new(s_read, s_write);

    // Act
    server.write_error(&PairingError::BadSecret).await.unwrap();
    let (_, mut s_write) = server.into_inner();
    s_write.shutdown().await.unwrap();
    let result = client.read_next().await;

    // Assert
    assert!(matches!(
        result,
        Err(PairingError::Protocol {
            status: StatusCode::BadSecret
        })
    ));
}
