//! All tvremote event protocol message types.
//!
//! Every frame on the event stream carries exactly one [`Envelope`]: an
//! optional sequence number plus either a request body (device → server) or a
//! response body (server → device).
//!
//! The request body keeps one optional slot per event kind because the wire
//! schema allows several to be set at once.  Application code works with the
//! closed [`Request`] and [`Response`] enums and converts at the edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::protocol::connect_info::ConnectInfo;

/// Correlation key attached to requests that expect a reply or an ack.
pub type SequenceNumber = u32;

// ── Key codes ─────────────────────────────────────────────────────────────────

/// A Linux input key code (`KEY_*` in `linux/input-event-codes.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ESC: KeyCode = KeyCode(1);
    pub const ENTER: KeyCode = KeyCode(28);
    pub const SPACE: KeyCode = KeyCode(57);
    pub const HOME: KeyCode = KeyCode(102);
    pub const UP: KeyCode = KeyCode(103);
    pub const LEFT: KeyCode = KeyCode(105);
    pub const RIGHT: KeyCode = KeyCode(106);
    pub const DOWN: KeyCode = KeyCode(108);
    pub const MUTE: KeyCode = KeyCode(113);
    pub const VOLUME_DOWN: KeyCode = KeyCode(114);
    pub const VOLUME_UP: KeyCode = KeyCode(115);
    pub const BACK: KeyCode = KeyCode(158);
    pub const PLAY_PAUSE: KeyCode = KeyCode(164);
}

/// Names accepted by [`KeyCode::from_str`] in addition to decimal codes.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("esc", KeyCode::ESC),
    ("enter", KeyCode::ENTER),
    ("space", KeyCode::SPACE),
    ("home", KeyCode::HOME),
    ("up", KeyCode::UP),
    ("left", KeyCode::LEFT),
    ("right", KeyCode::RIGHT),
    ("down", KeyCode::DOWN),
    ("mute", KeyCode::MUTE),
    ("volume_down", KeyCode::VOLUME_DOWN),
    ("volume_up", KeyCode::VOLUME_UP),
    ("back", KeyCode::BACK),
    ("play_pause", KeyCode::PLAY_PAUSE),
];

impl FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u32>() {
            return Ok(KeyCode(code));
        }
        let lower = s.to_ascii_lowercase();
        NAMED_KEYS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, code)| *code)
            .ok_or_else(|| format!("unknown key: {s}"))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NAMED_KEYS.iter().find(|(_, code)| code == self) {
            Some((name, _)) => write!(f, "{name}"),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Down,
    Up,
}

impl FromStr for KeyAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "down" => Ok(KeyAction::Down),
            "up" => Ok(KeyAction::Up),
            _ => Err(format!("unknown key action: {s} (expected `down` or `up`)")),
        }
    }
}

// ── Per-event payload structs ─────────────────────────────────────────────────

/// A key press or release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEventMessage {
    pub code: KeyCode,
    pub action: KeyAction,
}

/// Relative pointer motion or wheel scroll along both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseMotion {
    /// Horizontal delta.
    pub dx: i32,
    /// Vertical delta.
    pub dy: i32,
}

/// Free-form typed data.  Interpretation of `value` is up to the peer and
/// is keyed by `data_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMessage {
    pub data_type: String,
    pub value: String,
}

impl DataMessage {
    pub fn new(data_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            value: value.into(),
        }
    }
}

/// Asks the receiving peer to open or navigate to `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlingMessage {
    pub uri: String,
}

/// Outcome of a fling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlingResult {
    Success,
    Failure,
}

impl FlingResult {
    /// Maps the boolean outcome of a fling handler to a result.
    pub fn from_success(success: bool) -> Self {
        if success {
            FlingResult::Success
        } else {
            FlingResult::Failure
        }
    }
}

// ── Domain-level request / response ───────────────────────────────────────────

/// One request a device can make of the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Liveness check; carries no payload and is answered with an ack.
    Ping,
    KeyEvent(KeyEventMessage),
    MouseMove(MouseMotion),
    MouseWheel(MouseMotion),
    Data(DataMessage),
    Connect(ConnectInfo),
    Fling(FlingMessage),
}

/// One reply the server can send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Data(DataMessage),
    FlingResult(FlingResult),
    /// No payload.  With a sequence number this is an acknowledgment.
    Empty,
}

// ── Wire bodies ───────────────────────────────────────────────────────────────

/// Request body as it travels on the wire.
///
/// All slots empty means [`Request::Ping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub key_event: Option<KeyEventMessage>,
    pub mouse_move: Option<MouseMotion>,
    pub mouse_wheel: Option<MouseMotion>,
    pub data: Option<DataMessage>,
    pub connect: Option<ConnectInfo>,
    pub fling: Option<FlingMessage>,
}

impl RequestMessage {
    /// Returns `true` when no slot is set.
    pub fn is_ping(&self) -> bool {
        self.key_event.is_none()
            && self.mouse_move.is_none()
            && self.mouse_wheel.is_none()
            && self.data.is_none()
            && self.connect.is_none()
            && self.fling.is_none()
    }

    /// Consumes the body and returns every set slot as a [`Request`], in the
    /// fixed processing order KeyEvent, MouseMove, MouseWheel, Data, Connect,
    /// Fling.
    ///
    /// A ping body yields an empty vector.
    pub fn into_requests(self) -> Vec<Request> {
        let mut requests = Vec::new();
        if let Some(m) = self.key_event {
            requests.push(Request::KeyEvent(m));
        }
        if let Some(m) = self.mouse_move {
            requests.push(Request::MouseMove(m));
        }
        if let Some(m) = self.mouse_wheel {
            requests.push(Request::MouseWheel(m));
        }
        if let Some(m) = self.data {
            requests.push(Request::Data(m));
        }
        if let Some(m) = self.connect {
            requests.push(Request::Connect(m));
        }
        if let Some(m) = self.fling {
            requests.push(Request::Fling(m));
        }
        requests
    }
}

impl From<Request> for RequestMessage {
    fn from(request: Request) -> Self {
        let mut body = RequestMessage::default();
        match request {
            Request::Ping => {}
            Request::KeyEvent(m) => body.key_event = Some(m),
            Request::MouseMove(m) => body.mouse_move = Some(m),
            Request::MouseWheel(m) => body.mouse_wheel = Some(m),
            Request::Data(m) => body.data = Some(m),
            Request::Connect(m) => body.connect = Some(m),
            Request::Fling(m) => body.fling = Some(m),
        }
        body
    }
}

/// Response body as it travels on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub data: Option<DataMessage>,
    pub fling_result: Option<FlingResult>,
}

impl ResponseMessage {
    /// An empty body; sent with a sequence number it acknowledges a request.
    pub fn ack() -> Self {
        Self::default()
    }

    /// Returns `true` when neither slot is set.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.fling_result.is_none()
    }

    /// Classifies the body.  A fling result takes precedence over data, so a
    /// body with both slots set is reported once, as a fling result.
    pub fn into_response(self) -> Response {
        match (self.fling_result, self.data) {
            (Some(result), _) => Response::FlingResult(result),
            (None, Some(data)) => Response::Data(data),
            (None, None) => Response::Empty,
        }
    }
}

impl From<Response> for ResponseMessage {
    fn from(response: Response) -> Self {
        let mut body = ResponseMessage::default();
        match response {
            Response::Data(m) => body.data = Some(m),
            Response::FlingResult(r) => body.fling_result = Some(r),
            Response::Empty => {}
        }
        body
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// Request or response half of an [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    Request(RequestMessage),
    Response(ResponseMessage),
}

/// Outer event-protocol wrapper: one per frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub sequence_number: Option<SequenceNumber>,
    pub body: Body,
}

impl Envelope {
    /// Wraps a single request.
    pub fn request(request: Request, sequence_number: Option<SequenceNumber>) -> Self {
        Self {
            sequence_number,
            body: Body::Request(request.into()),
        }
    }

    /// Wraps a response body.
    pub fn response(response: ResponseMessage, sequence_number: Option<SequenceNumber>) -> Self {
        Self {
            sequence_number,
            body: Body::Response(response),
        }
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match &self.body {
            Body::Request(r) if r.is_ping() => "ping",
            Body::Request(_) => "request",
            Body::Response(r) if r.is_empty() => "ack",
            Body::Response(_) => "response",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
