//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Minimal view of an inbound client frame: only `type` is inspected, the
/// rest of the frame is forwarded untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Dispatch decision for an inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Ping,
    Chat,
    /// Explicit but unrecognized `type`
    Unknown(String),
    /// Not JSON, or JSON without a string `type`
    Unparseable,
}

impl InboundKind {
    pub fn classify(text: &str) -> Self {
        match serde_json::from_str::<InboundFrame>(text) {
            Ok(frame) => match frame.kind.as_str() {
                "ping" => Self::Ping,
                "chat" => Self::Chat,
                _ => Self::Unknown(frame.kind),
            },
            Err(_) => Self::Unparseable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboundType {
    Pong,
}

/// Reply to an application-level `{"type":"ping"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongMessage {
    pub r#type: OutboundType,
}

impl PongMessage {
    pub fn new() -> Self {
        Self {
            r#type: OutboundType::Pong,
        }
    }
}

impl Default for PongMessage {
    fn default() -> Self {
        Self::new()
    }
}
