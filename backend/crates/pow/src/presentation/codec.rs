//! Wire Codec
//!
//! Frames are single lines: `version|type|field_1|...|field_n\n`.
//! Fields are not escaped and must not contain `|` or `\n`.

use kernel::error::app_error::AppError;
use std::fmt;

/// Frame terminator
pub const FRAME_TERMINATOR: u8 = b'\n';

const FIELD_SEPARATOR: char = '|';

/// Protocol version tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVersion {
    V1,
}

impl MessageVersion {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageVersion::V1 => "v1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "v1" => Some(MessageVersion::V1),
            _ => None,
        }
    }
}

/// Message type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Error,
    ClientAuthReq,
    ServerAuthResp,
    ClientDataReq,
    ServerDataResp,
}

impl MessageType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageType::Error => "error",
            MessageType::ClientAuthReq => "c2s_auth_req",
            MessageType::ServerAuthResp => "s2c_auth_resp",
            MessageType::ClientDataReq => "c2s_data_req",
            MessageType::ServerDataResp => "s2c_data_resp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error" => Some(MessageType::Error),
            "c2s_auth_req" => Some(MessageType::ClientAuthReq),
            "s2c_auth_resp" => Some(MessageType::ServerAuthResp),
            "c2s_data_req" => Some(MessageType::ClientDataReq),
            "s2c_data_resp" => Some(MessageType::ServerDataResp),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub version: MessageVersion,
    pub kind: MessageType,
    pub payload: Vec<String>,
}

impl Message {
    pub fn new(kind: MessageType, payload: Vec<String>) -> Self {
        Self {
            version: MessageVersion::V1,
            kind,
            payload,
        }
    }
}

/// Frame decoding failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("got {0} chunks instead of at least 3")]
    Malformed(usize),

    #[error("message version {0} is not supported")]
    UnsupportedVersion(String),

    #[error("unknown message type {0}")]
    UnknownType(String),

    #[error("frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Encode a message into one terminated frame
///
/// The separator after the type is always written, so an empty payload
/// encodes as `v1|c2s_auth_req|\n`.
pub fn encode(message: &Message) -> Vec<u8> {
    let mut frame = String::with_capacity(
        32 + message.payload.iter().map(|field| field.len() + 1).sum::<usize>(),
    );
    frame.push_str(message.version.as_str());
    frame.push(FIELD_SEPARATOR);
    frame.push_str(message.kind.as_str());
    frame.push(FIELD_SEPARATOR);
    for (i, field) in message.payload.iter().enumerate() {
        if i > 0 {
            frame.push(FIELD_SEPARATOR);
        }
        frame.push_str(field);
    }
    let mut bytes = frame.into_bytes();
    bytes.push(FRAME_TERMINATOR);
    bytes
}

/// Decode one frame (terminator optional, surrounding whitespace ignored)
pub fn decode(frame: &[u8]) -> Result<Message, ProtocolError> {
    let text = std::str::from_utf8(frame)?.trim();
    let chunks: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    if chunks.len() < 3 {
        return Err(ProtocolError::Malformed(chunks.len()));
    }

    let version = MessageVersion::parse(chunks[0])
        .ok_or_else(|| ProtocolError::UnsupportedVersion(chunks[0].to_owned()))?;
    let kind =
        MessageType::parse(chunks[1]).ok_or_else(|| ProtocolError::UnknownType(chunks[1].to_owned()))?;

    Ok(Message {
        version,
        kind,
        payload: chunks[2..].iter().map(|chunk| (*chunk).to_owned()).collect(),
    })
}

impl From<ProtocolError> for AppError {
    fn from(err: ProtocolError) -> Self {
        AppError::protocol(err.to_string()).with_source(err)
    }
}
