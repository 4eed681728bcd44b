//! Request and response DTOs passed between the connection loop and the router

use crate::presentation::codec::{Message, MessageType};
use chrono::{DateTime, Utc};
use platform::client::ClientIdentity;

/// Caller context, captured by the connection loop for every frame
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub identity: ClientIdentity,
    pub received_at: DateTime<Utc>,
}

impl RequestMeta {
    pub fn new(identity: ClientIdentity, received_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            received_at,
        }
    }
}

/// Decoded request
#[derive(Debug, Clone)]
pub struct Request {
    pub kind: MessageType,
    pub meta: RequestMeta,
    pub payload: Vec<String>,
}

impl Request {
    pub fn from_message(message: Message, meta: RequestMeta) -> Self {
        Self {
            kind: message.kind,
            meta,
            payload: message.payload,
        }
    }
}

/// Response to be encoded back onto the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub kind: MessageType,
    pub payload: Vec<String>,
}

impl Response {
    pub fn new(kind: MessageType, payload: Vec<String>) -> Self {
        Self { kind, payload }
    }

    pub fn auth(seed: String) -> Self {
        Self::new(MessageType::ServerAuthResp, vec![seed])
    }

    pub fn data(content: String) -> Self {
        Self::new(MessageType::ServerDataResp, vec![content])
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, vec![message.into()])
    }

    pub fn into_message(self) -> Message {
        Message::new(self.kind, self.payload)
    }
}
