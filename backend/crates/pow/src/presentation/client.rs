//! Transport Client
//!
//! Opens one TCP connection per request, sends a frame and reads one back.

use crate::domain::repository::AdmissionGateway;
use crate::error::ClientError;
use crate::presentation::codec::{FRAME_TERMINATOR, Message, MessageType, decode, encode};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};

/// Client timeouts
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Limit on establishing the TCP connection
    pub dial_timeout: Duration,
    /// Limit on the whole exchange once connected
    pub connection_timeout: Duration,
    /// Longest accepted response frame
    pub max_frame_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dial_timeout: Duration::from_millis(100),
            connection_timeout: Duration::from_millis(500),
            max_frame_len: 4096,
        }
    }
}

/// Client for the admission protocol
#[derive(Debug, Clone)]
pub struct PowClient {
    addr: String,
    config: ClientConfig,
}

impl PowClient {
    pub fn new(addr: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            addr: addr.into(),
            config,
        }
    }

    /// Send one message and return the reply
    ///
    /// An `error` reply is turned into [`ClientError::Server`].
    pub async fn send(&self, message: &Message) -> Result<Message, ClientError> {
        let stream = time::timeout(self.config.dial_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| ClientError::ConnectTimeout)??;

        let deadline = Instant::now() + self.config.connection_timeout;
        let reply = time::timeout_at(deadline, self.exchange(stream, message))
            .await
            .map_err(|_| ClientError::Timeout)??;

        if reply.kind == MessageType::Error {
            return Err(ClientError::Server(reply.payload.join("|")));
        }
        Ok(reply)
    }

    async fn exchange(&self, stream: TcpStream, message: &Message) -> Result<Message, ClientError> {
        let (reader, mut writer) = stream.into_split();
        writer.write_all(&encode(message)).await?;

        let mut frame = Vec::with_capacity(256);
        let read = BufReader::new(reader)
            .take(self.config.max_frame_len as u64)
            .read_until(FRAME_TERMINATOR, &mut frame)
            .await?;
        if read == 0 {
            return Err(ClientError::Closed);
        }

        Ok(decode(&frame)?)
    }
}

fn single_field(reply: Message, expected: MessageType) -> Result<String, ClientError> {
    if reply.kind != expected {
        return Err(ClientError::UnexpectedResponse(format!(
            "expected {expected}, got {}",
            reply.kind
        )));
    }
    let got = reply.payload.len();
    let [field]: [String; 1] = reply.payload.try_into().map_err(|_| {
        ClientError::UnexpectedResponse(format!("expected 1 field in {expected}, got {got}"))
    })?;
    Ok(field)
}

impl AdmissionGateway for PowClient {
    async fn request_seed(&self) -> Result<String, ClientError> {
        let reply = self
            .send(&Message::new(MessageType::ClientAuthReq, Vec::new()))
            .await?;
        single_field(reply, MessageType::ServerAuthResp)
    }

    async fn request_data(&self, token: &str, seed: &str) -> Result<String, ClientError> {
        let reply = self
            .send(&Message::new(
                MessageType::ClientDataReq,
                vec![token.to_owned(), seed.to_owned()],
            ))
            .await?;
        single_field(reply, MessageType::ServerDataResp)
    }
}
