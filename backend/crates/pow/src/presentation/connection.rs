//! Connection Handler
//!
//! Runs the read → dispatch → write loop for one client connection.
//!
//! The connection has a fixed lifetime counted from acceptance. Reaching it,
//! reaching EOF, or a shutdown signal ends the loop quietly. I/O failures end
//! it with a warning. Bad frames and failed requests are answered with an
//! `error` frame and the loop goes on.

use crate::presentation::codec::{FRAME_TERMINATOR, decode, encode};
use crate::presentation::dto::{Request, RequestMeta, Response};
use crate::presentation::router::RequestHandler;
use chrono::Utc;
use platform::client::ClientIdentity;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::sync::watch;
use tokio::time::{self, Instant};

/// Per-connection limits
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Lifetime of one connection, reads and writes included
    pub max_lifetime: Duration,
    /// Longest accepted frame, terminator included
    pub max_frame_len: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_lifetime: Duration::from_millis(500),
            max_frame_len: 4096,
        }
    }
}

enum FrameRead {
    Frame,
    Eof,
    TooLong,
}

/// Serve one connection until it ends
pub async fn serve_connection<S, H>(
    stream: S,
    peer: SocketAddr,
    handler: Arc<H>,
    mut shutdown: watch::Receiver<()>,
    config: &ConnectionConfig,
) where
    S: AsyncRead + AsyncWrite,
    H: RequestHandler,
{
    let deadline = Instant::now() + config.max_lifetime;
    let identity = ClientIdentity::from_addr(peer);
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::with_capacity(256);

    loop {
        frame.clear();
        let read = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                tracing::debug!(peer = %peer, "Connection closed by shutdown");
                return;
            }
            read = time::timeout_at(
                deadline,
                read_frame(&mut reader, &mut frame, config.max_frame_len),
            ) => read,
        };

        match read {
            Err(_) => {
                tracing::debug!(peer = %peer, "Connection lifetime reached");
                return;
            }
            Ok(Err(e)) => {
                tracing::warn!(peer = %peer, error = %e, "Failed to read frame");
                return;
            }
            Ok(Ok(FrameRead::Eof)) => {
                tracing::debug!(peer = %peer, "Connection closed by client");
                return;
            }
            Ok(Ok(FrameRead::TooLong)) => {
                tracing::warn!(peer = %peer, limit = config.max_frame_len, "Frame too long");
                return;
            }
            Ok(Ok(FrameRead::Frame)) => {}
        }

        let response = match decode(&frame) {
            Ok(message) => {
                let meta = RequestMeta::new(identity.clone(), Utc::now());
                match handler.handle(Request::from_message(message, meta)).await {
                    Ok(response) => response,
                    Err(e) => {
                        if e.is_server_error() {
                            tracing::warn!(
                                peer = %peer,
                                code = e.kind().code(),
                                error = %e,
                                "Request failed"
                            );
                        } else {
                            tracing::debug!(
                                peer = %peer,
                                code = e.kind().code(),
                                error = %e,
                                "Request rejected"
                            );
                        }
                        Response::error(e.message())
                    }
                }
            }
            Err(e) => {
                tracing::debug!(peer = %peer, error = %e, "Malformed frame");
                Response::error(e.to_string())
            }
        };

        let bytes = encode(&response.into_message());
        let written = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                tracing::debug!(peer = %peer, "Connection closed by shutdown");
                return;
            }
            written = time::timeout_at(deadline, writer.write_all(&bytes)) => written,
        };

        match written {
            Err(_) => {
                tracing::debug!(peer = %peer, "Connection lifetime reached");
                return;
            }
            Ok(Err(e)) => {
                tracing::warn!(peer = %peer, error = %e, "Failed to write frame");
                return;
            }
            Ok(Ok(())) => {}
        }
    }
}

async fn read_frame<R>(
    reader: &mut R,
    frame: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<FrameRead>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader
        .take(max_len as u64)
        .read_until(FRAME_TERMINATOR, frame)
        .await?;

    if read == 0 {
        return Ok(FrameRead::Eof);
    }
    if frame.last() != Some(&FRAME_TERMINATOR) {
        // Either the limit was hit or the peer closed mid-frame
        return Ok(if read >= max_len {
            FrameRead::TooLong
        } else {
            FrameRead::Eof
        });
    }
    Ok(FrameRead::Frame)
}
