//! TCP Listener
//!
//! Accepts connections and serves each one on its own task until shutdown.

use crate::presentation::connection::{ConnectionConfig, serve_connection};
use crate::presentation::router::RequestHandler;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time;

/// Listener tuning
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub connection: ConnectionConfig,
    /// Pause after a failed accept before trying again
    pub accept_backoff: Duration,
    /// Longest wait for in-flight connections after shutdown
    pub drain_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            accept_backoff: Duration::from_millis(50),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// Bound TCP listener
pub struct Listener {
    inner: TcpListener,
    config: ListenerConfig,
}

impl Listener {
    /// Bind the listening socket. Failure here is fatal for the caller.
    pub async fn bind<A: ToSocketAddrs>(addr: A, config: ListenerConfig) -> io::Result<Self> {
        let inner = TcpListener::bind(addr).await?;
        Ok(Self { inner, config })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accept until `shutdown` fires (or its sender is dropped), then drain
    ///
    /// Connections still running after the drain timeout are aborted.
    pub async fn serve<H>(self, handler: Arc<H>, mut shutdown: watch::Receiver<()>)
    where
        H: RequestHandler + Send + Sync + 'static,
    {
        let connection_config = Arc::new(self.config.connection.clone());
        let mut connections = JoinSet::new();

        if let Ok(addr) = self.inner.local_addr() {
            tracing::info!(addr = %addr, "Accepting connections");
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!(error = %e, "Connection task panicked");
                        }
                    }
                }
                accepted = self.inner.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(peer = %peer, "Accepted connection");
                        let handler = Arc::clone(&handler);
                        let shutdown = shutdown.clone();
                        let config = Arc::clone(&connection_config);
                        connections.spawn(async move {
                            serve_connection(stream, peer, handler, shutdown, &config).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept connection");
                        if !back_off(self.config.accept_backoff, &mut shutdown).await {
                            break;
                        }
                    }
                },
            }
        }

        tracing::info!(
            in_flight = connections.len(),
            "Stopped accepting, draining connections"
        );

        let drained = time::timeout(self.config.drain_timeout, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                remaining = connections.len(),
                "Drain timeout reached, aborting connections"
            );
            connections.shutdown().await;
        }

        tracing::info!("Listener shut down");
    }
}

/// Wait out the accept backoff; `false` if shutdown fired first
async fn back_off(delay: Duration, shutdown: &mut watch::Receiver<()>) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.changed() => false,
        _ = time::sleep(delay) => true,
    }
}
