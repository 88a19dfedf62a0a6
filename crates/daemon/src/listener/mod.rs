// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accept loops for the client and worker ports.
//!
//! Each accepted connection gets its own spawned task; the handlers share
//! the orchestrator state and never block the accept loops.

mod client;
mod worker;

use std::sync::Arc;

use gaffer_wire::ProtocolError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::state::Orchestrator;

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Listener pair for the two frontends of the primary.
pub struct Listener {
    clients: TcpListener,
    workers: TcpListener,
    orch: Arc<Orchestrator>,
}

impl Listener {
    pub fn new(clients: TcpListener, workers: TcpListener, orch: Arc<Orchestrator>) -> Self {
        Self { clients, workers, orch }
    }

    /// Accept until cancelled, spawning a task per connection.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                result = self.clients.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!(%peer, "client connected");
                            let orch = Arc::clone(&self.orch);
                            tokio::spawn(async move {
                                if let Err(e) = client::handle(stream, orch).await {
                                    log_connection_error("client", e);
                                }
                            });
                        }
                        Err(e) => error!(error = %e, "client accept error"),
                    }
                }
                result = self.workers.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!(%peer, "worker connected");
                            let orch = Arc::clone(&self.orch);
                            tokio::spawn(async move {
                                if let Err(e) = worker::handle(stream, orch).await {
                                    log_connection_error("worker", e);
                                }
                            });
                        }
                        Err(e) => error!(error = %e, "worker accept error"),
                    }
                }
            }
        }
    }
}

fn log_connection_error(peer_kind: &str, e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!(peer_kind, "peer disconnected")
        }
        _ => warn!(peer_kind, error = %e, "connection error"),
    }
}
