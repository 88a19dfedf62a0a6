// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Primary orchestrator binary.

use std::sync::Arc;

use gaffer_daemon::{env, liveness, replicate, AuthRegistry, Listener, Orchestrator};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    gaffer_daemon::init_tracing();

    let host = env::bind_host();
    let clients = TcpListener::bind((host.as_str(), env::client_port())).await?;
    let workers = TcpListener::bind((host.as_str(), env::worker_port())).await?;
    info!(
        client_port = env::client_port(),
        worker_port = env::worker_port(),
        standby = %env::standby_addr(),
        "orchestrator listening"
    );

    let orch = Arc::new(Orchestrator::new(
        AuthRegistry::from_pairs(env::users()),
        env::heartbeat_timeout(),
    ));
    let cancel = CancellationToken::new();

    replicate::spawn(
        Arc::clone(&orch),
        env::standby_addr(),
        env::reconnect_backoff(),
        cancel.child_token(),
    );
    liveness::spawn(Arc::clone(&orch), cancel.child_token());

    let listener = Listener::new(clients, workers, Arc::clone(&orch));
    tokio::select! {
        _ = listener.run(cancel.child_token()) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            cancel.cancel();
        }
    }
    Ok(())
}
