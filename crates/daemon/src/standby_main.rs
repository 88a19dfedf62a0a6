// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standby orchestrator binary.
//!
//! Receives SYNC_STATE snapshots from the primary and watches for its
//! silence. On confirmed primary failure it prints an operator banner
//! with the retained state and exits; promotion itself is manual.

use std::sync::Arc;
use std::time::Instant;

use gaffer_daemon::standby::{probe, receive_stream};
use gaffer_daemon::{env, FailoverDetector, ReplicaState, StandbyPhase};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    gaffer_daemon::init_tracing();

    let host = env::bind_host();
    let listener = TcpListener::bind((host.as_str(), env::sync_port())).await?;
    info!(sync_port = env::sync_port(), primary = %env::primary_host(), "standby listening");

    let replica = Arc::new(ReplicaState::new());
    let detector = Arc::new(Mutex::new(FailoverDetector::new(
        Instant::now(),
        env::failover_timeout(),
    )));
    let failed_over = CancellationToken::new();

    spawn_failover_detector(Arc::clone(&detector), failed_over.clone());

    tokio::select! {
        _ = failed_over.cancelled() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            return Ok(());
        }
        _ = accept_primaries(&listener, &replica, &detector) => {}
    }

    // Failover declared: hand the operator what the replica knows and stop.
    error!("primary declared dead, standby terminating for manual promotion");
    eprintln!("=====================================================");
    eprintln!(" FAILOVER: primary orchestrator is unreachable");
    eprintln!(" replicated state at takeover: {}", replica.summary());
    eprintln!(" restart this node as `orchestrator` to promote it");
    eprintln!("=====================================================");
    Ok(())
}

/// Accept one primary at a time and apply its snapshot stream.
async fn accept_primaries(
    listener: &TcpListener,
    replica: &ReplicaState,
    detector: &Mutex<FailoverDetector>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!(%peer, "primary connected");
                let (mut reader, _writer) = stream.into_split();
                if let Err(e) = receive_stream(&mut reader, replica, detector, Instant::now).await {
                    warn!(error = %e, "replication stream lost");
                }
            }
            Err(e) => error!(error = %e, "accept error on replication port"),
        }
    }
}

/// Check the snapshot silence every half deadline; on SUSPECT probe the
/// primary's two frontends and either reset or declare failover.
fn spawn_failover_detector(detector: Arc<Mutex<FailoverDetector>>, failed_over: CancellationToken) {
    tokio::spawn(async move {
        let client_addr = format!("{}:{}", env::primary_host(), env::client_port());
        let worker_addr = format!("{}:{}", env::primary_host(), env::worker_port());
        let mut interval = tokio::time::interval(env::failover_timeout() / 2);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            if detector.lock().assess(Instant::now()) != StandbyPhase::Suspect {
                continue;
            }
            warn!("no snapshot within deadline, probing primary");
            let reachable = probe(&client_addr).await || probe(&worker_addr).await;
            match detector.lock().resolve_probe(Instant::now(), reachable) {
                StandbyPhase::FailedOver => {
                    failed_over.cancel();
                    return;
                }
                phase => info!(%phase, "primary still reachable, false alarm"),
            }
        }
    });
}
