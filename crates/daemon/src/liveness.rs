// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat-based worker liveness monitor.
//!
//! The only detector of workers that keep their socket open but stop
//! heartbeating; dropped sockets are caught by the worker session handler
//! directly. The silence arithmetic lives in each member's registry
//! deadline; this loop only schedules the sweeps and evicts the expired.

use std::sync::Arc;
use std::time::Instant;

use gaffer_core::WorkerId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::state::Orchestrator;

/// Sweep once per heartbeat allowance until cancelled.
pub fn spawn(orch: Arc<Orchestrator>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(orch.workers.heartbeat_timeout());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await; // first tick completes immediately
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = interval.tick() => {
                    sweep(&orch, Instant::now());
                }
            }
        }
    })
}

/// One scan pass: evict every worker whose deadline expired at `now`.
/// Returns the evicted ids.
pub fn sweep(orch: &Orchestrator, now: Instant) -> Vec<WorkerId> {
    let stale = orch.workers.stale(now);
    for id in &stale {
        warn!(worker_id = %id, "heartbeat deadline missed, declaring worker dead");
        orch.handle_worker_failure(id);
    }
    stale
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
