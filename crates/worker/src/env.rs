// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the worker crate.

use std::time::Duration;

use gaffer_core::WorkerId;

/// Worker id: `GAFFER_WORKER_ID`, or a random one.
pub fn worker_id() -> WorkerId {
    match std::env::var("GAFFER_WORKER_ID") {
        Ok(id) if !id.is_empty() => WorkerId::new(id),
        _ => WorkerId::new(format!("wrk-{}", nanoid::nanoid!(8))),
    }
}

/// Heartbeat cadence (default 5 s).
pub fn heartbeat_interval() -> Duration {
    env_ms("GAFFER_HEARTBEAT_INTERVAL_MS", 5_000)
}

/// Simulated processing time per task (default 6 s).
pub fn work_delay() -> Duration {
    env_ms("GAFFER_WORK_DELAY_MS", 6_000)
}

/// Fault injection: exit abruptly after completing this many tasks.
pub fn exit_after() -> Option<u32> {
    std::env::var("GAFFER_EXIT_AFTER").ok().and_then(|s| s.parse().ok())
}

fn env_ms(name: &str, default: u64) -> Duration {
    Duration::from_millis(std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default))
}
