// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Every knob has a compile-time default matching the reference setup;
//! deployments override through `GAFFER_*` variables.

use std::time::Duration;

/// Host the primary (and standby) bind their listeners to.
pub fn bind_host() -> String {
    std::env::var("GAFFER_BIND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

/// Primary client port.
pub fn client_port() -> u16 {
    env_u16("GAFFER_CLIENT_PORT", 5000)
}

/// Primary worker port.
pub fn worker_port() -> u16 {
    env_u16("GAFFER_WORKER_PORT", 5001)
}

/// Standby replication port.
pub fn sync_port() -> u16 {
    env_u16("GAFFER_SYNC_PORT", 5002)
}

/// Address the primary pushes snapshots to.
pub fn standby_addr() -> String {
    let host = std::env::var("GAFFER_STANDBY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env_u16("GAFFER_STANDBY_PORT", sync_port());
    format!("{host}:{port}")
}

/// Host the standby probes when the primary goes silent.
pub fn primary_host() -> String {
    std::env::var("GAFFER_PRIMARY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

/// Worker heartbeat deadline: silence longer than this evicts the worker.
pub fn heartbeat_timeout() -> Duration {
    env_ms("GAFFER_HEARTBEAT_TIMEOUT_MS", 10_000)
}

/// Standby promotion deadline: snapshot silence longer than this triggers
/// the primary probe.
pub fn failover_timeout() -> Duration {
    env_ms("GAFFER_FAILOVER_TIMEOUT_MS", 15_000)
}

/// Fixed delay between replication reconnect attempts.
pub fn reconnect_backoff() -> Duration {
    env_ms("GAFFER_RECONNECT_BACKOFF_MS", 5_000)
}

/// Credential list as `user:pass` pairs, comma-separated.
pub fn users() -> Vec<(String, String)> {
    let raw = std::env::var("GAFFER_USERS")
        .unwrap_or_else(|_| "cliente1:senha123,cliente2:senha456".to_string());
    parse_users(&raw)
}

pub(crate) fn parse_users(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (user, pass) = pair.split_once(':')?;
            let user = user.trim();
            if user.is_empty() {
                return None;
            }
            Some((user.to_string(), pass.trim().to_string()))
        })
        .collect()
}

fn env_u16(name: &str, default: u16) -> u16 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_ms(name: &str, default: u64) -> Duration {
    Duration::from_millis(std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default))
}
