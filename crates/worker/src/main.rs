// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gaffer worker binary.
//!
//! Registers with the orchestrator, heartbeats on a fixed cadence, and
//! "processes" dispatched tasks by sleeping for a configurable delay;
//! the work itself is opaque to the platform. `GAFFER_EXIT_AFTER` makes
//! the worker die after N completions to exercise crash redistribution.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod node;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Worker node for the Gaffer orchestrator.
#[derive(Parser)]
struct Args {
    /// Orchestrator host
    #[arg(default_value = "127.0.0.1")]
    host: String,
    /// Orchestrator worker port
    #[arg(default_value_t = 5001)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let config = node::NodeConfig {
        worker_id: env::worker_id(),
        heartbeat_interval: env::heartbeat_interval(),
        work_delay: env::work_delay(),
        exit_after: env::exit_after(),
    };

    info!(worker_id = %config.worker_id, orchestrator = %addr, "worker starting");
    node::run(&addr, config).await.context("worker session ended")
}
