// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gaffer orchestrator daemon library.
//!
//! Shared by the `orchestrator` and `orchestrator-standby` binaries, and
//! by the in-process integration tests.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod auth;
pub mod dispatch;
pub mod env;
pub mod listener;
pub mod liveness;
pub mod registry;
pub mod replicate;
pub mod standby;
pub mod state;
pub mod store;

pub use auth::AuthRegistry;
pub use listener::Listener;
pub use registry::WorkerRegistry;
pub use replicate::ReplicationHandle;
pub use standby::{FailoverDetector, ReplicaState, StandbyPhase};
pub use state::Orchestrator;
pub use store::TaskStore;


/// Install the tracing subscriber shared by the daemon binaries.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
