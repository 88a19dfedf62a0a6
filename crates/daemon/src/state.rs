// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared orchestrator state.
//!
//! One value owned by the top-level runtime and handed to every session
//! handler and background loop, so nothing lives in a global.

use std::time::Duration;

use gaffer_core::LamportClock;
use gaffer_wire::StateSnapshot;
use parking_lot::Mutex;

use crate::auth::AuthRegistry;
use crate::registry::WorkerRegistry;
use crate::replicate::ReplicationHandle;
use crate::store::TaskStore;

pub struct Orchestrator {
    pub clock: LamportClock,
    pub auth: AuthRegistry,
    pub workers: WorkerRegistry,
    pub tasks: TaskStore,
    pub replication: ReplicationHandle,
    /// Serializes dispatch and worker-failure handling (cursor integrity,
    /// no double-reassignment).
    pub(crate) dispatch_lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(auth: AuthRegistry, heartbeat_timeout: Duration) -> Self {
        Self {
            clock: LamportClock::new(),
            auth,
            workers: WorkerRegistry::new(heartbeat_timeout),
            tasks: TaskStore::new(),
            replication: ReplicationHandle::new(),
            dispatch_lock: Mutex::new(()),
        }
    }

    /// Deep-copy snapshot of the global state for one SYNC_STATE push.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            tasks: self.tasks.snapshot(),
            workers: self.workers.snapshot_ids(),
            clock: self.clock.read(),
        }
    }
}
