// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication snapshot carried in SYNC_STATE.

use gaffer_core::{Task, TaskId, WorkerId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Deep copy of the primary's global state.
///
/// Task and worker order is the primary's insertion order, so a promoted
/// standby would re-dispatch the backlog in the same order the primary
/// would have.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tasks: IndexMap<TaskId, Task>,
    pub workers: Vec<WorkerId>,
    pub clock: u64,
}

impl StateSnapshot {
    /// Count of tasks in a given status, for operator summaries.
    pub fn count_status(&self, status: gaffer_core::TaskStatus) -> usize {
        self.tasks.values().filter(|t| t.status == status).count()
    }
}
