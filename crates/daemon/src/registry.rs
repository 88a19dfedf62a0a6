// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live worker pool with round-robin cursor.
//!
//! One mutex covers membership, per-worker bookkeeping, and the cursor, so
//! `next`/`add`/`remove` interleavings can never leave the cursor out of
//! bounds. The registry owns the heartbeat allowance: every member carries
//! a liveness [`Deadline`] refreshed by `touch` and swept by `stale`.
//! Writes to a worker's socket are not under this mutex: each worker's
//! sink is an unbounded channel drained by its session's writer task,
//! which serializes writes per worker.

use std::time::{Duration, Instant};

use gaffer_core::{Deadline, WorkerId};
use gaffer_wire::Envelope;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Per-worker bookkeeping. The connection socket itself is owned by the
/// worker's session handler; the registry closes it on eviction by
/// cancelling `cancel`, which ends the session loop and drops the stream.
struct WorkerHandle {
    sink: UnboundedSender<Envelope>,
    deadline: Deadline,
    cancel: CancellationToken,
}

#[derive(Default)]
struct RegistryInner {
    workers: IndexMap<WorkerId, WorkerHandle>,
    cursor: usize,
}

impl RegistryInner {
    fn remove(&mut self, id: &WorkerId) -> Option<WorkerHandle> {
        let (index, _, handle) = self.workers.shift_remove_full(id.as_str())?;
        if self.workers.is_empty() {
            self.cursor = 0;
        } else {
            if index < self.cursor {
                self.cursor -= 1;
            }
            if self.cursor >= self.workers.len() {
                self.cursor = 0;
            }
        }
        handle.cancel.cancel();
        Some(handle)
    }
}

/// Registry of live workers, insertion-ordered for round-robin dispatch.
pub struct WorkerRegistry {
    heartbeat_timeout: Duration,
    inner: Mutex<RegistryInner>,
}

impl WorkerRegistry {
    pub fn new(heartbeat_timeout: Duration) -> Self {
        Self { heartbeat_timeout, inner: Mutex::new(RegistryInner::default()) }
    }

    /// Silence allowance before a member is considered dead; also the
    /// liveness monitor's scan period.
    pub fn heartbeat_timeout(&self) -> Duration {
        self.heartbeat_timeout
    }

    /// Register a worker with a fresh heartbeat deadline. Re-registration
    /// of an existing id evicts the old entry first (cancelling its
    /// session), then appends the newcomer at the tail of the rotation.
    pub fn add(
        &self,
        id: WorkerId,
        sink: UnboundedSender<Envelope>,
        now: Instant,
        cancel: CancellationToken,
    ) {
        let handle =
            WorkerHandle { sink, deadline: Deadline::new(now, self.heartbeat_timeout), cancel };
        let mut inner = self.inner.lock();
        let _ = inner.remove(&id);
        inner.workers.insert(id, handle);
    }

    /// Evict a worker, cancelling its session. Returns false if the
    /// worker was no longer registered.
    pub fn remove(&self, id: &WorkerId) -> bool {
        self.inner.lock().remove(id).is_some()
    }

    /// Round-robin selection: the worker under the cursor, then advance.
    /// Returns the id together with its sink so selection and lookup are
    /// one atomic step.
    pub fn next(&self) -> Option<(WorkerId, UnboundedSender<Envelope>)> {
        let mut inner = self.inner.lock();
        let len = inner.workers.len();
        if len == 0 {
            return None;
        }
        let cursor = inner.cursor;
        let selected = inner
            .workers
            .get_index(cursor)
            .map(|(id, handle)| (id.clone(), handle.sink.clone()))?;
        inner.cursor = (cursor + 1) % len;
        Some(selected)
    }

    /// Record a heartbeat. Returns false for unknown workers.
    pub fn touch(&self, id: &WorkerId, now: Instant) -> bool {
        let mut inner = self.inner.lock();
        match inner.workers.get_mut(id.as_str()) {
            Some(handle) => {
                handle.deadline.refresh(now);
                true
            }
            None => false,
        }
    }

    /// Workers whose heartbeat deadline has expired at `now`.
    pub fn stale(&self, now: Instant) -> Vec<WorkerId> {
        let inner = self.inner.lock();
        inner
            .workers
            .iter()
            .filter(|(_, handle)| handle.deadline.expired(now))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Registered ids in insertion order, for replication.
    pub fn snapshot_ids(&self) -> Vec<WorkerId> {
        self.inner.lock().workers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().workers.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.inner.lock().cursor
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
