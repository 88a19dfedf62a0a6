// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed message envelope.
//!
//! Every frame on the wire is one [`Envelope`]: a payload tagged by `kind`,
//! an optional session token, and the sender's Lamport timestamp. The
//! payload union is closed, so an unknown kind fails to decode instead
//! of surfacing as an untyped blob.

use gaffer_core::{Credentials, Task, TaskId, WorkerId};
use serde::{Deserialize, Serialize};

use crate::snapshot::StateSnapshot;

/// Protocol payload, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Client → orchestrator: open a session
    Authenticate(Credentials),

    /// Orchestrator → client: session granted
    AuthOk { token: String },

    /// Orchestrator → client: bad credentials
    AuthFail,

    /// Client → orchestrator: new work item (status field ignored)
    SubmitTask { task: Task },

    /// Orchestrator → client: submission acknowledged
    TaskAccepted { task_id: TaskId },

    /// Client → orchestrator: look up a task
    QueryStatus { task_id: TaskId },

    /// Orchestrator → client: lookup result
    StatusReply { task: Option<Task> },

    /// Worker → orchestrator: join the pool
    RegisterWorker { worker_id: WorkerId },

    /// Worker → orchestrator: liveness signal (lamport is 0; heartbeats
    /// carry no timestamp)
    Heartbeat { worker_id: WorkerId },

    /// Worker → orchestrator: completion report with the final lamport
    TaskDone { task: Task },

    /// Orchestrator → worker: assignment (status = RUNNING)
    NewTask { task: Task },

    /// Primary → standby: full state snapshot
    SyncState(StateSnapshot),
}

gaffer_core::display_as! {
    Message {
        Message::Authenticate(..) => "AUTHENTICATE",
        Message::AuthOk { .. } => "AUTH_OK",
        Message::AuthFail => "AUTH_FAIL",
        Message::SubmitTask { .. } => "SUBMIT_TASK",
        Message::TaskAccepted { .. } => "TASK_ACCEPTED",
        Message::QueryStatus { .. } => "QUERY_STATUS",
        Message::StatusReply { .. } => "STATUS_REPLY",
        Message::RegisterWorker { .. } => "REGISTER_WORKER",
        Message::Heartbeat { .. } => "HEARTBEAT",
        Message::TaskDone { .. } => "TASK_DONE",
        Message::NewTask { .. } => "NEW_TASK",
        Message::SyncState(..) => "SYNC_STATE",
    }
}

/// One framed message: payload, optional session token, Lamport timestamp.
///
/// On the wire the payload is flattened next to `kind`; the session token
/// travels under the `auth` key so it can never shadow a payload field
/// (AUTH_OK itself carries a `token`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default, rename = "auth", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub lamport: u64,
}

impl Envelope {
    pub fn new(message: Message, lamport: u64) -> Self {
        Self { message, token: None, lamport }
    }

    pub fn with_token(message: Message, token: impl Into<String>, lamport: u64) -> Self {
        Self { message, token: Some(token.into()), lamport }
    }
}
