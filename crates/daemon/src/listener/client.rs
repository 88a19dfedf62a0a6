// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client session handler.
//!
//! Two-state machine per connection: AWAIT_AUTH accepts only AUTHENTICATE,
//! then AUTHED serves SUBMIT_TASK and QUERY_STATUS. Every inbound
//! timestamp is merged into the clock, every reply carries a fresh tick.
//! A missing or invalid token terminates the connection without a reply.

use std::sync::Arc;

use gaffer_core::Task;
use gaffer_wire::{Envelope, Message};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use super::ConnectionError;
use crate::state::Orchestrator;

pub(super) async fn handle(
    stream: TcpStream,
    orch: Arc<Orchestrator>,
) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    // AWAIT_AUTH: the first frame must be AUTHENTICATE
    let envelope = gaffer_wire::read_envelope(&mut reader).await?;
    if envelope.lamport > 0 {
        orch.clock.merge(envelope.lamport);
    }
    let credentials = match envelope.message {
        Message::Authenticate(credentials) => credentials,
        other => {
            warn!(kind = %other, "expected AUTHENTICATE, closing");
            return Ok(());
        }
    };

    let username = credentials.username.clone();
    let Some(token) = orch.auth.verify(&credentials.username, &credentials.password) else {
        info!(user = %username, "authentication failed");
        let lamport = orch.clock.tick();
        gaffer_wire::write_envelope(&mut writer, &Envelope::new(Message::AuthFail, lamport))
            .await?;
        return Ok(());
    };

    info!(user = %username, "client authenticated");
    let lamport = orch.clock.tick();
    gaffer_wire::write_envelope(
        &mut writer,
        &Envelope::new(Message::AuthOk { token: token.clone() }, lamport),
    )
    .await?;

    // AUTHED: request/response until the client leaves
    loop {
        let envelope = gaffer_wire::read_envelope(&mut reader).await?;
        if envelope.lamport > 0 {
            orch.clock.merge(envelope.lamport);
        }

        let token_ok = envelope
            .token
            .as_deref()
            .is_some_and(|t| orch.auth.user_of(t).is_some());
        if !token_ok {
            warn!(user = %username, kind = %envelope.message, "missing or invalid token, closing");
            return Ok(());
        }

        let reply = match envelope.message {
            Message::SubmitTask { task: submitted } => {
                let task_id = submitted.id.clone();
                let mut record = Task::new(task_id.clone(), username.clone(), submitted.payload);
                record.lamport = orch.clock.tick();
                if orch.tasks.insert(record) {
                    info!(task_id = %task_id, user = %username, "task accepted");
                    orch.replication.push();
                    orch.dispatch_task(&task_id);
                } else {
                    debug!(task_id = %task_id, "duplicate submission ignored");
                }
                Message::TaskAccepted { task_id }
            }
            Message::QueryStatus { task_id } => {
                let task = orch.tasks.get(&task_id);
                if task.is_none() {
                    debug!(task_id = %task_id, "status query for unknown task");
                }
                Message::StatusReply { task }
            }
            other => {
                warn!(user = %username, kind = %other, "unexpected message from client, closing");
                return Ok(());
            }
        };

        let lamport = orch.clock.tick();
        gaffer_wire::write_envelope(&mut writer, &Envelope::new(reply, lamport)).await?;
    }
}
