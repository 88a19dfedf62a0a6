// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated client session over the wire protocol.

use anyhow::{anyhow, bail, Result};
use gaffer_core::{Credentials, LamportClock, Task, TaskId};
use gaffer_wire::{Envelope, Message};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

pub struct Session {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    clock: LamportClock,
    token: String,
    username: String,
}

impl Session {
    /// Connect and run the AUTHENTICATE handshake.
    pub async fn connect(addr: &str, credentials: Credentials) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (mut reader, mut writer) = stream.into_split();
        let clock = LamportClock::new();
        let username = credentials.username.clone();

        let hello = Envelope::new(Message::Authenticate(credentials), clock.tick());
        gaffer_wire::write_envelope(&mut writer, &hello).await?;

        let reply = gaffer_wire::read_envelope(&mut reader).await?;
        clock.merge(reply.lamport);
        match reply.message {
            Message::AuthOk { token } => Ok(Self { reader, writer, clock, token, username }),
            Message::AuthFail => bail!("orchestrator rejected the credentials"),
            other => bail!("unexpected reply to AUTHENTICATE: {other}"),
        }
    }

    /// Submit a task; returns the accepted id.
    pub async fn submit(&mut self, id: &str, payload: &str) -> Result<TaskId> {
        let task = Task::new(id, self.username.clone(), payload);
        match self.request(Message::SubmitTask { task }).await? {
            Message::TaskAccepted { task_id } => Ok(task_id),
            other => Err(unexpected(other)),
        }
    }

    /// Query a task's current record.
    pub async fn query(&mut self, id: &str) -> Result<Option<Task>> {
        match self.request(Message::QueryStatus { task_id: id.into() }).await? {
            Message::StatusReply { task } => Ok(task),
            other => Err(unexpected(other)),
        }
    }

    async fn request(&mut self, message: Message) -> Result<Message> {
        let envelope = Envelope::with_token(message, self.token.clone(), self.clock.tick());
        gaffer_wire::write_envelope(&mut self.writer, &envelope).await?;
        let reply = gaffer_wire::read_envelope(&mut self.reader).await?;
        self.clock.merge(reply.lamport);
        Ok(reply.message)
    }
}

fn unexpected(message: Message) -> anyhow::Error {
    anyhow!("unexpected reply from orchestrator: {message}")
}
