// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker session: registration, heartbeats, task processing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use gaffer_core::{LamportClock, WorkerId};
use gaffer_wire::{Envelope, Message};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub struct NodeConfig {
    pub worker_id: WorkerId,
    pub heartbeat_interval: Duration,
    pub work_delay: Duration,
    pub exit_after: Option<u32>,
}

/// Connect, register, and serve until the orchestrator goes away.
pub async fn run(addr: &str, config: NodeConfig) -> Result<()> {
    let stream = TcpStream::connect(addr).await?;
    let (mut reader, writer) = stream.into_split();

    let clock = Arc::new(LamportClock::new());
    let (outbox, outbox_rx) = mpsc::unbounded_channel();
    spawn_writer(writer, outbox_rx);

    let register = Message::RegisterWorker { worker_id: config.worker_id.clone() };
    outbox.send(Envelope::new(register, clock.tick()))?;
    info!(worker_id = %config.worker_id, "registered with orchestrator");

    spawn_heartbeats(config.worker_id.clone(), outbox.clone(), config.heartbeat_interval);

    // Tasks are processed one at a time, in arrival order; heartbeats keep
    // flowing from their own timer while a task sleeps here.
    let mut completed: u32 = 0;
    loop {
        let envelope = match gaffer_wire::read_envelope(&mut reader).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "orchestrator connection lost");
                return Ok(());
            }
        };
        if envelope.lamport > 0 {
            clock.merge(envelope.lamport);
        }

        match envelope.message {
            Message::NewTask { mut task } => {
                info!(task_id = %task.id, payload = %task.payload, "processing task");
                tokio::time::sleep(config.work_delay).await;

                task.lamport = clock.tick();
                let lamport = task.lamport;
                info!(task_id = %task.id, lamport, "task finished");
                outbox.send(Envelope::new(Message::TaskDone { task }, lamport))?;

                completed += 1;
                if config.exit_after.is_some_and(|n| completed >= n) {
                    error!(completed, "simulated fault: exiting without cleanup");
                    std::process::exit(1);
                }
            }
            other => {
                warn!(kind = %other, "unexpected message from orchestrator, ignoring");
            }
        }
    }
}

/// Heartbeats carry no timestamp (`lamport = 0`); the orchestrator ticks
/// its own clock on receipt.
fn spawn_heartbeats(
    worker_id: WorkerId,
    outbox: mpsc::UnboundedSender<Envelope>,
    interval: Duration,
) {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            timer.tick().await;
            let heartbeat = Message::Heartbeat { worker_id: worker_id.clone() };
            if outbox.send(Envelope::new(heartbeat, 0)).is_err() {
                return;
            }
        }
    });
}

fn spawn_writer(mut writer: OwnedWriteHalf, mut outbox: mpsc::UnboundedReceiver<Envelope>) {
    tokio::spawn(async move {
        while let Some(envelope) = outbox.recv().await {
            if let Err(e) = gaffer_wire::write_envelope(&mut writer, &envelope).await {
                warn!(error = %e, "write to orchestrator failed");
                return;
            }
        }
    });
}
