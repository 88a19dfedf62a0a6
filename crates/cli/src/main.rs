// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gaffer client binary.
//!
//! Interactive session against the orchestrator: authenticate once, then
//! submit tasks and query their status from a small menu.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod session;

use anyhow::Context;
use clap::Parser;
use gaffer_core::Credentials;
use tracing_subscriber::EnvFilter;

use session::Session;

/// Client for the Gaffer orchestrator.
#[derive(Parser)]
struct Args {
    /// Orchestrator host
    #[arg(default_value = "127.0.0.1")]
    host: String,
    /// Orchestrator client port
    #[arg(default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let username = prompt("username: ")?;
    let password = prompt("password: ")?;

    let mut session = Session::connect(&addr, Credentials::new(username, password))
        .await
        .context("authentication failed")?;
    println!("authenticated.");

    loop {
        println!();
        println!("1) submit task");
        println!("2) query status");
        println!("3) quit");
        match prompt("> ")?.as_str() {
            "1" => {
                let id = prompt("task id: ")?;
                let payload = prompt("payload: ")?;
                let accepted = session.submit(&id, &payload).await?;
                println!("accepted: {accepted}");
            }
            "2" => {
                let id = prompt("task id: ")?;
                match session.query(&id).await? {
                    Some(task) => {
                        let worker = task
                            .worker_id
                            .as_ref()
                            .map(|w| w.as_str().to_string())
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "{}  status={}  worker={}  lamport={}",
                            task.id, task.status, worker, task.lamport
                        );
                    }
                    None => println!("no such task"),
                }
            }
            "3" | "q" | "quit" => return Ok(()),
            other => println!("unknown option: {other}"),
        }
    }
}

fn prompt(label: &str) -> anyhow::Result<String> {
    use std::io::Write;

    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
