//! desk-bridge: headless bridge between a UI shell and the fraud desk.
//!
//! Speaks JSON lines on stdio. Each input line is an AnalystCommand; each
//! output line is a DeskSnapshot or `{"error": "..."}`. Commands that wait
//! on the service run in the background so the UI can keep selecting cases
//! while an analyze or summarize is in flight.
//!
//! Configuration comes from the environment only:
//!   FRAUD_DESK_API_URL     service base address (required)
//!   FRAUD_DESK_TIMEOUT_MS  per-request deadline (optional)

use anyhow::Result;
use fraud_desk_core::{
    command::AnalystCommand,
    config::{self, DeskConfig},
    gateway::HttpServiceGateway,
    session::DeskSession,
};
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = config::install(DeskConfig::from_env()?)?;
    log::info!("desk-bridge: service at {} (timeout {}ms)", config.base_url, config.timeout_ms);

    let gateway = Arc::new(HttpServiceGateway::from_installed()?);
    if let Err(e) = gateway.health().await {
        log::warn!("service health check failed: {e}");
    }
    let session = DeskSession::with_gateway(gateway);

    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(out_rx));

    run_ipc_loop(&session, out_tx).await?;

    writer.await??;
    Ok(())
}

async fn run_ipc_loop(session: &DeskSession, out: mpsc::UnboundedSender<String>) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let cmd: AnalystCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                emit_error(&out, &e.to_string());
                continue;
            }
        };

        if let AnalystCommand::Quit = cmd {
            break;
        }

        match session.begin(cmd).await {
            Ok(work) if work.is_remote() => {
                let session = session.clone();
                let out = out.clone();
                tokio::spawn(async move {
                    if let Err(e) = work.finish().await {
                        emit_error(&out, &e.to_string());
                    }
                    emit_state(&session, &out).await;
                });
            }
            Ok(work) => {
                if let Err(e) = work.finish().await {
                    emit_error(&out, &e.to_string());
                }
            }
            Err(e) => emit_error(&out, &e.to_string()),
        }
        // begin() has already marked remote work as started.
        emit_state(session, &out).await;
    }
    Ok(())
}

async fn emit_state(session: &DeskSession, out: &mpsc::UnboundedSender<String>) {
    let snapshot = session.snapshot().await;
    match serde_json::to_string(&snapshot) {
        Ok(json) => {
            let _ = out.send(json);
        }
        Err(e) => emit_error(out, &e.to_string()),
    }
}

fn emit_error(out: &mpsc::UnboundedSender<String>, message: &str) {
    let err_json = serde_json::json!({ "error": message });
    let _ = out.send(err_json.to_string());
}

async fn write_lines(mut rx: mpsc::UnboundedReceiver<String>) -> Result<()> {
    let mut stdout = io::stdout();
    while let Some(line) = rx.recv().await {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}
