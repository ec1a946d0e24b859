use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use ripple::{StdoutNotifier, TerminalSink};
use ripple_core::{telemetry, ChatClient, Permission, ScriptedTransport, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Automation helpers for Ripple")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a lightweight smoke test that exercises the Ripple core logic.
    Smoke,
}

fn main() -> Result<()> {
    telemetry::init_tracing(EnvFilter::new("info"))?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Smoke => smoke_test(),
    }
}

fn smoke_test() -> Result<()> {
    let runtime = Runtime::new()?;
    let temp_dir = TempDir::new()?;
    let session = SessionStore::new(temp_dir.path().to_path_buf());

    let transport = Arc::new(ScriptedTransport::new());
    transport.push_success("smoke-token");
    transport.push_success(
        r#"[{"Sender":"bob","Content":"hello smoke","Timestamp":"2026-08-28T14:05:00Z"}]"#,
    );

    let sink = Arc::new(TerminalSink::new());
    let notifier = Arc::new(StdoutNotifier::new(Permission::Granted));
    let (client, events_rx) = ChatClient::new(
        transport,
        session.clone(),
        sink,
        notifier,
        Duration::from_millis(10),
    );

    runtime.block_on(async {
        client.spawn_event_loop(events_rx);
        ensure!(client.login("smoke", "smoke").await, "login failed");
        tokio::time::sleep(Duration::from_millis(50)).await;
        ensure!(
            client.poller().snapshot().len() == 1,
            "feed was not reconciled"
        );
        client.poller().stop();
        Ok(())
    })?;

    ensure!(session.get().is_signed_in(), "session was not persisted");
    info!(
        "messages" = client.poller().snapshot().len(),
        "smoke test feed reconciled"
    );

    Ok(())
}
