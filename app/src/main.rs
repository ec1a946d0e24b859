use clap::{Parser, Subcommand, ValueEnum};
use ripple::{StdoutNotifier, TerminalSink};
use ripple_core::{config, telemetry, ChatClient, ClientSettings, HttpTransport, Permission, SessionStore};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "Ripple", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Chat server base URL; overrides ripple.yaml.
    #[arg(long)]
    server: Option<Url>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account on the chat server.
    Register { identity: String, secret: String },
    /// Sign in and store the session for later commands.
    Login { identity: String, secret: String },
    /// Send one message to the feed.
    Send { content: String },
    /// Clear the stored session.
    Logout,
    /// Resume the stored session and follow the feed until interrupted.
    Run {
        #[arg(long, value_enum, default_value_t = NotificationsMode::Ask)]
        notifications: NotificationsMode,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NotificationsMode {
    Ask,
    On,
    Off,
}

impl From<NotificationsMode> for Permission {
    fn from(mode: NotificationsMode) -> Self {
        match mode {
            NotificationsMode::Ask => Permission::Unknown,
            NotificationsMode::On => Permission::Granted,
            NotificationsMode::Off => Permission::Denied,
        }
    }
}

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing(EnvFilter::from_default_env())?;

    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    let runtime = Runtime::new()?;

    let permission = match &cli.command {
        Command::Run { notifications } => (*notifications).into(),
        _ => Permission::Denied,
    };

    let session = SessionStore::new(config::default_state_dir());
    let transport = Arc::new(HttpTransport::new(settings.server_url.clone()));
    let sink = Arc::new(TerminalSink::new());
    let notifier = Arc::new(StdoutNotifier::new(permission));
    let (client, events_rx) = ChatClient::new(
        transport,
        session,
        sink,
        notifier,
        settings.poll_interval(),
    );

    let ok = match &cli.command {
        Command::Register { identity, secret } => {
            runtime.block_on(client.register(identity, secret))
        }
        Command::Login { identity, secret } => runtime.block_on(async {
            let ok = client.login(identity, secret).await;
            if ok {
                println!("Signed in as {identity}.");
            }
            ok
        }),
        Command::Send { content } => runtime.block_on(client.send_message(content)),
        Command::Logout => {
            client.logout();
            println!("Signed out.");
            true
        }
        Command::Run { .. } => runtime.block_on(async {
            let events = client.spawn_event_loop(events_rx);
            if !client.resume() {
                eprintln!("No stored session. Run `ripple login` first.");
                return false;
            }
            tokio::signal::ctrl_c().await.ok();
            client.poller().stop();
            events.abort();
            true
        }),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<ClientSettings> {
    if let Some(server) = &cli.server {
        return Ok(ClientSettings::for_server(server.clone()));
    }
    ClientSettings::load().map_err(|err| anyhow::anyhow!(err.user_message()))
}
