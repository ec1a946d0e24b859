use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use ripple_core::feed::format_timestamp;
use ripple_core::{MentionAlert, Message, Notifier, Permission, RenderSink};
use tracing::info;

/// Line-printing render sink. The feed arrives wholesale every cycle, so the
/// sink remembers how much it already printed and only emits the tail; a
/// shorter feed than last time means the view was reset and is reprinted.
#[derive(Default)]
pub struct TerminalSink {
    printed: Mutex<usize>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for TerminalSink {
    fn show_feed(&self, messages: &[Message]) {
        let mut printed = self.printed.lock();
        if messages.len() < *printed {
            *printed = 0;
        }
        for message in &messages[*printed..] {
            println!(
                "[{}] {}: {}",
                format_timestamp(message.sent_at),
                message.sender,
                message.content
            );
        }
        *printed = messages.len();
    }

    // A scrolling terminal has no persistent status line to clear, so a
    // status is simply printed once.
    fn set_status(&self, message: &str, is_error: bool) {
        if message.is_empty() {
            return;
        }
        if is_error {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }

    fn show_authenticated(&self, identity: &str) {
        println!("Signed in as {identity}.");
        *self.printed.lock() = 0;
    }

    fn show_anonymous(&self) {
        println!("Signed out. Log in to continue.");
        *self.printed.lock() = 0;
    }
}

/// Notifier that prints alerts to stdout. The permission starts from a CLI
/// flag; an `Unknown` permission resolves to `Granted` on first request,
/// since a terminal can always print.
pub struct StdoutNotifier {
    permission: RwLock<Permission>,
}

impl StdoutNotifier {
    pub fn new(initial: Permission) -> Self {
        Self {
            permission: RwLock::new(initial),
        }
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    fn permission(&self) -> Permission {
        *self.permission.read()
    }

    async fn request_permission(&self) -> Permission {
        let mut permission = self.permission.write();
        if *permission == Permission::Unknown {
            info!("notification permission requested, granting");
            *permission = Permission::Granted;
        }
        *permission
    }

    async fn dispatch(&self, alert: &MentionAlert) {
        println!("\x07[{}] {}", alert.title, alert.body);
    }
}
