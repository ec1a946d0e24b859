use async_trait::async_trait;
use parking_lot::Mutex;
use ripple_core::{MentionAlert, Message, Notifier, Permission, RenderSink};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

/// Builds a feed endpoint body in the server's wire format.
pub fn feed_body(entries: &[(&str, &str)]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|(sender, content)| {
            format!(
                r#"{{"Sender":"{sender}","Content":"{content}","Timestamp":"2026-08-28T14:05:00Z"}}"#
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Authenticated(String),
    Anonymous,
}

/// Render sink double that records everything pushed through it.
#[derive(Default)]
pub struct RecordingSink {
    pub feeds: Mutex<Vec<Vec<Message>>>,
    pub statuses: Mutex<Vec<(String, bool)>>,
    pub views: Mutex<Vec<View>>,
}

impl RecordingSink {
    pub fn error_statuses(&self) -> Vec<String> {
        self.statuses
            .lock()
            .iter()
            .filter(|(_, is_error)| *is_error)
            .map(|(message, _)| message.clone())
            .collect()
    }

    pub fn last_view(&self) -> Option<View> {
        self.views.lock().last().cloned()
    }
}

impl RenderSink for RecordingSink {
    fn show_feed(&self, messages: &[Message]) {
        self.feeds.lock().push(messages.to_vec());
    }

    fn set_status(&self, message: &str, is_error: bool) {
        self.statuses.lock().push((message.to_owned(), is_error));
    }

    fn show_authenticated(&self, identity: &str) {
        self.views
            .lock()
            .push(View::Authenticated(identity.to_owned()));
    }

    fn show_anonymous(&self) {
        self.views.lock().push(View::Anonymous);
    }
}

/// Notifier double: records dispatches and permission requests, and resolves
/// an `Unknown` permission to a configured answer.
pub struct RecordingNotifier {
    permission: Mutex<Permission>,
    grant_on_request: bool,
    pub dispatched: Mutex<Vec<MentionAlert>>,
    pub permission_requests: AtomicUsize,
}

impl RecordingNotifier {
    pub fn with_permission(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
            grant_on_request: true,
            dispatched: Mutex::new(Vec::new()),
            permission_requests: AtomicUsize::new(0),
        }
    }

    pub fn denying_requests() -> Self {
        Self {
            grant_on_request: false,
            ..Self::with_permission(Permission::Unknown)
        }
    }

    pub fn dispatched_bodies(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .iter()
            .map(|alert| alert.body.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> Permission {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        let mut permission = self.permission.lock();
        if *permission == Permission::Unknown {
            *permission = if self.grant_on_request {
                Permission::Granted
            } else {
                Permission::Denied
            };
        }
        *permission
    }

    async fn dispatch(&self, alert: &MentionAlert) {
        self.dispatched.lock().push(alert.clone());
    }
}
