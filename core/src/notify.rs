use crate::feed::FeedSnapshot;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Display name used in notification titles.
pub const APP_DISPLAY_NAME: &str = "Ripple";

/// Process-wide notification permission. Moves out of `Unknown` only through
/// an explicit [`Notifier::request_permission`] call, never silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Unknown,
    Granted,
    Denied,
}

/// One notification ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionAlert {
    pub title: String,
    pub body: String,
}

/// Dispatch capability, injected so tests can substitute a recording double.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;
    async fn request_permission(&self) -> Permission;
    async fn dispatch(&self, alert: &MentionAlert);
}

/// Compares two consecutive feed snapshots and returns an alert for every
/// message that is both new to this cycle and mentions `identity`.
///
/// A message counts as new when its `(sender, content)` pair did not occur in
/// `previous`; the timestamp is deliberately left out of the key, so a
/// repeated identical line is treated as already seen. Mention matching is a
/// case-insensitive whole-word test, so "Bob" matches "hi @Bob!" but not
/// "Bobby arrived".
pub fn evaluate(
    previous: &FeedSnapshot,
    current: &FeedSnapshot,
    identity: Option<&str>,
) -> Vec<MentionAlert> {
    let Some(pattern) = identity.and_then(mention_pattern) else {
        return Vec::new();
    };

    let seen: HashSet<(&str, &str)> = previous
        .messages()
        .iter()
        .map(|msg| (msg.sender.as_str(), msg.content.as_str()))
        .collect();

    let mut alerts = Vec::new();
    for message in current.messages() {
        if seen.contains(&(message.sender.as_str(), message.content.as_str())) {
            continue;
        }
        if !pattern.is_match(&message.content) {
            continue;
        }
        alerts.push(MentionAlert {
            title: format!("New mention in {APP_DISPLAY_NAME}"),
            body: format!("{}: {}", message.sender, message.content),
        });
    }
    alerts
}

/// Sends the pending alerts through `notifier`, gated by its permission
/// state. Returns how many were actually dispatched; alerts dropped here are
/// never retried, since their messages stop being new next cycle.
pub async fn dispatch_alerts(notifier: &dyn Notifier, alerts: &[MentionAlert]) -> usize {
    if alerts.is_empty() {
        return 0;
    }
    let permission = match notifier.permission() {
        Permission::Denied => return 0,
        Permission::Granted => Permission::Granted,
        Permission::Unknown => notifier.request_permission().await,
    };
    if permission != Permission::Granted {
        debug!(dropped = alerts.len(), "notification permission not granted");
        return 0;
    }
    for alert in alerts {
        notifier.dispatch(alert).await;
    }
    alerts.len()
}

fn mention_pattern(identity: &str) -> Option<Regex> {
    if identity.trim().is_empty() {
        return None;
    }
    let pattern = format!(r"(?i)\b{}\b", regex::escape(identity));
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(%err, identity, "failed to build mention pattern");
            None
        }
    }
}
