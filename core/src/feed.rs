use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One chat message as delivered by the server. Immutable once received;
/// the field names on the wire are capitalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(rename = "Sender")]
    pub sender: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Timestamp")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            sent_at,
        }
    }
}

/// The last reconciled copy of the feed. Replaced wholesale on every
/// successful poll cycle and used as the dedup baseline for the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    messages: Vec<Message>,
}

impl FeedSnapshot {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Formats a timestamp for display, e.g. "Friday, August 29th, 14:05".
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Local);
    format!(
        "{}, {} {}{}, {}:{:02}",
        local.format("%A"),
        local.format("%B"),
        local.day(),
        day_suffix(local.day()),
        local.hour(),
        local.minute()
    )
}

fn day_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}
