use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::format::TimestampOptions;

/// Position of a message in its store, assigned in ingestion order.
pub type MessageId = u64;

/// One comment scraped from the thread.
///
/// `replies` holds the ids of later messages that mention this one's author.
/// They are back-references into the owning store, never owned messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub is_admin: bool,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub replies: Vec<MessageId>,
}

impl Message {
    pub fn has_replies(&self) -> bool {
        !self.replies.is_empty()
    }

    /// Render the timestamp in the machine's local zone.
    pub fn local_timestamp(&self, options: &TimestampOptions) -> String {
        self.format_timestamp(options, &chrono::Local)
    }

    pub fn format_timestamp<Tz>(&self, options: &TimestampOptions, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        options.format(&self.timestamp.with_timezone(tz))
    }
}

/// A comment as the page shows it, before any parsing.
///
/// `timestamp_source` is whatever text on the page carries the ISO-8601
/// timestamp: the inline `var timestamp = "..."` script on the live thread,
/// or a bare timestamp string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessageRecord {
    pub author: String,
    #[serde(default)]
    pub is_admin: bool,
    pub message: String,
    #[serde(alias = "timestamp")]
    pub timestamp_source: String,
}

impl RawMessageRecord {
    pub fn new(
        author: impl Into<String>,
        is_admin: bool,
        message: impl Into<String>,
        timestamp_source: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            is_admin,
            message: message.into(),
            timestamp_source: timestamp_source.into(),
        }
    }
}
