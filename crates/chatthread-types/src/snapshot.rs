use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::format::TimestampOptions;
use crate::models::{Message, MessageId};

/// Serialized store state. Replies are flattened to id lists so the reply
/// graph stays acyclic on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub admin_names: Vec<String>,
    /// Older exports misspelled this key.
    #[serde(alias = "aurthorLookup")]
    pub author_lookup: Vec<AuthorEntry>,
    pub my_short_name: Option<String>,
    #[serde(rename = "timeStampOptions")]
    pub timestamp_options: TimestampOptions,
    pub total_message_count: u64,
}

/// `[authorName, [message, ...]]` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorEntry(
    pub String,
    #[serde(deserialize_with = "object_or_encoded")] pub Vec<SnapshotMessage>,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMessage {
    pub author: String,
    pub id: MessageId,
    pub is_admin: bool,
    pub message: String,
    pub replies: Vec<MessageId>,
    /// Kept as an instant; written back in chrono's RFC 3339 form, so
    /// `09:01:00.25Z` reads back as `09:01:00.250Z`.
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for SnapshotMessage {
    fn from(message: &Message) -> Self {
        Self {
            author: message.author.clone(),
            id: message.id,
            is_admin: message.is_admin,
            message: message.text.clone(),
            replies: message.replies.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Accepts each message either as an object or as a JSON string holding the
/// object, the form some exports wrote.
fn object_or_encoded<'de, D>(deserializer: D) -> Result<Vec<SnapshotMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Object(SnapshotMessage),
        Encoded(String),
    }

    Vec::<Entry>::deserialize(deserializer)?
        .into_iter()
        .map(|entry| match entry {
            Entry::Object(message) => Ok(message),
            Entry::Encoded(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
        })
        .collect()
}
