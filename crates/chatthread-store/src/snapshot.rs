use std::collections::HashMap;

use tracing::{info, warn};

use chatthread_types::{AuthorEntry, Message, MessageId, Snapshot, SnapshotMessage};

use crate::error::{Result, StoreError};
use crate::source::PageSource;
use crate::store::MessageStore;

/// What a session starts from.
#[derive(Debug, Clone)]
pub enum SnapshotInput {
    /// No saved state: scrape the page.
    None,
    /// Snapshot JSON text. Text that is not JSON at all falls back to a scrape.
    Text(String),
    Value(serde_json::Value),
    Snapshot(Snapshot),
}

impl From<Option<String>> for SnapshotInput {
    fn from(text: Option<String>) -> Self {
        text.map_or(Self::None, Self::Text)
    }
}

impl MessageStore {
    /// Acyclic copy of the store. Authors are ordered by their first message
    /// so the output is stable.
    pub fn to_snapshot(&self) -> Snapshot {
        let author_lookup = self
            .authors()
            .into_iter()
            .map(|author| {
                let messages = self
                    .messages_by_author(author)
                    .into_iter()
                    .map(SnapshotMessage::from)
                    .collect();
                AuthorEntry(author.to_string(), messages)
            })
            .collect();

        Snapshot {
            admin_names: self.admin_names.clone(),
            author_lookup,
            my_short_name: self.self_author_name.clone(),
            timestamp_options: self.timestamp_options.clone(),
            total_message_count: self.total_count(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    /// Rebuild a store from a snapshot.
    ///
    /// Replies may point forward to messages not yet seen, so every message
    /// is placed first and reply ids are checked in a second pass.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let Snapshot {
            admin_names,
            author_lookup,
            my_short_name,
            timestamp_options,
            total_message_count,
        } = snapshot;

        let total = usize::try_from(total_message_count).map_err(|_| {
            StoreError::MalformedSnapshot(format!("totalMessageCount {total_message_count} is out of range"))
        })?;

        // Pass 1: place messages by id.
        let mut slots: Vec<Option<Message>> = vec![None; total];
        let mut by_author: HashMap<String, Vec<MessageId>> = HashMap::new();

        for AuthorEntry(author, messages) in author_lookup {
            if by_author.contains_key(&author) {
                return Err(StoreError::MalformedSnapshot(format!("author {author:?} listed twice")));
            }
            if messages.is_empty() {
                return Err(StoreError::MalformedSnapshot(format!("author {author:?} has no messages")));
            }
            let mut ids = Vec::with_capacity(messages.len());
            for entry in messages {
                if entry.author != author {
                    return Err(StoreError::MalformedSnapshot(format!(
                        "message {} by {:?} filed under {:?}",
                        entry.id, entry.author, author
                    )));
                }
                let slot = usize::try_from(entry.id)
                    .ok()
                    .and_then(|idx| slots.get_mut(idx))
                    .ok_or_else(|| {
                        StoreError::MalformedSnapshot(format!(
                            "message id {} outside totalMessageCount {}",
                            entry.id, total_message_count
                        ))
                    })?;
                if slot.is_some() {
                    return Err(StoreError::MalformedSnapshot(format!("duplicate message id {}", entry.id)));
                }
                ids.push(entry.id);
                *slot = Some(Message {
                    id: entry.id,
                    author: entry.author,
                    is_admin: entry.is_admin,
                    text: entry.message,
                    timestamp: entry.timestamp,
                    replies: entry.replies,
                });
            }
            ids.sort_unstable();
            by_author.insert(author, ids);
        }

        let messages = slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| StoreError::MalformedSnapshot(format!("message id {idx} is missing")))
            })
            .collect::<Result<Vec<Message>>>()?;

        // Pass 2: every reply must name another restored message.
        for message in &messages {
            for &reply in &message.replies {
                if reply == message.id || reply >= total_message_count {
                    return Err(StoreError::dangling_reply(message.id, reply));
                }
            }
        }

        info!(
            messages = messages.len(),
            authors = by_author.len(),
            admins = admin_names.len(),
            "Restored snapshot"
        );

        Ok(Self {
            messages,
            by_author,
            admin_names,
            self_author_name: my_short_name,
            timestamp_options,
            retry_policy: Default::default(),
        })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(text)
            .map_err(|e| StoreError::MalformedSnapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    /// Start a session from saved state, or from the page when there is none.
    ///
    /// `self` supplies the retry policy (kept on the restored store too) and,
    /// when scraping, the timestamp options. Snapshot text that is not valid
    /// JSON is logged and treated as absent; JSON that does not describe a
    /// consistent store is an error.
    pub async fn restore<S>(mut self, input: SnapshotInput, source: &S) -> Result<Self>
    where
        S: PageSource + ?Sized,
    {
        let value = match input {
            SnapshotInput::None => None,
            SnapshotInput::Text(text) => match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(serde_json::Value::Null) => None,
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(error = %e, "Snapshot is not valid JSON, scraping the page instead");
                    None
                }
            },
            SnapshotInput::Value(serde_json::Value::Null) => None,
            SnapshotInput::Value(value) => Some(value),
            SnapshotInput::Snapshot(snapshot) => {
                return Self::from_snapshot(snapshot).map(|store| store.with_retry_policy(self.retry_policy));
            }
        };

        match value {
            Some(value) => {
                let snapshot: Snapshot = serde_json::from_value(value)
                    .map_err(|e| StoreError::MalformedSnapshot(e.to_string()))?;
                Ok(Self::from_snapshot(snapshot)?.with_retry_policy(self.retry_policy))
            }
            None => {
                self.ingest_from_page(source).await?;
                Ok(self)
            }
        }
    }
}
