use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use chatthread_types::{Message, MessageId, RawMessageRecord, TimestampOptions};

use crate::error::{Result, StoreError};
use crate::parse::{extract_mentions, extract_timestamp};
use crate::retry::RetryPolicy;
use crate::source::{IdentityProvider, PageSource, poll_records};

/// Messages of one comment thread, indexed by author.
///
/// Messages live in an arena ordered by id; the author index and every
/// `replies` list refer into it by id. Only ingestion adds messages, and only
/// mention linking changes an existing message (its `replies`).
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    pub(crate) messages: Vec<Message>,
    pub(crate) by_author: HashMap<String, Vec<MessageId>>,
    pub(crate) admin_names: Vec<String>,
    pub(crate) self_author_name: Option<String>,
    pub(crate) timestamp_options: TimestampOptions,
    pub(crate) retry_policy: RetryPolicy,
}

/// Which admins [`MessageStore::messages_by_admins`] reports on.
#[derive(Debug, Clone, Default)]
pub enum AdminQuery {
    /// Everyone currently on the admin roster.
    #[default]
    All,
    Names(Vec<String>),
}

impl From<&str> for AdminQuery {
    fn from(name: &str) -> Self {
        Self::Names(vec![name.to_string()])
    }
}

impl From<String> for AdminQuery {
    fn from(name: String) -> Self {
        Self::Names(vec![name])
    }
}

impl From<Vec<String>> for AdminQuery {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<&[&str]> for AdminQuery {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|n| n.to_string()).collect())
    }
}

/// A raw record that passed validation.
struct Parsed {
    author: String,
    is_admin: bool,
    text: String,
    timestamp: DateTime<Utc>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_timestamp_options(mut self, options: TimestampOptions) -> Self {
        self.timestamp_options = options;
        self
    }

    // -- Ingestion --

    /// Scrape every comment currently on the page.
    ///
    /// Waits for the comment list per the retry policy. The batch is all or
    /// nothing: one bad record fails the call and leaves the store untouched.
    pub async fn ingest_from_page<S>(&mut self, source: &S) -> Result<&[Message]>
    where
        S: PageSource + ?Sized,
    {
        let records = poll_records(source, &self.retry_policy).await?;
        self.ingest_records(records)
    }

    /// Ingest records already in page order, oldest first.
    pub fn ingest_records(&mut self, records: Vec<RawMessageRecord>) -> Result<&[Message]> {
        let parsed = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| parse_record(index, record))
            .collect::<Result<Vec<_>>>()?;

        let first_new = self.messages.len();
        for record in parsed {
            self.push(record);
        }

        info!(
            ingested = self.messages.len() - first_new,
            total = self.messages.len(),
            "Ingested comment batch"
        );
        Ok(&self.messages[first_new..])
    }

    fn push(&mut self, record: Parsed) {
        if record.is_admin && !self.admin_names.contains(&record.author) {
            self.admin_names.push(record.author.clone());
        }

        let id = self.messages.len() as MessageId;

        // Link before indexing so an author mentioning themself never lands
        // in their own new message's replies.
        for name in extract_mentions(&record.text) {
            let Some(prior) = self.by_author.get(&name) else {
                continue;
            };
            for &target in prior {
                self.messages[target as usize].replies.push(id);
            }
            debug!(reply = id, to = %name, linked = prior.len(), "Linked mention");
        }

        self.by_author.entry(record.author.clone()).or_default().push(id);
        self.messages.push(Message {
            id,
            author: record.author,
            is_admin: record.is_admin,
            text: record.text,
            timestamp: record.timestamp,
            replies: Vec::new(),
        });
    }

    // -- Queries --

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(usize::try_from(id).ok()?)
    }

    /// All messages in id order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Resolve a message's reply ids to the replying messages.
    pub fn replies_to<'a>(&'a self, message: &'a Message) -> impl Iterator<Item = &'a Message> + 'a {
        message.replies.iter().filter_map(|&id| self.get(id))
    }

    pub fn messages_by_author(&self, author: &str) -> Vec<&Message> {
        self.by_author
            .get(author)
            .map(|ids| ids.iter().map(|&id| &self.messages[id as usize]).collect())
            .unwrap_or_default()
    }

    /// One message list per requested admin that has posted. Names without
    /// messages are skipped rather than reported empty.
    pub fn messages_by_admins(&self, query: impl Into<AdminQuery>) -> Vec<Vec<&Message>> {
        let names = match query.into() {
            AdminQuery::All => self.admin_names.clone(),
            AdminQuery::Names(names) => names,
        };
        names
            .iter()
            .filter(|name| self.by_author.get(name.as_str()).is_some_and(|ids| !ids.is_empty()))
            .map(|name| self.messages_by_author(name))
            .collect()
    }

    pub fn admin_names(&self) -> &[String] {
        &self.admin_names
    }

    /// Authors in order of their first message.
    pub fn authors(&self) -> Vec<&str> {
        let mut authors: Vec<(&str, MessageId)> = self
            .by_author
            .iter()
            .filter_map(|(name, ids)| ids.first().map(|&first| (name.as_str(), first)))
            .collect();
        authors.sort_by_key(|&(_, first)| first);
        authors.into_iter().map(|(name, _)| name).collect()
    }

    pub fn total_count(&self) -> u64 {
        self.messages.len() as u64
    }

    pub fn timestamp_options(&self) -> &TimestampOptions {
        &self.timestamp_options
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Local-time rendering of a message using the store's options.
    pub fn local_timestamp(&self, message: &Message) -> String {
        message.local_timestamp(&self.timestamp_options)
    }

    // -- Self identity --

    pub fn self_author_name(&self) -> Option<&str> {
        self.self_author_name.as_deref()
    }

    /// The current user's short name, looked up once and then cached.
    pub async fn resolve_self_author_name<I>(&mut self, identity: &I) -> Result<&str>
    where
        I: IdentityProvider + ?Sized,
    {
        if self.self_author_name.is_none() {
            let name = identity.lookup_self_name().await.map_err(StoreError::Identity)?;
            info!(name = %name, "Resolved own author name");
            self.self_author_name = Some(name);
        }
        Ok(self.self_author_name.as_deref().unwrap_or_default())
    }

    pub async fn my_messages<I>(&mut self, identity: &I) -> Result<Vec<&Message>>
    where
        I: IdentityProvider + ?Sized,
    {
        let name = self.resolve_self_author_name(identity).await?.to_string();
        Ok(self.messages_by_author(&name))
    }
}

fn parse_record(index: usize, record: RawMessageRecord) -> Result<Parsed> {
    let author = record.author.trim().to_string();
    if author.is_empty() {
        return Err(StoreError::MalformedRecord {
            index,
            reason: "empty author".into(),
        });
    }

    let timestamp = extract_timestamp(&record.timestamp_source)
        .map_err(|reason| StoreError::MalformedRecord { index, reason })?;

    Ok(Parsed {
        author,
        is_admin: record.is_admin,
        text: record.message,
        timestamp,
    })
}
