use chatthread_types::MessageId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("comment list did not appear after {attempts} attempts")]
    SourceUnavailable { attempts: u32 },

    #[error("record {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("page source failed: {0}")]
    Source(#[source] anyhow::Error),

    #[error("identity lookup failed: {0}")]
    Identity(#[source] anyhow::Error),

    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn dangling_reply(owner: MessageId, reply: MessageId) -> Self {
        Self::MalformedSnapshot(format!(
            "message {owner} lists reply {reply}, which is not a restored message"
        ))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
