//! In-memory model of a scraped comment thread.
//!
//! Comments arrive from a [`PageSource`] in page order and become
//! [`Message`]s with sequential ids. The store indexes them by author, keeps
//! the admin roster, links `@mention` replies, and round-trips through a JSON
//! [`Snapshot`] whose reply graph is reduced to id lists.

pub mod error;
pub mod parse;
pub mod retry;
pub mod snapshot;
pub mod source;
pub mod store;

pub use chatthread_types::{Message, MessageId, RawMessageRecord, Snapshot, TimestampOptions};
pub use error::{Result, StoreError};
pub use retry::RetryPolicy;
pub use snapshot::SnapshotInput;
pub use source::{IdentityProvider, PageSource};
pub use store::{AdminQuery, MessageStore};
