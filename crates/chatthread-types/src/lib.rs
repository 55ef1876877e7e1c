pub mod format;
pub mod models;
pub mod snapshot;

pub use format::TimestampOptions;
pub use models::{Message, MessageId, RawMessageRecord};
pub use snapshot::{AuthorEntry, Snapshot, SnapshotMessage};
