//! Concrete collaborators for the message store: the exported comment list
//! on disk and the session endpoint that names the current user.

pub mod file;
pub mod identity;

pub use file::{FileSource, PageOrder};
pub use identity::SessionIdentity;
