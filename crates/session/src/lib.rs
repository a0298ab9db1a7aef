//! Session persistence for quill.
//!
//! A session is one resumable conversation plus its todo list, stored as a
//! pair of JSON files under a timestamp-named directory.

pub mod selector;
pub mod store;

pub use selector::{CreateNew, ResumeTarget, SessionSelector};
pub use store::{CONVERSATION_FILE, Session, SessionStore, TODOS_FILE};
