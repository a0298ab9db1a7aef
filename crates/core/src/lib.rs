//! # Quill Core
//!
//! Domain types, traits, and error definitions for the quill coding agent.
//! It defines the domain model that all other crates implement against.
//!
//! Every seam is a trait here (provider, tool); implementations live in
//! their own crates and depend inward on this one.

pub mod error;
pub mod fs;
pub mod message;
pub mod provider;
pub mod session_id;
pub mod todo;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{EditError, EditErrorKind, Error, ProviderError, Result, SessionError, ToolError};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use session_id::SessionId;
pub use todo::{TodoItem, TodoPriority, TodoStatus};
pub use tool::{Tool, ToolRegistry, ToolResult};
