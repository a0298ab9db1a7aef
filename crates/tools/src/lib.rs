//! Built-in tool implementations for quill.
//!
//! Tools give the agent the ability to interact with the working tree:
//! edit and create files, read and list them, run commands, and keep a
//! session-scoped todo list.

pub mod edit;
pub mod edit_file;
pub mod file_read;
pub mod list_files;
pub mod shell;
pub mod todo;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quill_core::SessionId;
use quill_core::tool::ToolRegistry;
use quill_session::SessionStore;

pub use edit::{EditOutcome, EditRequest, EditResult};
pub use edit_file::EditFileTool;
pub use file_read::ReadFileTool;
pub use list_files::ListFilesTool;
pub use shell::RunCommandTool;
pub use todo::{TodoReadTool, TodoWriteTool};

/// Settings for the built-in tool table.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Hard limit for `run_command`.
    pub command_timeout: Duration,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Create the tool registry for one session with all built-in tools.
pub fn default_registry(
    store: Arc<SessionStore>,
    session: SessionId,
    settings: &ToolSettings,
) -> ToolRegistry {
    let sessions_root: PathBuf = store.root().to_path_buf();

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EditFileTool));
    registry.register(Box::new(ReadFileTool));
    registry.register(Box::new(ListFilesTool::new(vec![sessions_root])));
    registry.register(Box::new(RunCommandTool::new(settings.command_timeout)));
    registry.register(Box::new(TodoWriteTool::new(store.clone(), session.clone())));
    registry.register(Box::new(TodoReadTool::new(store, session)));
    registry
}
