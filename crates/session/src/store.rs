//! File-backed session store.
//!
//! Layout under the sessions root (`.agent/sessions` by default):
//!
//! ```text
//! <root>/<YYYY-MM-DD-HH-MM-SS>/conversation.json   ordered message array
//! <root>/<YYYY-MM-DD-HH-MM-SS>/todos.json          {"todos": [...]}
//! ```
//!
//! Both files are rewritten in full, atomically, on every persist. Todo lists
//! are cached in a process-wide registry behind one `RwLock`; the registry copy
//! is authoritative once a session has been created or loaded.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use quill_core::fs::{AtomicWriteError, write_atomic};
use quill_core::todo::{TodoFile, validate_todos};
use quill_core::{Conversation, SessionError, SessionId, TodoItem};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::selector::{ResumeTarget, SessionSelector};

pub const CONVERSATION_FILE: &str = "conversation.json";
pub const TODOS_FILE: &str = "todos.json";

const TODO_ID_PREFIX: &str = "task-";

/// One resumable conversation and where it lives on disk.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub dir: PathBuf,
    pub conversation: Conversation,
}

impl Session {
    pub fn conversation_path(&self) -> PathBuf {
        self.dir.join(CONVERSATION_FILE)
    }

    pub fn todos_path(&self) -> PathBuf {
        self.dir.join(TODOS_FILE)
    }
}

/// Creates, loads, lists and persists sessions under one root directory.
pub struct SessionStore {
    root: PathBuf,
    todos: RwLock<HashMap<SessionId, Vec<TodoItem>>>,
    next_todo_id: AtomicU64,
    select_on_invalid_id: bool,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            todos: RwLock::new(HashMap::new()),
            next_todo_id: AtomicU64::new(1),
            select_on_invalid_id: false,
        }
    }

    /// When a resume id is malformed, fall back to interactive selection
    /// instead of failing.
    pub fn with_select_on_invalid_id(mut self, enabled: bool) -> Self {
        self.select_on_invalid_id = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Resolve the resume target into a ready session.
    pub async fn initialize(
        &self,
        target: &ResumeTarget,
        selector: &dyn SessionSelector,
    ) -> Result<Session, SessionError> {
        match target {
            ResumeTarget::New => self.create().await,
            ResumeTarget::Choose => self.choose(selector).await,
            ResumeTarget::Id(raw) => match SessionId::parse(raw) {
                Ok(id) => self.load(&id).await,
                Err(_) if self.select_on_invalid_id => {
                    warn!(id = %raw, "Invalid session id, falling back to selection");
                    self.choose(selector).await
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn choose(&self, selector: &dyn SessionSelector) -> Result<Session, SessionError> {
        let sessions = self.list()?;
        if sessions.is_empty() {
            info!("No previous sessions found, creating a new one");
            return self.create().await;
        }
        match selector.choose(&sessions)? {
            Some(id) => self.load(&id).await,
            None => self.create().await,
        }
    }

    /// Create a fresh session with an empty conversation and todo list on disk.
    pub async fn create(&self) -> Result<Session, SessionError> {
        std::fs::create_dir_all(&self.root).map_err(|source| SessionError::Write {
            path: self.root.clone(),
            source,
        })?;

        let mut id = SessionId::generate();
        let dir = loop {
            let dir = self.session_dir(&id);
            match std::fs::create_dir(&dir) {
                Ok(()) => break dir,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(id = %id, "Session id taken, advancing one second");
                    id = id.next();
                }
                Err(source) => return Err(SessionError::Write { path: dir, source }),
            }
        };

        let session = Session {
            id: id.clone(),
            dir,
            conversation: Conversation::new(),
        };

        let mut todos = self.todos.write().await;
        write_json(&session.conversation_path(), &session.conversation)?;
        write_json(&session.todos_path(), &TodoFile::default())?;
        todos.insert(id.clone(), Vec::new());

        info!(session = %id, "Created new session");
        Ok(session)
    }

    /// Load a stored session. A missing directory is an error; a missing or
    /// empty log is an empty conversation; a corrupt log is an error.
    pub async fn load(&self, id: &SessionId) -> Result<Session, SessionError> {
        let dir = self.session_dir(id);
        if !dir.is_dir() {
            return Err(SessionError::NotFound {
                id: id.to_string(),
                path: dir,
            });
        }

        let conversation_path = dir.join(CONVERSATION_FILE);
        let conversation: Conversation = read_json(&conversation_path)?.unwrap_or_default();
        if let Some(call_id) = conversation.first_dangling_tool_result() {
            return Err(SessionError::DanglingToolResult {
                path: conversation_path,
                call_id: call_id.to_string(),
            });
        }

        let todo_file: TodoFile = read_json(&dir.join(TODOS_FILE))?.unwrap_or_default();
        self.reserve_todo_ids(&todo_file.todos);
        self.todos.write().await.insert(id.clone(), todo_file.todos);

        info!(
            session = %id,
            messages = conversation.len(),
            "Loaded session"
        );
        Ok(Session {
            id: id.clone(),
            dir,
            conversation,
        })
    }

    /// All stored session ids, newest first. Directories whose name is not a
    /// session id are ignored.
    pub fn list(&self) -> Result<Vec<SessionId>, SessionError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SessionError::Load {
                    path: self.root.clone(),
                    source,
                });
            }
        };

        let mut ids: Vec<SessionId> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter_map(|name| SessionId::parse(&name).ok())
            .collect();
        ids.sort_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    /// Overwrite the conversation log and todo file for this session.
    pub async fn persist(&self, session: &Session) -> Result<(), SessionError> {
        let mut registry = self.todos.write().await;
        let todos = match registry.get(&session.id) {
            Some(todos) => todos.clone(),
            None => {
                let file: TodoFile = read_json(&session.todos_path())?.unwrap_or_default();
                registry.insert(session.id.clone(), file.todos.clone());
                file.todos
            }
        };

        std::fs::create_dir_all(&session.dir).map_err(|source| SessionError::Write {
            path: session.dir.clone(),
            source,
        })?;
        write_json(&session.conversation_path(), &session.conversation)?;
        write_json(&session.todos_path(), &TodoFile { todos })?;

        debug!(
            session = %session.id,
            messages = session.conversation.len(),
            "Persisted session"
        );
        Ok(())
    }

    /// Validate, assign missing ids and store a whole todo list. Nothing is
    /// written if any item is invalid.
    pub async fn save_todos(
        &self,
        id: &SessionId,
        mut todos: Vec<TodoItem>,
    ) -> Result<Vec<TodoItem>, SessionError> {
        validate_todos(&todos)?;
        self.reserve_todo_ids(&todos);
        for todo in todos.iter_mut().filter(|t| t.id.trim().is_empty()) {
            todo.id = self.next_todo_id();
        }

        let mut registry = self.todos.write().await;
        let path = self.session_dir(id).join(TODOS_FILE);
        write_json(&path, &TodoFile { todos: todos.clone() })?;
        registry.insert(id.clone(), todos.clone());

        debug!(session = %id, count = todos.len(), "Saved todos");
        Ok(todos)
    }

    /// The current todo list for a session, empty when none has been written.
    pub async fn get_todos(&self, id: &SessionId) -> Result<Vec<TodoItem>, SessionError> {
        if let Some(todos) = self.todos.read().await.get(id) {
            return Ok(todos.clone());
        }

        let mut registry = self.todos.write().await;
        let file: TodoFile = read_json(&self.session_dir(id).join(TODOS_FILE))?.unwrap_or_default();
        self.reserve_todo_ids(&file.todos);
        registry.insert(id.clone(), file.todos.clone());
        Ok(file.todos)
    }

    fn next_todo_id(&self) -> String {
        let n = self.next_todo_id.fetch_add(1, Ordering::SeqCst);
        format!("{TODO_ID_PREFIX}{n}")
    }

    /// Keep generated ids clear of `task-N` ids that already exist.
    fn reserve_todo_ids(&self, todos: &[TodoItem]) {
        let highest = todos
            .iter()
            .filter_map(|t| t.id.strip_prefix(TODO_ID_PREFIX))
            .filter_map(|n| n.parse::<u64>().ok())
            .max();
        if let Some(highest) = highest {
            self.next_todo_id.fetch_max(highest + 1, Ordering::SeqCst);
        }
    }
}

/// Read and parse a JSON file. `None` when the file is absent or blank.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, SessionError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionError::Load {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| SessionError::Format {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SessionError> {
    let data = serde_json::to_vec_pretty(value).map_err(|source| SessionError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &data).map_err(|AtomicWriteError { path, source, .. }| {
        SessionError::Write { path, source }
    })
}
