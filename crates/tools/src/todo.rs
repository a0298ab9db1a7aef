//! Todo tools: read and replace the active session's task list.

use std::sync::Arc;

use async_trait::async_trait;
use quill_core::error::ToolError;
use quill_core::todo::active_count;
use quill_core::tool::{Tool, ToolResult};
use quill_core::{SessionId, TodoItem};
use quill_session::SessionStore;

/// Replaces the whole todo list of one session.
pub struct TodoWriteTool {
    store: Arc<SessionStore>,
    session: SessionId,
}

impl TodoWriteTool {
    pub fn new(store: Arc<SessionStore>, session: SessionId) -> Self {
        Self { store, session }
    }
}

#[async_trait]
impl Tool for TodoWriteTool {
    fn name(&self) -> &str {
        "todowrite"
    }

    fn description(&self) -> &str {
        "Create and manage structured task lists for complex multi-step operations within the current session. \
         Each todo requires: 'content', 'status' (pending/in_progress/completed/cancelled), 'priority' (high/medium/low); \
         'id' is assigned when omitted. At most one todo may be in_progress. Replaces the entire todo list."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "todos_json": {
                    "type": "string",
                    "description": "The updated todo list as a JSON array of todo objects"
                }
            },
            "required": ["todos_json"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let todos = parse_todos(&arguments["todos_json"])?;
        let saved = self.store.save_todos(&self.session, todos).await?;

        let payload = serde_json::json!({
            "title": format!("Updated todo list with {} active todos", active_count(&saved)),
            "output": format!("Successfully updated {} todos", saved.len()),
        });
        Ok(ToolResult::ok(payload.to_string()))
    }
}

/// Accepts the list as a JSON string (the declared shape) or, leniently, as an
/// inline array. A missing or blank value is an empty list.
fn parse_todos(value: &serde_json::Value) -> Result<Vec<TodoItem>, ToolError> {
    let parsed = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::String(raw) if raw.trim().is_empty() => return Ok(Vec::new()),
        serde_json::Value::String(raw) => serde_json::from_str(raw),
        other => serde_json::from_value(other.clone()),
    };
    parsed.map_err(|e| ToolError::InvalidArguments(format!("invalid todos JSON: {e}")))
}

/// Returns the todo list of one session.
pub struct TodoReadTool {
    store: Arc<SessionStore>,
    session: SessionId,
}

impl TodoReadTool {
    pub fn new(store: Arc<SessionStore>, session: SessionId) -> Self {
        Self { store, session }
    }
}

#[async_trait]
impl Tool for TodoReadTool {
    fn name(&self) -> &str {
        "todoread"
    }

    fn description(&self) -> &str {
        "Read the current todo list from session state. Returns structured todos with IDs, content, status, and priority."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let todos = self.store.get_todos(&self.session).await?;
        if todos.is_empty() {
            return Ok(ToolResult::ok(
                serde_json::json!({"title": "0 todos", "output": "[]"}).to_string(),
            ));
        }

        let listing = serde_json::to_string(&todos).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "todoread".into(),
            reason: e.to_string(),
        })?;
        let payload = serde_json::json!({
            "title": format!("{} todos", active_count(&todos)),
            "output": listing,
        });
        Ok(ToolResult::ok(payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::SessionError;

    async fn setup() -> (tempfile::TempDir, Arc<SessionStore>, SessionId) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SessionStore::new(dir.path()));
        let session = store.create().await.unwrap();
        (dir, store, session.id)
    }

    fn payload(result: &ToolResult) -> serde_json::Value {
        serde_json::from_str(&result.output).unwrap()
    }

    #[tokio::test]
    async fn read_empty_list() {
        let (_dir, store, id) = setup().await;
        let result = TodoReadTool::new(store, id)
            .execute(serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(payload(&result), serde_json::json!({"title": "0 todos", "output": "[]"}));
    }

    #[tokio::test]
    async fn write_then_read() {
        let (_dir, store, id) = setup().await;
        let todos = r#"[
            {"content": "write parser", "status": "in_progress", "priority": "high"},
            {"content": "write tests", "status": "pending", "priority": "medium"},
            {"content": "draft", "status": "completed", "priority": "low"}
        ]"#;

        let written = TodoWriteTool::new(store.clone(), id.clone())
            .execute(serde_json::json!({"todos_json": todos}))
            .await
            .unwrap();
        assert_eq!(
            payload(&written),
            serde_json::json!({
                "title": "Updated todo list with 2 active todos",
                "output": "Successfully updated 3 todos"
            })
        );

        let read = TodoReadTool::new(store, id)
            .execute(serde_json::json!({}))
            .await
            .unwrap();
        let read = payload(&read);
        assert_eq!(read["title"], "2 todos");
        let items: Vec<TodoItem> = serde_json::from_str(read["output"].as_str().unwrap()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "task-1");
        assert_eq!(items[0].content, "write parser");
    }

    #[tokio::test]
    async fn accepts_inline_array() {
        let (_dir, store, id) = setup().await;
        let result = TodoWriteTool::new(store, id)
            .execute(serde_json::json!({
                "todos_json": [{"content": "x", "status": "pending", "priority": "low"}]
            }))
            .await
            .unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn two_in_progress_rejects_whole_batch() {
        let (_dir, store, id) = setup().await;
        let todos = r#"[
            {"content": "a", "status": "in_progress", "priority": "high"},
            {"content": "b", "status": "in_progress", "priority": "high"}
        ]"#;

        let err = TodoWriteTool::new(store.clone(), id.clone())
            .execute(serde_json::json!({"todos_json": todos}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Session(SessionError::InvalidTodos(_))));
        assert!(store.get_todos(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let (_dir, store, id) = setup().await;
        let todos = r#"[{"content": "a", "status": "done", "priority": "high"}]"#;
        let err = TodoWriteTool::new(store, id)
            .execute(serde_json::json!({"todos_json": todos}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid todos JSON"));
    }
}
