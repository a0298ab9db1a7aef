//! Todo list model: the session-scoped task list the model maintains.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TodoStatus {
    /// Still open: neither completed nor cancelled.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    High,
    Medium,
    Low,
}

/// A single task in a session's todo list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Assigned by the store when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
}

/// On-disk shape of `todos.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoFile {
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}

/// Check the list-wide invariants. The whole batch is rejected on the first violation.
pub fn validate_todos(todos: &[TodoItem]) -> Result<(), SessionError> {
    let mut in_progress = 0usize;
    for (index, todo) in todos.iter().enumerate() {
        if todo.content.trim().is_empty() {
            return Err(SessionError::InvalidTodos(format!(
                "todo at index {index} has empty content"
            )));
        }
        if todo.status == TodoStatus::InProgress {
            in_progress += 1;
        }
    }
    if in_progress > 1 {
        return Err(SessionError::InvalidTodos(format!(
            "only one todo can be in_progress at a time, found {in_progress}"
        )));
    }
    Ok(())
}

/// Count of todos that are still open.
pub fn active_count(todos: &[TodoItem]) -> usize {
    todos.iter().filter(|t| t.status.is_active()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str, status: TodoStatus) -> TodoItem {
        TodoItem {
            id: String::new(),
            content: content.into(),
            status,
            priority: TodoPriority::Medium,
        }
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&TodoStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn unknown_status_is_rejected_at_parse_time() {
        let raw = r#"[{"content":"x","status":"doing","priority":"high"}]"#;
        assert!(serde_json::from_str::<Vec<TodoItem>>(raw).is_err());
    }

    #[test]
    fn unknown_priority_is_rejected_at_parse_time() {
        let raw = r#"[{"content":"x","status":"pending","priority":"urgent"}]"#;
        assert!(serde_json::from_str::<Vec<TodoItem>>(raw).is_err());
    }

    #[test]
    fn two_in_progress_items_fail_validation() {
        let todos = vec![
            item("a", TodoStatus::InProgress),
            item("b", TodoStatus::InProgress),
        ];
        let err = validate_todos(&todos).unwrap_err();
        assert!(err.to_string().contains("in_progress"));
    }

    #[test]
    fn empty_content_fails_validation() {
        let todos = vec![item("  ", TodoStatus::Pending)];
        assert!(validate_todos(&todos).is_err());
    }

    #[test]
    fn active_count_skips_finished_items() {
        let todos = vec![
            item("a", TodoStatus::Pending),
            item("b", TodoStatus::InProgress),
            item("c", TodoStatus::Completed),
            item("d", TodoStatus::Cancelled),
        ];
        assert!(validate_todos(&todos).is_ok());
        assert_eq!(active_count(&todos), 2);
    }

    #[test]
    fn todo_file_wraps_list_in_object() {
        let file = TodoFile {
            todos: vec![item("a", TodoStatus::Pending)],
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["todos"][0]["content"], "a");
    }
}
