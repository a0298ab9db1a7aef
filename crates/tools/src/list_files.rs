//! List files tool: recursive directory listing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quill_core::error::ToolError;
use quill_core::tool::{Tool, ToolResult};

/// Lists files under a directory. Directories end in `/`; `.git` and the
/// configured skip paths (the sessions root) are not descended into.
pub struct ListFilesTool {
    skip: Vec<PathBuf>,
}

impl ListFilesTool {
    pub fn new(skip: Vec<PathBuf>) -> Self {
        Self { skip }
    }

    fn is_skipped(&self, root: &Path, rel: &Path) -> bool {
        rel == Path::new(".git")
            || self
                .skip
                .iter()
                .any(|s| rel == s.as_path() || root.join(rel) == *s)
    }

    fn walk(&self, root: &Path, rel: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
        let mut entries = std::fs::read_dir(root.join(rel))?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let rel_path = rel.join(entry.file_name());
            let shown = rel_path.to_string_lossy().replace('\\', "/");
            if entry.file_type()?.is_dir() {
                if self.is_skipped(root, &rel_path) {
                    continue;
                }
                out.push(format!("{shown}/"));
                self.walk(root, &rel_path, out)?;
            } else {
                out.push(shown);
            }
        }
        Ok(())
    }
}

impl Default for ListFilesTool {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files and directories at a given path. If no path is provided, lists files in the current directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Optional relative path to list files from. Defaults to the current directory."
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let root = match arguments["path"].as_str() {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => PathBuf::from("."),
        };

        let mut files = Vec::new();
        if let Err(e) = self.walk(&root, Path::new(""), &mut files) {
            return Ok(ToolResult::failed(format!(
                "Failed to list {}: {e}",
                root.display()
            )));
        }

        let listing = serde_json::to_string(&files).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "list_files".into(),
            reason: e.to_string(),
        })?;
        Ok(ToolResult::ok(listing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_recursively_and_skips_git_and_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join(".git/objects")).unwrap();
        std::fs::create_dir_all(root.join(".agent/sessions/2024-01-01-00-00-00")).unwrap();
        std::fs::write(root.join("src/main.rs"), "").unwrap();
        std::fs::write(root.join("Cargo.toml"), "").unwrap();

        let tool = ListFilesTool::new(vec![PathBuf::from(".agent/sessions")]);
        let result = tool
            .execute(serde_json::json!({"path": root.to_str().unwrap()}))
            .await
            .unwrap();

        let files: Vec<String> = serde_json::from_str(&result.output).unwrap();
        assert_eq!(files, vec![".agent/", "Cargo.toml", "src/", "src/main.rs"]);
    }

    #[tokio::test]
    async fn missing_directory_is_a_failed_result() {
        let dir = tempfile::tempdir().unwrap();
        let result = ListFilesTool::default()
            .execute(serde_json::json!({"path": dir.path().join("nope").to_str().unwrap()}))
            .await
            .unwrap();
        assert!(!result.success);
    }
}
