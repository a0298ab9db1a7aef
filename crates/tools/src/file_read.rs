//! Read file tool: return a file's contents.

use async_trait::async_trait;
use quill_core::error::ToolError;
use quill_core::tool::{Tool, ToolResult};

pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a given relative file path. Use this when you want to see what's inside a file. Do not use this with directory names."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The relative path of a file in the working directory."
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;

        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(ToolResult::ok(content)),
            Err(e) => Ok(ToolResult::failed(format!("Failed to read file {path}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn tool_definition() {
        let schema = ReadFileTool.parameters_schema();
        assert_eq!(ReadFileTool.name(), "read_file");
        assert_eq!(schema["required"], serde_json::json!(["path"]));
        assert!(schema["properties"]["path"].is_object());
    }

    #[tokio::test]
    async fn read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test.txt");
        let mut f = std::fs::File::create(&file_path).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let result = ReadFileTool
            .execute(serde_json::json!({
                "path": file_path.to_str().unwrap()
            }))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "Hello, world!\n");
    }

    #[tokio::test]
    async fn read_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let result = ReadFileTool
            .execute(serde_json::json!({"path": missing.to_str().unwrap()}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Failed to read file"));
        assert!(result.output.contains("missing.txt"));
    }

    #[tokio::test]
    async fn missing_path_argument() {
        let result = ReadFileTool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
