//! Edit file tool: exposes the edit engine to the model.

use async_trait::async_trait;
use quill_core::error::ToolError;
use quill_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use tracing::info;

use crate::edit::{self, EditRequest};

#[derive(Debug, Deserialize)]
struct EditFileArgs {
    #[serde(default)]
    path: String,
    #[serde(default)]
    old_str: String,
    #[serde(default)]
    new_str: String,
    #[serde(default)]
    expected_replacements: Option<usize>,
}

pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Make edits to a text file.\n\n\
         Replaces every occurrence of 'old_str' with 'new_str' in the given file. \
         'old_str' and 'new_str' MUST be different from each other. Set \
         'expected_replacements' to guard against replacing more than intended.\n\n\
         If the file specified with path doesn't exist and 'old_str' is empty, it will be created."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the file"
                },
                "old_str": {
                    "type": "string",
                    "description": "Text to search for - must match exactly"
                },
                "new_str": {
                    "type": "string",
                    "description": "Text to replace old_str with"
                },
                "expected_replacements": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Optional: the expected number of replacements. If the actual count differs, nothing is written and an error is returned."
                }
            },
            "required": ["path", "old_str", "new_str"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: EditFileArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let request = EditRequest {
            path: args.path.into(),
            old_str: args.old_str,
            new_str: args.new_str,
            expected_replacements: args.expected_replacements,
        };

        let result = tokio::task::spawn_blocking(move || edit::apply(&request))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "edit_file".into(),
                reason: e.to_string(),
            })??;

        info!(
            outcome = ?result.outcome,
            replacements = result.actual_replacements,
            "{}",
            result.message
        );

        let payload = serde_json::json!({
            "message": result.message,
            "actual_replacements": result.actual_replacements,
            "diff": result.diff,
        });
        Ok(ToolResult::ok(payload.to_string()))
    }
}
