//! Error types for the quill domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type; the top-level [`Error`]
//! is what a whole conversation run can fail with.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The error a conversation run ends with.
///
/// Tool, edit and session failures are reported to the model or logged
/// where they happen; only a failed inference stops the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// The closed set of ways an edit can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditErrorKind {
    InvalidPath,
    FileReadError,
    CreateExistingFile,
    FileNotFound,
    NoOccurrenceFound,
    ExpectedOccurrenceMismatch,
    DiffGenerationError,
    DirCreateError,
    TempFileCreateError,
    TempFileWriteError,
    FileRenameError,
}

impl EditErrorKind {
    /// Stable code shown to the model at the start of every edit failure.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidPath => "EDIT_INVALID_PATH",
            Self::FileReadError => "EDIT_FILE_READ_ERROR",
            Self::CreateExistingFile => "ATTEMPT_TO_CREATE_EXISTING_FILE",
            Self::FileNotFound => "EDIT_FILE_NOT_FOUND",
            Self::NoOccurrenceFound => "EDIT_NO_OCCURRENCE_FOUND",
            Self::ExpectedOccurrenceMismatch => "EDIT_EXPECTED_OCCURRENCE_MISMATCH",
            Self::DiffGenerationError => "EDIT_DIFF_GENERATION_ERROR",
            Self::DirCreateError => "EDIT_DIR_CREATE_ERROR",
            Self::TempFileCreateError => "EDIT_TEMP_FILE_CREATE_ERROR",
            Self::TempFileWriteError => "EDIT_TEMP_FILE_WRITE_ERROR",
            Self::FileRenameError => "EDIT_FILE_RENAME_ERROR",
        }
    }
}

impl fmt::Display for EditErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A failed edit: what went wrong, on which path, and the underlying cause if any.
#[derive(Debug, Error)]
pub struct EditError {
    pub kind: EditErrorKind,
    pub path: PathBuf,
    pub details: String,
    #[source]
    pub source: Option<std::io::Error>,
}

impl EditError {
    pub fn new(kind: EditErrorKind, path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            details: details.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: std::io::Error) -> Self {
        self.source = Some(source);
        self
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.kind, self.details, self.path.display())?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session id '{id}': expected YYYY-MM-DD-HH-MM-SS")]
    InvalidId { id: String },

    #[error("session '{id}' does not exist at {}", .path.display())]
    NotFound { id: String, path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session file {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tool result in {} answers unknown call id '{call_id}'", .path.display())]
    DanglingToolResult { path: PathBuf, call_id: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid todo list: {0}")]
    InvalidTodos(String),

    #[error("session selection failed: {0}")]
    Selection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_converts_into_run_error() {
        let err: Error = ProviderError::Timeout("no response within 5s".into()).into();
        assert!(matches!(err, Error::Provider(ProviderError::Timeout(_))));
        assert_eq!(err.to_string(), "Provider error: Request timed out: no response within 5s");
    }

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn edit_error_leads_with_code_and_names_path() {
        let err = EditError::new(
            EditErrorKind::NoOccurrenceFound,
            "src/main.rs",
            "could not find the string to replace",
        );
        let text = err.to_string();
        assert!(text.starts_with("EDIT_NO_OCCURRENCE_FOUND:"));
        assert!(text.contains("src/main.rs"));
    }

    #[test]
    fn edit_error_keeps_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EditError::new(EditErrorKind::FileReadError, "a.txt", "failed to read file")
            .with_source(io);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "denied");
        assert!(err.to_string().ends_with("(a.txt): denied"));
    }

    #[test]
    fn tool_error_wraps_edit_error_transparently() {
        let err: ToolError =
            EditError::new(EditErrorKind::InvalidPath, "", "file path cannot be empty").into();
        assert!(err.to_string().starts_with("EDIT_INVALID_PATH"));
    }

    #[test]
    fn session_error_names_the_path() {
        let err = SessionError::NotFound {
            id: "2024-01-01-00-00-00".into(),
            path: PathBuf::from("/tmp/sessions/2024-01-01-00-00-00"),
        };
        assert!(err.to_string().contains("/tmp/sessions/2024-01-01-00-00-00"));
    }
}
