//! Edit engine: exact-match replacement and whole-file creation.
//!
//! Every change goes through a temp file in the target's directory that is
//! renamed over the target, so a reader sees either the old or the new file.
//! Work is split into [`plan`] (read, validate, diff, stage) and
//! [`EditPlan::commit`] (rename); [`apply`] does both.

pub mod diff;
pub mod unescape;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quill_core::fs::{self, StagedWrite, WriteStage};
use quill_core::{EditError, EditErrorKind};
use tracing::debug;

/// What the caller wants changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub path: PathBuf,
    pub old_str: String,
    pub new_str: String,
    /// Fail unless exactly this many occurrences are found.
    pub expected_replacements: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Created,
    Modified,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub outcome: EditOutcome,
    pub message: String,
    pub actual_replacements: usize,
    pub diff: String,
}

/// A validated edit whose new contents are staged but not yet visible.
#[derive(Debug)]
pub struct EditPlan {
    result: EditResult,
    staged: Option<StagedWrite>,
    // Declared after `staged` so the temp file is gone before the
    // directories are removed.
    created_dirs: CreatedDirs,
}

/// Parent directories made for a new file, deepest first. Removed on drop
/// unless kept; a directory that gained other entries meanwhile stays.
#[derive(Debug, Default)]
struct CreatedDirs(Vec<PathBuf>);

impl CreatedDirs {
    fn create(path: &Path, parent: &Path) -> Result<Self, EditError> {
        let missing = parent
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .map(Path::to_path_buf)
            .collect();
        // Set up the guard first so a partial create_dir_all is undone too.
        let guard = Self(missing);
        std::fs::create_dir_all(parent).map_err(|e| {
            EditError::new(
                EditErrorKind::DirCreateError,
                path,
                "failed to create parent directory",
            )
            .with_source(e)
        })?;
        Ok(guard)
    }

    fn keep(mut self) {
        self.0.clear();
    }
}

impl Drop for CreatedDirs {
    fn drop(&mut self) {
        for dir in &self.0 {
            if std::fs::remove_dir(dir).is_err() {
                break;
            }
        }
    }
}

impl EditPlan {
    pub fn result(&self) -> &EditResult {
        &self.result
    }

    /// The temp file holding the new contents, if anything will be written.
    pub fn staged_path(&self) -> Option<&Path> {
        self.staged.as_ref().map(StagedWrite::temp_path)
    }

    /// Make the change visible. Dropping the plan instead discards it,
    /// along with any parent directories planning created.
    pub fn commit(self) -> Result<EditResult, EditError> {
        let EditPlan {
            result,
            staged,
            created_dirs,
        } = self;
        if let Some(staged) = staged {
            let path = staged.target().to_path_buf();
            staged.commit().map_err(|e| write_error(&path, e.stage, e.source))?;
        }
        created_dirs.keep();
        Ok(result)
    }
}

/// Plan and commit in one step.
pub fn apply(request: &EditRequest) -> Result<EditResult, EditError> {
    plan(request)?.commit()
}

/// Validate the request against the file on disk and stage the new contents.
pub fn plan(request: &EditRequest) -> Result<EditPlan, EditError> {
    let path = request.path.as_path();
    if path.as_os_str().is_empty() {
        return Err(EditError::new(
            EditErrorKind::InvalidPath,
            path,
            "file path cannot be empty",
        ));
    }

    let old_str = unescape::correct(&request.old_str);
    let new_str = unescape::correct(&request.new_str);

    let original = match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            return Err(
                EditError::new(EditErrorKind::FileReadError, path, "failed to read file")
                    .with_source(e),
            );
        }
    };

    let creating = old_str.is_empty() && original.is_none();
    if old_str == new_str && !creating {
        debug!(path = %path.display(), "Edit is a no-op");
        return Ok(EditPlan {
            result: EditResult {
                outcome: EditOutcome::Unchanged,
                message: "No changes applied, old_str and new_str are identical.".into(),
                actual_replacements: 0,
                diff: String::new(),
            },
            staged: None,
            created_dirs: CreatedDirs::default(),
        });
    }

    if old_str.is_empty() {
        if original.is_some() {
            return Err(EditError::new(
                EditErrorKind::CreateExistingFile,
                path,
                "file already exists, cannot create using empty old_str",
            ));
        }
        return plan_create(path, &new_str);
    }

    let Some(original) = original else {
        return Err(EditError::new(
            EditErrorKind::FileNotFound,
            path,
            "file not found",
        ));
    };

    let count = original.matches(old_str.as_str()).count();
    if count == 0 {
        return Err(EditError::new(
            EditErrorKind::NoOccurrenceFound,
            path,
            format!(
                "could not find the string to replace: '{}' (attempted unescaped: '{}')",
                request.old_str, old_str
            ),
        ));
    }
    if let Some(expected) = request.expected_replacements {
        if expected != count {
            return Err(EditError::new(
                EditErrorKind::ExpectedOccurrenceMismatch,
                path,
                format!(
                    "expected {expected} occurrences but found {count} for '{}' (attempted unescaped: '{}')",
                    request.old_str, old_str
                ),
            ));
        }
    }

    let updated = original.replace(old_str.as_str(), &new_str);
    let diff = render_diff(path, &original, &updated)?;
    let staged = stage(path, &updated)?;

    debug!(path = %path.display(), replacements = count, "Edit staged");
    Ok(EditPlan {
        result: EditResult {
            outcome: EditOutcome::Modified,
            message: format!(
                "Successfully modified file: {} ({count} replacement(s)).",
                path.display()
            ),
            actual_replacements: count,
            diff,
        },
        staged: Some(staged),
        created_dirs: CreatedDirs::default(),
    })
}

fn plan_create(path: &Path, content: &str) -> Result<EditPlan, EditError> {
    let created_dirs = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => CreatedDirs::create(path, parent)?,
        None => CreatedDirs::default(),
    };

    let diff = render_diff(path, "", content)?;
    let staged = stage(path, content)?;

    debug!(path = %path.display(), "File creation staged");
    Ok(EditPlan {
        result: EditResult {
            outcome: EditOutcome::Created,
            message: format!("Created new file: {} with provided content.", path.display()),
            actual_replacements: 0,
            diff,
        },
        staged: Some(staged),
        created_dirs,
    })
}

fn render_diff(path: &Path, old: &str, new: &str) -> Result<String, EditError> {
    diff::unified_diff(&path.display().to_string(), old, new).map_err(|_| {
        EditError::new(
            EditErrorKind::DiffGenerationError,
            path,
            "failed to generate diff",
        )
    })
}

fn stage(path: &Path, content: &str) -> Result<StagedWrite, EditError> {
    fs::stage(path, content.as_bytes()).map_err(|e| write_error(path, e.stage, e.source))
}

fn write_error(path: &Path, stage: WriteStage, source: std::io::Error) -> EditError {
    let (kind, details) = match stage {
        WriteStage::Create => (
            EditErrorKind::TempFileCreateError,
            "failed to create temporary file",
        ),
        WriteStage::Write => (
            EditErrorKind::TempFileWriteError,
            "failed to write to temporary file",
        ),
        WriteStage::Rename => (
            EditErrorKind::FileRenameError,
            "failed to rename temporary file to target",
        ),
    };
    EditError::new(kind, path, details).with_source(source)
}
