//! Prompt and preprompt files.
//!
//! A preprompt file is a plain list of prompt file paths, one per line.
//! Blank lines and lines starting with `#` are ignored.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, bail};

/// Read a prompt file. An empty prompt is rejected.
pub fn read_prompt(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
    if text.trim().is_empty() {
        bail!("Prompt file {} is empty", path.display());
    }
    Ok(text)
}

/// Load every prompt named in a preprompt list.
///
/// A missing list is only an error when `required` is set (the operator
/// named it explicitly). A listed prompt that cannot be read always is.
pub fn load_preprompts(list: &Path, required: bool) -> anyhow::Result<Vec<String>> {
    let content = match std::fs::read_to_string(list) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            tracing::debug!(path = %list.display(), "No preprompt file");
            return Ok(Vec::new());
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            bail!("preprompt file not found: {}", list.display());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read preprompt file {}", list.display()));
        }
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            read_prompt(Path::new(line))
                .with_context(|| format!("loading prompt file '{line}'"))
        })
        .collect()
}
