//! Typed field and document validators.
//!
//! Free-form text goes through `normalized_*` before it reaches the board
//! or the gateway; documents deserialized from outside go through
//! `validate_data` before they are adopted.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::{ProjectData, ProjectModel, DATA_VERSION};

/// Title and task text share the same bound: 1–128 characters after trim.
pub const TITLE_MAX: usize = 128;
pub const TASK_TEXT_MAX: usize = 128;

/// Trimmed project title, or a validation error.
pub fn normalized_title(raw: &str) -> Result<String, CoreError> {
    normalized("title", raw, TITLE_MAX)
}

/// Trimmed task text, or a validation error.
pub fn normalized_task_text(raw: &str) -> Result<String, CoreError> {
    normalized("text", raw, TASK_TEXT_MAX)
}

fn normalized(field: &'static str, raw: &str, max: usize) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation {
            field,
            message: "must not be empty".to_string(),
        });
    }
    if trimmed.chars().count() > max {
        return Err(CoreError::Validation {
            field,
            message: format!("must be at most {max} characters"),
        });
    }
    Ok(trimmed.to_string())
}

/// Structural validation of a project document: version within the accepted
/// range, and every task id unique across the whole board.
pub fn validate_data(data: &ProjectData) -> Result<(), CoreError> {
    if !(1..=DATA_VERSION).contains(&data.v) {
        return Err(CoreError::InvalidDocument(format!(
            "unsupported document version {} (accepted 1..={DATA_VERSION})",
            data.v
        )));
    }

    let mut seen = HashSet::new();
    for (column, tasks) in data.columns.iter() {
        for task in tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(CoreError::InvalidDocument(format!(
                    "duplicate task id {:?} (second occurrence in {column})",
                    task.id
                )));
            }
        }
    }

    Ok(())
}

/// Full envelope validation, used by loaders (gateway responses, drafts).
pub fn validate_project(project: &ProjectModel) -> Result<(), CoreError> {
    normalized_title(&project.title)?;
    validate_data(&project.data)
}
