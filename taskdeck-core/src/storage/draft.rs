//! File-backed local draft slot.
//!
//! One JSON file holds at most one temporary project. Writes are atomic
//! (write to a `.tmp` sibling, fsync, rename) so an interrupted save never
//! leaves a half-written draft behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::types::ProjectModel;
use crate::validate;

use super::DraftStore;

const DRAFT_FILE_NAME: &str = "draft.json";

pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default slot location under the platform user data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("taskdeck").join(DRAFT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;

        // fsync the directory for rename durability
        if let Some(dir) = path.parent() {
            if let Ok(handle) = fs::File::open(dir) {
                let _ = handle.sync_all();
            }
        }
        Ok(())
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self) -> Result<Option<ProjectModel>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let project: ProjectModel = serde_json::from_str(&content).map_err(|err| {
            log::warn!("[taskdeck.storage.draft] malformed draft slot: {err}");
            CoreError::InvalidDocument(err.to_string())
        })?;
        validate::validate_project(&project)?;
        Ok(Some(project))
    }

    fn save(&self, project: &ProjectModel) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(project)
            .map_err(|err| CoreError::InvalidDocument(err.to_string()))?;
        Self::atomic_write(&self.path, &content)?;
        log::debug!("[taskdeck.storage.draft] draft written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn has_draft(&self) -> bool {
        self.path.exists()
    }
}
