//! Persistence abstractions consumed by the save flow.
//!
//! `ProjectGateway` is the durable, ownership-enforcing backend (a remote
//! API in production; [`memory::MemoryGateway`] here). `DraftStore` is the
//! local, unauthenticated fallback: a single well-known slot holding at
//! most one temporary project.

pub mod draft;
pub mod memory;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{Identity, NewProject, ProjectModel, ProjectPatch, ProjectSummary};

pub use draft::FileDraftStore;
pub use memory::MemoryGateway;

/// Durable project storage. All operations authorize against the supplied
/// identity; the core never second-guesses the gateway's decisions.
#[async_trait]
pub trait ProjectGateway: Send + Sync {
    /// Fetch a project by id, owner-only.
    async fn get_project(
        &self,
        id: &str,
        auth: Option<&Identity>,
    ) -> Result<ProjectModel, CoreError>;

    /// Create a project owned by the authenticated identity. Enforces the
    /// plan's project limit and validates the payload before storing.
    async fn create_project(
        &self,
        new: NewProject,
        auth: Option<&Identity>,
    ) -> Result<ProjectModel, CoreError>;

    /// Apply a partial update and return the authoritative stored document
    /// (including the server-side `updated_at`). Never partially applied:
    /// a validation failure leaves the stored project untouched.
    async fn update_project(
        &self,
        id: &str,
        patch: ProjectPatch,
        auth: Option<&Identity>,
    ) -> Result<ProjectModel, CoreError>;

    /// Delete a project, owner-only. Returns true when a project was
    /// removed.
    async fn delete_project(&self, id: &str, auth: Option<&Identity>)
        -> Result<bool, CoreError>;

    /// Summaries of all projects owned by `user_id`, for dashboards.
    async fn list_projects(
        &self,
        user_id: &str,
        auth: Option<&Identity>,
    ) -> Result<Vec<ProjectSummary>, CoreError>;
}

/// Local draft slot for temporary (unauthenticated) projects. One slot,
/// last write wins.
pub trait DraftStore: Send + Sync {
    /// The stored draft, `None` when the slot is empty. A malformed slot
    /// is an error, not an empty slot.
    fn load(&self) -> Result<Option<ProjectModel>, CoreError>;

    fn save(&self, project: &ProjectModel) -> Result<(), CoreError>;

    fn clear(&self) -> Result<(), CoreError>;

    fn has_draft(&self) -> bool;
}
