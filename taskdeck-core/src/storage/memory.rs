//! In-memory project gateway.
//!
//! The reference implementation of [`ProjectGateway`]: a mutex-guarded map
//! with the same validation, ownership and quota behavior a remote backend
//! applies. Used for local mode and as the backend in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::CoreError;
use crate::policy;
use crate::types::{Identity, NewProject, ProjectModel, ProjectPatch, ProjectSummary};
use crate::validate;

use super::ProjectGateway;

#[derive(Default)]
pub struct MemoryGateway {
    projects: Mutex<HashMap<String, ProjectModel>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectGateway for MemoryGateway {
    async fn get_project(
        &self,
        id: &str,
        auth: Option<&Identity>,
    ) -> Result<ProjectModel, CoreError> {
        let projects = self.projects.lock().await;
        let project = projects
            .get(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        if !policy::can_get_project(auth, project) {
            return Err(CoreError::Unauthorized);
        }
        Ok(project.clone())
    }

    async fn create_project(
        &self,
        new: NewProject,
        auth: Option<&Identity>,
    ) -> Result<ProjectModel, CoreError> {
        let identity = auth.ok_or(CoreError::Unauthorized)?;
        let title = validate::normalized_title(&new.title)?;
        validate::validate_data(&new.data)?;

        let mut projects = self.projects.lock().await;
        let owned = projects
            .values()
            .filter(|project| project.user_id.as_deref() == Some(identity.id.as_str()))
            .count();
        if !policy::can_create_project(auth, owned) {
            return Err(CoreError::LimitExceeded {
                plan: identity.plan,
                limit: identity.plan.max_projects(),
            });
        }

        let now = Utc::now();
        let project = ProjectModel {
            id: Uuid::new_v4().to_string(),
            title,
            description: new.description,
            data: new.data,
            user_id: Some(identity.id.clone()),
            created_at: now,
            updated_at: now,
        };
        projects.insert(project.id.clone(), project.clone());
        log::debug!(
            "[taskdeck.gateway.memory] created project {} for {}",
            project.id,
            identity.id
        );
        Ok(project)
    }

    async fn update_project(
        &self,
        id: &str,
        patch: ProjectPatch,
        auth: Option<&Identity>,
    ) -> Result<ProjectModel, CoreError> {
        let mut projects = self.projects.lock().await;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        if !policy::can_update_project(auth, project) {
            return Err(CoreError::Unauthorized);
        }

        // Validate the whole patch before touching the stored document.
        let title = match &patch.title {
            Some(raw) => Some(validate::normalized_title(raw)?),
            None => None,
        };
        if let Some(data) = &patch.data {
            validate::validate_data(data)?;
        }

        if let Some(title) = title {
            project.title = title;
        }
        if let Some(data) = patch.data {
            project.data = data;
        }
        project.updated_at = Utc::now();
        log::debug!("[taskdeck.gateway.memory] updated project {id}");
        Ok(project.clone())
    }

    async fn delete_project(
        &self,
        id: &str,
        auth: Option<&Identity>,
    ) -> Result<bool, CoreError> {
        let mut projects = self.projects.lock().await;
        let project = projects
            .get(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        if !policy::can_delete_project(auth, project) {
            return Err(CoreError::Unauthorized);
        }
        projects.remove(id);
        log::debug!("[taskdeck.gateway.memory] deleted project {id}");
        Ok(true)
    }

    async fn list_projects(
        &self,
        user_id: &str,
        auth: Option<&Identity>,
    ) -> Result<Vec<ProjectSummary>, CoreError> {
        let requester = auth.ok_or(CoreError::Unauthorized)?;
        if requester.id != user_id {
            return Err(CoreError::Unauthorized);
        }

        let projects = self.projects.lock().await;
        let mut summaries: Vec<ProjectSummary> = projects
            .values()
            .filter(|project| project.user_id.as_deref() == Some(user_id))
            .map(ProjectSummary::from)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::AccountPlan;
    use crate::types::{ColumnKind, ProjectData, TaskItem};

    fn identity(id: &str, plan: AccountPlan) -> Identity {
        Identity {
            id: id.to_string(),
            name: id.to_string(),
            email: None,
            plan,
        }
    }

    fn new_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: None,
            data: ProjectData::new(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_owner_and_timestamps() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);

        let created = gateway
            .create_project(new_project("  Board  "), Some(&alice))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.title, "Board");
        assert_eq!(created.user_id.as_deref(), Some("alice"));
        assert_eq!(created.created_at, created.updated_at);

        let fetched = gateway.get_project(&created.id, Some(&alice)).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_requires_authentication_and_valid_payload() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);

        let err = gateway.create_project(new_project("Board"), None).await.unwrap_err();
        assert_eq!(err.code(), "unauthorized");

        let err = gateway
            .create_project(new_project("   "), Some(&alice))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation");

        let mut bad = new_project("Board");
        let task = TaskItem::new("dup");
        bad.data.columns.todo.push(task.clone());
        bad.data.columns.done.push(task);
        let err = gateway.create_project(bad, Some(&alice)).await.unwrap_err();
        assert_eq!(err.code(), "invalid_document");
    }

    #[tokio::test]
    async fn create_enforces_the_free_plan_limit() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);

        for n in 0..3 {
            gateway
                .create_project(new_project(&format!("Board {n}")), Some(&alice))
                .await
                .unwrap();
        }
        let err = gateway
            .create_project(new_project("One too many"), Some(&alice))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "limit_exceeded");

        // another account is unaffected
        let bob = identity("bob", AccountPlan::Free);
        gateway.create_project(new_project("Bob's"), Some(&bob)).await.unwrap();
    }

    #[tokio::test]
    async fn get_is_owner_only() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);
        let bob = identity("bob", AccountPlan::Free);
        let created = gateway
            .create_project(new_project("Private"), Some(&alice))
            .await
            .unwrap();

        let err = gateway.get_project(&created.id, Some(&bob)).await.unwrap_err();
        assert_eq!(err.code(), "unauthorized");
        let err = gateway.get_project(&created.id, None).await.unwrap_err();
        assert_eq!(err.code(), "unauthorized");
        let err = gateway.get_project("nope", Some(&alice)).await.unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn update_applies_patch_and_bumps_updated_at() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);
        let created = gateway
            .create_project(new_project("Board"), Some(&alice))
            .await
            .unwrap();

        let mut data = ProjectData::new();
        data.columns.todo.push(TaskItem::new("ship it"));
        let patch = ProjectPatch {
            title: Some("Renamed".to_string()),
            data: Some(data.clone()),
        };
        let updated = gateway
            .update_project(&created.id, patch, Some(&alice))
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.data, data);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_failures_leave_the_stored_project_untouched() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);
        let created = gateway
            .create_project(new_project("Board"), Some(&alice))
            .await
            .unwrap();

        let mut broken = ProjectData::new();
        let task = TaskItem::new("dup");
        broken.columns.todo.push(task.clone());
        broken.columns.doing.push(task);
        let patch = ProjectPatch {
            title: Some("Half applied?".to_string()),
            data: Some(broken),
        };
        let err = gateway
            .update_project(&created.id, patch, Some(&alice))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_document");

        let stored = gateway.get_project(&created.id, Some(&alice)).await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn update_is_owner_only() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);
        let bob = identity("bob", AccountPlan::Free);
        let created = gateway
            .create_project(new_project("Board"), Some(&alice))
            .await
            .unwrap();

        let err = gateway
            .update_project(&created.id, ProjectPatch::default(), Some(&bob))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[tokio::test]
    async fn delete_removes_owned_projects_only() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);
        let bob = identity("bob", AccountPlan::Free);
        let created = gateway
            .create_project(new_project("Board"), Some(&alice))
            .await
            .unwrap();

        let err = gateway.delete_project(&created.id, Some(&bob)).await.unwrap_err();
        assert_eq!(err.code(), "unauthorized");

        assert!(gateway.delete_project(&created.id, Some(&alice)).await.unwrap());
        let err = gateway.get_project(&created.id, Some(&alice)).await.unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn list_returns_own_summaries_most_recent_first() {
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);
        let bob = identity("bob", AccountPlan::Free);

        let first = gateway
            .create_project(new_project("First"), Some(&alice))
            .await
            .unwrap();
        gateway.create_project(new_project("Other"), Some(&bob)).await.unwrap();
        let second = gateway
            .create_project(new_project("Second"), Some(&alice))
            .await
            .unwrap();

        // touch the first project so it becomes the most recent
        let mut data = ProjectData::new();
        data.columns.done.push(TaskItem::new("done"));
        gateway
            .update_project(&first.id, ProjectPatch { title: None, data: Some(data) }, Some(&alice))
            .await
            .unwrap();

        let summaries = gateway.list_projects("alice", Some(&alice)).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, first.id);
        assert_eq!(summaries[0].done_count, 1);
        assert_eq!(summaries[0].total_count, 1);
        assert_eq!(summaries[1].id, second.id);

        let err = gateway.list_projects("alice", Some(&bob)).await.unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[tokio::test]
    async fn column_kind_is_reachable_from_summaries() {
        // counts come from the fixed column set, in board order
        let gateway = MemoryGateway::new();
        let alice = identity("alice", AccountPlan::Free);
        let mut new = new_project("Counts");
        new.data.columns.todo.push(TaskItem::new("a"));
        new.data.columns.doing.push(TaskItem::new("b"));
        let created = gateway.create_project(new, Some(&alice)).await.unwrap();
        assert_eq!(created.data.count(ColumnKind::Todo), 1);

        let summaries = gateway.list_projects("alice", Some(&alice)).await.unwrap();
        assert_eq!(summaries[0].todo_count, 1);
        assert_eq!(summaries[0].doing_count, 1);
        assert_eq!(summaries[0].done_count, 0);
    }
}
