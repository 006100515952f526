//! Ownership and quota predicates, enforced at the gateway boundary.
//! Projects are private: only the owner may read, update or delete them.

use crate::types::{Identity, ProjectModel};

fn is_owner(auth: Option<&Identity>, project: &ProjectModel) -> bool {
    match (auth, project.user_id.as_deref()) {
        (Some(identity), Some(owner)) => identity.id == owner,
        _ => false,
    }
}

pub fn can_get_project(auth: Option<&Identity>, project: &ProjectModel) -> bool {
    is_owner(auth, project)
}

pub fn can_update_project(auth: Option<&Identity>, project: &ProjectModel) -> bool {
    is_owner(auth, project)
}

pub fn can_delete_project(auth: Option<&Identity>, project: &ProjectModel) -> bool {
    is_owner(auth, project)
}

/// Whether the identity may create one more project on top of
/// `current_count` already owned.
pub fn can_create_project(auth: Option<&Identity>, current_count: usize) -> bool {
    match auth {
        Some(identity) => current_count < identity.plan.max_projects(),
        None => false,
    }
}
