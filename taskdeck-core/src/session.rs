//! The save / reconciliation flow.
//!
//! A `BoardSession` ties one board to its persistence: mutations go through
//! [`BoardSession::board`] synchronously, `save` pushes a snapshot through
//! the gateway (authenticated) or the local draft slot (anonymous) and
//! reconciles the confirmed result back into the board.
//!
//! Two rules keep the flow honest under interleaving:
//! - at most one save is in flight per session; a `save` call made while
//!   one is pending is ignored (deterministically — callers retry once the
//!   first resolves),
//! - a resolving save only marks the board clean when no edits landed after
//!   its snapshot was taken, so an older response can never overwrite or
//!   "launder" newer in-flight edits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::board::BoardState;
use crate::error::CoreError;
use crate::storage::{DraftStore, ProjectGateway};
use crate::types::{Identity, NewProject, ProjectModel, ProjectPatch};
use crate::validate;

/// What a `save` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The board was already clean; nothing was sent.
    AlreadySaved,
    /// Another save is still in flight; this call was ignored.
    InFlight,
    /// The snapshot was persisted and the board is clean.
    Saved,
    /// The snapshot was persisted, but edits made while the save was in
    /// flight keep the board dirty; a later `save` picks them up.
    SavedWithPendingEdits,
}

/// Result of converting the local draft into an owned project.
#[derive(Debug)]
pub enum ClaimOutcome {
    Claimed(ProjectModel),
    NothingToClaim,
}

pub struct BoardSession {
    state: Mutex<BoardState>,
    gateway: Arc<dyn ProjectGateway>,
    drafts: Arc<dyn DraftStore>,
    identity: Option<Identity>,
    saving: AtomicBool,
}

impl std::fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardSession")
            .field("state", &self.state)
            .field("identity", &self.identity)
            .field("saving", &self.saving)
            .finish_non_exhaustive()
    }
}

impl BoardSession {
    /// Session over a fresh, empty project (not yet persisted anywhere).
    pub fn new_project(
        gateway: Arc<dyn ProjectGateway>,
        drafts: Arc<dyn DraftStore>,
        identity: Option<Identity>,
    ) -> Self {
        let project = ProjectModel::new_draft(identity.as_ref());
        Self {
            state: Mutex::new(BoardState::new(project)),
            gateway,
            drafts,
            identity,
            saving: AtomicBool::new(false),
        }
    }

    /// Session over a project loaded from the gateway.
    pub async fn open_project(
        gateway: Arc<dyn ProjectGateway>,
        drafts: Arc<dyn DraftStore>,
        identity: Option<Identity>,
        project_id: &str,
    ) -> Result<Self, CoreError> {
        let project = gateway.get_project(project_id, identity.as_ref()).await?;
        validate::validate_project(&project)?;
        Ok(Self {
            state: Mutex::new(BoardState::new(project)),
            gateway,
            drafts,
            identity,
            saving: AtomicBool::new(false),
        })
    }

    /// Session over the local draft slot (temporary, unauthenticated use).
    pub fn open_draft(
        gateway: Arc<dyn ProjectGateway>,
        drafts: Arc<dyn DraftStore>,
        identity: Option<Identity>,
    ) -> Result<Self, CoreError> {
        let project = drafts
            .load()?
            .ok_or_else(|| CoreError::NotFound("local draft".to_string()))?;
        Ok(Self {
            state: Mutex::new(BoardState::new(project)),
            gateway,
            drafts,
            identity,
            saving: AtomicBool::new(false),
        })
    }

    /// Mutation and inspection access to the board state.
    pub fn board(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap()
    }

    /// Snapshot of the current project.
    pub fn project(&self) -> ProjectModel {
        self.board().project().clone()
    }

    pub fn is_saved(&self) -> bool {
        self.board().is_saved()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Persist the current board.
    ///
    /// Takes an immutable snapshot up front; the board stays fully editable
    /// while the gateway call is pending. On failure the board is left
    /// exactly as edited (still dirty) and the error is surfaced.
    pub async fn save(&self) -> Result<SaveOutcome, CoreError> {
        if self.saving.swap(true, Ordering::SeqCst) {
            return Ok(SaveOutcome::InFlight);
        }

        let (snapshot, revision) = {
            let board = self.state.lock().unwrap();
            if board.is_saved() {
                self.saving.store(false, Ordering::SeqCst);
                return Ok(SaveOutcome::AlreadySaved);
            }
            (board.project().clone(), board.revision())
        };

        let result = self.persist(snapshot).await;
        self.saving.store(false, Ordering::SeqCst);
        let confirmed = result?;

        let mut board = self.state.lock().unwrap();
        if board.revision() != revision {
            log::info!(
                "[taskdeck.session.save] edits landed during the save; board stays dirty"
            );
            return Ok(SaveOutcome::SavedWithPendingEdits);
        }
        if let Some(project) = confirmed {
            board.replace_project(project, false);
        }
        board.mark_saved();
        Ok(SaveOutcome::Saved)
    }

    /// One persistence attempt for a snapshot. Returns the authoritative
    /// document for gateway saves, `None` for draft saves (which confirm
    /// nothing beyond the write itself).
    async fn persist(&self, snapshot: ProjectModel) -> Result<Option<ProjectModel>, CoreError> {
        match &self.identity {
            Some(identity) => {
                if snapshot.is_persisted() {
                    let id = snapshot.id.clone();
                    let patch = ProjectPatch {
                        title: Some(snapshot.title),
                        data: Some(snapshot.data),
                    };
                    let updated = self.gateway.update_project(&id, patch, Some(identity)).await?;
                    Ok(Some(updated))
                } else {
                    let new = NewProject {
                        title: snapshot.title,
                        description: snapshot.description,
                        data: snapshot.data,
                    };
                    let created = self.gateway.create_project(new, Some(identity)).await?;
                    Ok(Some(created))
                }
            }
            None => {
                self.drafts.save(&snapshot)?;
                log::debug!("[taskdeck.session.save] snapshot written to the local draft slot");
                Ok(None)
            }
        }
    }
}

/// Convert the local draft into a durably owned project, once the user has
/// authenticated: read the slot, create the project under the identity,
/// clear the slot. An empty slot is a reported condition, not a failure.
pub async fn claim_draft(
    gateway: &dyn ProjectGateway,
    drafts: &dyn DraftStore,
    identity: &Identity,
) -> Result<ClaimOutcome, CoreError> {
    let Some(draft) = drafts.load()? else {
        log::info!("[taskdeck.session.claim] no local draft to claim");
        return Ok(ClaimOutcome::NothingToClaim);
    };

    let new = NewProject {
        title: draft.title,
        description: draft.description,
        data: draft.data,
    };
    let created = gateway.create_project(new, Some(identity)).await?;
    drafts.clear()?;
    log::info!(
        "[taskdeck.session.claim] draft claimed as project {} for {}",
        created.id,
        identity.id
    );
    Ok(ClaimOutcome::Claimed(created))
}
