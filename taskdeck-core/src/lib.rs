//! Taskdeck core: the board state machine and save flow behind a
//! three-column (todo / doing / done) project board.
//!
//! Layers:
//! - `types`: the project document model and its JSON wire shape
//! - `board`: the in-memory board state store and its mutation operations
//! - `storage`: the persistence gateway and local draft abstractions
//! - `session`: the save / reconciliation flow and the draft claim flow
//!
//! Rendering, gesture detection and identity-provider plumbing live in the
//! embedding application; this crate only consumes their narrow interfaces
//! (`DragEvent`, `Identity`, `ProjectGateway`).

pub mod board;
pub mod error;
pub mod limits;
pub mod policy;
pub mod session;
pub mod storage;
pub mod types;
pub mod validate;

pub use board::{BoardState, DragEvent};
pub use error::CoreError;
pub use session::{claim_draft, BoardSession, ClaimOutcome, SaveOutcome};
pub use storage::{DraftStore, ProjectGateway};
pub use types::{
    ColumnKind, Columns, Identity, NewProject, ProjectData, ProjectModel, ProjectPatch,
    ProjectSummary, SelectedTask, TaskItem,
};
