use crate::limits::AccountPlan;

/// Unified error taxonomy for the gateway and save-flow boundaries.
///
/// The board store itself never returns these: invalid mutations are
/// silently dropped there (the UI validates before calling). Everything
/// that crosses an I/O or authorization boundary reports through this type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed for {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("not authorized for this project")]
    Unauthorized,

    #[error("project not found: {0}")]
    NotFound(String),

    #[error("project limit reached ({limit} on the {plan} plan)")]
    LimitExceeded { plan: AccountPlan, limit: usize },

    #[error("invalid project document: {0}")]
    InvalidDocument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Stable machine-readable code, surfaced to the UI alongside the
    /// human-readable message.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation { .. } => "validation",
            CoreError::Unauthorized => "unauthorized",
            CoreError::NotFound(_) => "not_found",
            CoreError::LimitExceeded { .. } => "limit_exceeded",
            CoreError::InvalidDocument(_) => "invalid_document",
            CoreError::Io(_) => "io",
        }
    }
}
