//! Pipeline error type.

use folio_core::actions::PipelineAction;
use folio_core::checks::ValidationReport;
use folio_core::types::Timestamp;
use folio_store::StoreError;

/// Everything a pipeline operation can fail with. The API layer maps
/// these onto HTTP responses; the alert sink classifies the post-admission
/// variants into reason codes.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The per-user sliding window for this action is full.
    #[error("{action} rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited {
        action: PipelineAction,
        limit: u32,
        retry_after_secs: i64,
    },

    /// The workspace burned through its daily allowance for this action.
    #[error("{action} daily quota of {limit} exhausted")]
    QuotaExceeded {
        action: PipelineAction,
        limit: u32,
        reset_at: Timestamp,
    },

    /// The pre-publish gate found failing checks. Carries the full report
    /// so the caller can render every check, not just the first failure.
    #[error("pre-publish validation failed")]
    ValidationFailed(ValidationReport),

    /// A referenced document does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The request crosses a tenancy boundary.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The request conflicts with current tree state (slug collision,
    /// cycle, self-parenting).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The content store failed mid-operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected internal failure.
    #[error("internal pipeline error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors that exist before any write was attempted; the
    /// alert sink ignores these.
    pub fn is_admission_refusal(&self) -> bool {
        matches!(
            self,
            PipelineError::RateLimited { .. }
                | PipelineError::QuotaExceeded { .. }
                | PipelineError::ValidationFailed(_)
        )
    }
}
