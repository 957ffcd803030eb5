//! Error type shared by every store trait.

/// Errors surfaced by store adapters. Adapters fold their backend's
/// failure modes into these; the pipeline treats anything but `NotFound`
/// as a hard store fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write targeted a document that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A document failed to round-trip through the adapter's codec.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused or lost the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
