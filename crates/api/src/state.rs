use std::sync::Arc;

use folio_publish::PublishPipeline;
use folio_store::ContentStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The publishing pipeline facade all mutating handlers call into.
    pub pipeline: Arc<PublishPipeline>,
    /// Content store handle, used directly only by the health check.
    pub content: Arc<dyn ContentStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
}
