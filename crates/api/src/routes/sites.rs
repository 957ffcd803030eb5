//! Route definitions for site-scoped publishing operations.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{history, publishing, tree};
use crate::state::AppState;

/// Site-scoped routes mounted at `/sites`.
///
/// ```text
/// POST   /{site_id}/pages/{page_id}/publish    -> publish_page
/// POST   /{site_id}/pages/{page_id}/unpublish  -> unpublish_page
/// POST   /{site_id}/pages/{page_id}/rollback   -> rollback_page
/// POST   /{site_id}/pages/{page_id}/move       -> move_page
/// DELETE /{site_id}/pages/{page_id}            -> delete_page
/// GET    /{site_id}/pages/{page_id}/versions   -> list_page_versions
/// GET    /{site_id}/snapshots                  -> list_site_snapshots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{site_id}/pages/{page_id}/publish",
            post(publishing::publish_page),
        )
        .route(
            "/{site_id}/pages/{page_id}/unpublish",
            post(publishing::unpublish_page),
        )
        .route(
            "/{site_id}/pages/{page_id}/rollback",
            post(publishing::rollback_page),
        )
        .route("/{site_id}/pages/{page_id}/move", post(tree::move_page))
        .route("/{site_id}/pages/{page_id}", delete(tree::delete_page))
        .route(
            "/{site_id}/pages/{page_id}/versions",
            get(history::list_page_versions),
        )
        .route("/{site_id}/snapshots", get(history::list_site_snapshots))
}
