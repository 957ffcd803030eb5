//! Handlers for the publish, unpublish, and rollback operations.
//!
//! Each handler assembles a [`folio_publish::RequestContext`] from the
//! gateway identity and the path, then delegates to the pipeline facade.
//! Receipts serialize directly as the response body; every error path is
//! mapped by [`crate::error::ApiError`].

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::middleware::identity::Caller;
use crate::state::AppState;

/// Rollback request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackRequest {
    /// Id of the historical version to restore.
    pub version_id: String,
}

/// POST /api/v1/sites/:site_id/pages/:page_id/publish
///
/// Run the full publish pipeline for one page: admission control, the
/// pre-publish gate, version and snapshot writes, pointer flips, and
/// cache invalidation dispatch.
pub async fn publish_page(
    caller: Caller,
    State(state): State<AppState>,
    Path((site_id, page_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let ctx = caller.request_context(site_id, page_id);
    let receipt = state.pipeline.publish(&ctx).await?;

    Ok(Json(receipt))
}

/// POST /api/v1/sites/:site_id/pages/:page_id/unpublish
///
/// Remove a published page from the live surface. The page itself
/// survives as a draft with its version history intact.
pub async fn unpublish_page(
    caller: Caller,
    State(state): State<AppState>,
    Path((site_id, page_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let ctx = caller.request_context(site_id, page_id);
    let receipt = state.pipeline.unpublish(&ctx).await?;

    Ok(Json(receipt))
}

/// POST /api/v1/sites/:site_id/pages/:page_id/rollback
///
/// Republish the content of a historical version as a brand-new version.
/// Returns 404 when the version does not exist, belongs to another page,
/// or carries no stored snapshot.
pub async fn rollback_page(
    caller: Caller,
    State(state): State<AppState>,
    Path((site_id, page_id)): Path<(String, String)>,
    Json(input): Json<RollbackRequest>,
) -> ApiResult<impl IntoResponse> {
    let ctx = caller.request_context(site_id, page_id);
    let receipt = state.pipeline.rollback(&ctx, &input.version_id).await?;

    Ok(Json(receipt))
}
