//! Read-only handlers for version and snapshot history.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::ApiResult;
use crate::middleware::identity::Caller;
use crate::state::AppState;

/// GET /api/v1/sites/:site_id/pages/:page_id/versions
///
/// List a page's publish history, newest first. Each entry carries its
/// frozen content snapshot, so the editor can render diffs and offer
/// rollback targets from this response alone.
pub async fn list_page_versions(
    caller: Caller,
    State(state): State<AppState>,
    Path((site_id, page_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let versions = state
        .pipeline
        .list_page_versions(&caller.workspace_id, &site_id, &page_id)
        .await?;

    Ok(Json(versions))
}

/// GET /api/v1/sites/:site_id/snapshots
///
/// List the site's snapshot history, newest first.
pub async fn list_site_snapshots(
    caller: Caller,
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let snapshots = state
        .pipeline
        .list_site_snapshots(&caller.workspace_id, &site_id)
        .await?;

    Ok(Json(snapshots))
}
