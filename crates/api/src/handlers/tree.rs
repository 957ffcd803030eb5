//! Handlers for page-tree structure changes (move, delete).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use folio_core::types::DocId;

use crate::error::ApiResult;
use crate::middleware::identity::Caller;
use crate::state::AppState;

/// Move request body. A missing or null `newParentId` moves the page to
/// the site root.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePageRequest {
    pub new_parent_id: Option<String>,
}

/// Delete response: every page id removed by the cascade, target included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePageResponse {
    pub deleted: usize,
    pub page_ids: Vec<DocId>,
}

/// POST /api/v1/sites/:site_id/pages/:page_id/move
///
/// Reparent a page. Descendant paths are rewritten in the same request;
/// cycles and sibling slug collisions return 409.
pub async fn move_page(
    caller: Caller,
    State(state): State<AppState>,
    Path((site_id, page_id)): Path<(String, String)>,
    Json(input): Json<MovePageRequest>,
) -> ApiResult<impl IntoResponse> {
    let ctx = caller.request_context(site_id, page_id);
    let page = state
        .pipeline
        .move_page(&ctx, input.new_parent_id.as_deref())
        .await?;

    Ok(Json(page))
}

/// DELETE /api/v1/sites/:site_id/pages/:page_id
///
/// Delete a page and its whole subtree, children before parents.
pub async fn delete_page(
    caller: Caller,
    State(state): State<AppState>,
    Path((site_id, page_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let ctx = caller.request_context(site_id, page_id);
    let page_ids = state.pipeline.delete_page(&ctx).await?;

    Ok(Json(DeletePageResponse {
        deleted: page_ids.len(),
        page_ids,
    }))
}
