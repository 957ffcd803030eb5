//! Handlers for workspace failure alerts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use folio_core::model::AlertStatus;
use folio_publish::PipelineError;

use crate::error::{ApiError, ApiResult};
use crate::middleware::identity::Caller;
use crate::state::AppState;

/// Query parameters for the alert listing.
#[derive(Debug, Default, Deserialize)]
pub struct AlertListQuery {
    /// Optional status filter: `open` or `resolved`.
    pub status: Option<String>,
}

/// Manual resolution request body. The resolution note is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ResolveAlertRequest {
    pub resolution: Option<String>,
}

/// GET /api/v1/workspaces/:workspace_id/alerts
///
/// List the workspace's failure alerts, newest first, optionally
/// filtered by status.
pub async fn list_alerts(
    caller: Caller,
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    Query(query): Query<AlertListQuery>,
) -> ApiResult<impl IntoResponse> {
    authorize_workspace(&caller, &workspace_id)?;
    let status = parse_status(query.status.as_deref())?;

    let alerts = state.pipeline.list_alerts(&workspace_id, status).await?;

    Ok(Json(alerts))
}

/// POST /api/v1/workspaces/:workspace_id/alerts/:alert_id/resolve
///
/// Manually resolve one open alert. Returns 404 for alerts outside the
/// workspace and 409 for alerts that are already resolved.
pub async fn resolve_alert(
    caller: Caller,
    State(state): State<AppState>,
    Path((workspace_id, alert_id)): Path<(String, String)>,
    Json(input): Json<ResolveAlertRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize_workspace(&caller, &workspace_id)?;

    state
        .pipeline
        .resolve_alert(&workspace_id, &alert_id, &caller.user_id, input.resolution)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// The path workspace must match the workspace the gateway resolved;
/// anything else is a cross-tenant request.
fn authorize_workspace(caller: &Caller, workspace_id: &str) -> Result<(), ApiError> {
    if caller.workspace_id != workspace_id {
        return Err(PipelineError::Forbidden(format!(
            "workspace {workspace_id} does not match the caller's workspace"
        ))
        .into());
    }
    Ok(())
}

/// Parse the `?status=` filter, rejecting unknown values.
fn parse_status(raw: Option<&str>) -> Result<Option<AlertStatus>, ApiError> {
    match raw {
        None => Ok(None),
        Some("open") => Ok(Some(AlertStatus::Open)),
        Some("resolved") => Ok(Some(AlertStatus::Resolved)),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Unknown alert status '{other}', expected 'open' or 'resolved'"
        ))),
    }
}
