//! Route definitions for workspace-scoped alert management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Workspace-scoped routes mounted at `/workspaces`.
///
/// ```text
/// GET  /{workspace_id}/alerts                     -> list_alerts
/// POST /{workspace_id}/alerts/{alert_id}/resolve  -> resolve_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{workspace_id}/alerts", get(alerts::list_alerts))
        .route(
            "/{workspace_id}/alerts/{alert_id}/resolve",
            post(alerts::resolve_alert),
        )
}
