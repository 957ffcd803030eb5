pub mod health;
pub mod sites;
pub mod workspaces;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sites/{site_id}/pages/{page_id}/publish      publish (POST)
/// /sites/{site_id}/pages/{page_id}/unpublish    unpublish (POST)
/// /sites/{site_id}/pages/{page_id}/rollback     rollback to a version (POST)
/// /sites/{site_id}/pages/{page_id}/move         reparent within the tree (POST)
/// /sites/{site_id}/pages/{page_id}              delete subtree (DELETE)
/// /sites/{site_id}/pages/{page_id}/versions     version history (GET)
/// /sites/{site_id}/snapshots                    snapshot history (GET)
///
/// /workspaces/{workspace_id}/alerts                      alert list (GET)
/// /workspaces/{workspace_id}/alerts/{alert_id}/resolve   manual resolution (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Publishing, history, and tree operations, scoped by site.
        .nest("/sites", sites::router())
        // Failure alerts, scoped by workspace.
        .nest("/workspaces", workspaces::router())
}
