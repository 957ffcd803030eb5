//! Gateway identity extractor for Axum handlers.
//!
//! Authentication and workspace membership are handled upstream: the auth
//! gateway terminates the session, resolves the caller, and forwards the
//! result in `x-workspace-id` and `x-actor-id` headers. This service
//! trusts those headers; it only enforces that documents touched by a
//! request actually belong to the claimed workspace.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use folio_core::types::DocId;
use folio_publish::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the caller's workspace, set by the auth gateway.
pub const WORKSPACE_HEADER: &str = "x-workspace-id";
/// Header carrying the acting user, set by the auth gateway.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The workspace and user a request acts on behalf of.
///
/// Use this as an extractor parameter in any handler that performs a
/// workspace-scoped operation:
///
/// ```ignore
/// async fn my_handler(caller: Caller) -> ApiResult<Json<()>> {
///     tracing::info!(workspace_id = %caller.workspace_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller {
    /// The workspace the caller is operating in.
    pub workspace_id: DocId,
    /// The user performing the operation.
    pub user_id: DocId,
}

impl Caller {
    /// Assemble the pipeline request context for a site/page pair.
    pub fn request_context(&self, site_id: String, page_id: String) -> RequestContext {
        RequestContext {
            workspace_id: self.workspace_id.clone(),
            site_id,
            page_id,
            actor_user_id: self.user_id.clone(),
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let workspace_id = identity_header(parts, WORKSPACE_HEADER)?;
        let user_id = identity_header(parts, ACTOR_HEADER)?;

        Ok(Caller {
            workspace_id,
            user_id,
        })
    }
}

/// Read one identity header, rejecting missing or blank values.
fn identity_header(parts: &Parts, name: &'static str) -> Result<DocId, ApiError> {
    let value = parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {name} header")))?;

    Ok(value.to_string())
}
