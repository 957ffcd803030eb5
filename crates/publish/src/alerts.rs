//! Failure alert sink.
//!
//! When an admitted operation fails partway, the workspace needs to hear
//! about it: a page stuck half-published is invisible in the editor until
//! someone looks. The sink records one open alert per failure and resolves
//! a page's open alerts when a later attempt succeeds. Recording is
//! best-effort; an alert write never turns a failure into a worse one.

use std::sync::Arc;

use folio_core::actions::PipelineAction;
use folio_core::ids::Clock;
use folio_core::model::{AlertSeverity, AlertStatus, WorkspaceAlert};
use folio_store::AlertStore;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::pipeline::RequestContext;

/// Alert family for everything this pipeline raises.
pub const ALERT_CATEGORY_PUBLISH: &str = "publish";

/// Stable machine-readable failure causes carried in `reason_code`.
pub mod reason_codes {
    pub const PAGE_NOT_FOUND: &str = "page-not-found";
    pub const SITE_NOT_FOUND: &str = "site-not-found";
    pub const VERSION_NOT_FOUND: &str = "version-not-found";
    pub const WORKSPACE_MISMATCH: &str = "workspace-mismatch";
    pub const CONFLICT: &str = "conflict";
    pub const STORE_FAILURE: &str = "store-failure";
    pub const INTERNAL: &str = "internal";
}

pub struct AlertSink {
    alerts: Arc<dyn AlertStore>,
    clock: Arc<dyn Clock>,
}

impl AlertSink {
    pub fn new(alerts: Arc<dyn AlertStore>, clock: Arc<dyn Clock>) -> Self {
        Self { alerts, clock }
    }

    /// Record `err` as an open workspace alert. Admission refusals (rate
    /// limit, quota, validation) are not failures and are skipped.
    pub async fn record_failure(
        &self,
        ctx: &RequestContext,
        action: PipelineAction,
        err: &PipelineError,
    ) {
        if err.is_admission_refusal() {
            return;
        }

        let (reason_code, severity) = classify(err);
        let alert = WorkspaceAlert {
            id: Uuid::now_v7().to_string(),
            workspace_id: ctx.workspace_id.clone(),
            site_id: ctx.site_id.clone(),
            page_id: ctx.page_id.clone(),
            category: ALERT_CATEGORY_PUBLISH.to_string(),
            operation: action.as_str().to_string(),
            reason_code: reason_code.to_string(),
            message: err.to_string(),
            severity,
            status: AlertStatus::Open,
            actor_user_id: ctx.actor_user_id.clone(),
            metadata: serde_json::json!({ "errorChain": error_chain(err) }),
            created_at: self.clock.now(),
            resolved_at: None,
            resolved_by: None,
            resolution: None,
        };

        match self.alerts.create_alert(&alert).await {
            Ok(()) => match severity {
                AlertSeverity::Critical => tracing::error!(
                    alert_id = %alert.id,
                    workspace_id = %ctx.workspace_id,
                    page_id = %ctx.page_id,
                    reason = reason_code,
                    "Pipeline failure alert raised"
                ),
                AlertSeverity::Warning => tracing::warn!(
                    alert_id = %alert.id,
                    workspace_id = %ctx.workspace_id,
                    page_id = %ctx.page_id,
                    reason = reason_code,
                    "Pipeline failure alert raised"
                ),
            },
            Err(e) => tracing::warn!(
                page_id = %ctx.page_id,
                reason = reason_code,
                error = %e,
                "Failed to record pipeline alert"
            ),
        }
    }

    /// Resolve this page's open publish alerts after a successful
    /// operation. Failures to resolve are logged and swallowed.
    pub async fn resolve_open_for_page(&self, ctx: &RequestContext, action: PipelineAction) {
        let open = match self.alerts.open_alerts_for_page(&ctx.page_id).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!(
                    page_id = %ctx.page_id,
                    error = %e,
                    "Failed to list open alerts for resolution"
                );
                return;
            }
        };

        let resolution = format!("{action} succeeded");
        let now = self.clock.now();
        let mut resolved = 0usize;
        for alert in open {
            if alert.category != ALERT_CATEGORY_PUBLISH {
                continue;
            }
            match self
                .alerts
                .resolve_alert(&alert.id, &ctx.actor_user_id, &resolution, now)
                .await
            {
                Ok(true) => resolved += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    alert_id = %alert.id,
                    error = %e,
                    "Failed to resolve pipeline alert"
                ),
            }
        }

        if resolved > 0 {
            tracing::info!(
                page_id = %ctx.page_id,
                count = resolved,
                "Resolved open pipeline alerts"
            );
        }
    }
}

/// Map a post-admission failure to its reason code and severity. Missing
/// documents are a content problem someone can fix; store and internal
/// failures mean the pipeline itself is in trouble.
fn classify(err: &PipelineError) -> (&'static str, AlertSeverity) {
    match err {
        PipelineError::NotFound { entity, .. } => {
            let code = match *entity {
                "page" => reason_codes::PAGE_NOT_FOUND,
                "site" => reason_codes::SITE_NOT_FOUND,
                "page version" | "page version snapshot" => reason_codes::VERSION_NOT_FOUND,
                _ => reason_codes::INTERNAL,
            };
            (code, AlertSeverity::Warning)
        }
        PipelineError::Forbidden(_) => (reason_codes::WORKSPACE_MISMATCH, AlertSeverity::Warning),
        PipelineError::Conflict(_) => (reason_codes::CONFLICT, AlertSeverity::Warning),
        PipelineError::Store(_) => (reason_codes::STORE_FAILURE, AlertSeverity::Critical),
        PipelineError::Internal(_) => (reason_codes::INTERNAL, AlertSeverity::Critical),
        // admission refusals were filtered before classification
        _ => (reason_codes::INTERNAL, AlertSeverity::Warning),
    }
}

/// The display chain from the error down through its sources.
fn error_chain(err: &PipelineError) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}
