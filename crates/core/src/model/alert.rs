//! Workspace alert records for pipeline failures.

use serde::{Deserialize, Serialize};

use crate::types::{DocId, Timestamp};

/// How loudly an alert should surface in the workspace dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// Lifecycle of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Open,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "open",
            AlertStatus::Resolved => "resolved",
        }
    }
}

/// A failure alert raised when an admitted pipeline operation fails.
/// Alerts are best-effort telemetry: recording one never blocks or fails
/// the operation that raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceAlert {
    pub id: DocId,
    pub workspace_id: DocId,
    pub site_id: DocId,
    pub page_id: DocId,
    /// Alert family, `publish` for everything this pipeline raises.
    pub category: String,
    /// The operation that failed (`publish`, `unpublish`, `rollback`).
    pub operation: String,
    /// Stable machine-readable cause, one of `reason_codes`.
    pub reason_code: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub actor_user_id: DocId,
    /// Free-form diagnostic payload (error chains, ids).
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    pub resolved_by: Option<DocId>,
    pub resolution: Option<String>,
}

impl WorkspaceAlert {
    pub fn is_open(&self) -> bool {
        self.status == AlertStatus::Open
    }
}
