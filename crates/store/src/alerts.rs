//! The alert store seam.

use async_trait::async_trait;

use folio_core::model::{AlertStatus, WorkspaceAlert};
use folio_core::types::Timestamp;

use crate::error::StoreError;

/// Persistence for workspace failure alerts.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn create_alert(&self, alert: &WorkspaceAlert) -> Result<(), StoreError>;

    /// Alerts of a workspace, newest first, optionally filtered by status.
    async fn list_alerts(
        &self,
        workspace_id: &str,
        status: Option<AlertStatus>,
    ) -> Result<Vec<WorkspaceAlert>, StoreError>;

    /// Open alerts attached to one page, newest first.
    async fn open_alerts_for_page(&self, page_id: &str)
        -> Result<Vec<WorkspaceAlert>, StoreError>;

    /// Mark an alert resolved. Returns `false` when the alert does not
    /// exist or is already resolved.
    async fn resolve_alert(
        &self,
        alert_id: &str,
        resolved_by: &str,
        resolution: &str,
        at: Timestamp,
    ) -> Result<bool, StoreError>;
}
