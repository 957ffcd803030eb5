//! Site snapshot records.

use serde::{Deserialize, Serialize};

use crate::types::{DocId, Timestamp};

/// One page entry inside a site snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub page_id: DocId,
    pub slug: String,
    pub version_id: DocId,
}

/// An immutable, self-contained picture of a site's published surface:
/// which page versions are live, plus the theme and template frozen at
/// publish time. The serving layer renders from the snapshot the site's
/// `published_snapshot_id` points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSnapshot {
    pub id: DocId,
    pub site_id: DocId,
    pub workspace_id: DocId,
    pub template_id: Option<DocId>,
    pub theme: serde_json::Value,
    pub pages: Vec<SnapshotEntry>,
    pub published_at: Timestamp,
    pub published_by: DocId,
    /// Set when this snapshot was produced by a rollback: the historical
    /// page version it restored.
    pub rollback_from_version_id: Option<DocId>,
}

impl SiteSnapshot {
    /// Look up the live version id for a page in this snapshot.
    pub fn version_for(&self, page_id: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|entry| entry.page_id == page_id)
            .map(|entry| entry.version_id.as_str())
    }

    pub fn contains_page(&self, page_id: &str) -> bool {
        self.pages.iter().any(|entry| entry.page_id == page_id)
    }
}
