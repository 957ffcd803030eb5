//! Page version history records.

use serde::{Deserialize, Serialize};

use crate::model::page::Page;
use crate::types::{DocId, Timestamp};

/// An immutable record of one publish of one page. Written once, never
/// updated; rollback reads `snapshot` back and republishes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVersion {
    pub id: DocId,
    pub site_id: DocId,
    pub page_id: DocId,
    pub workspace_id: DocId,
    /// The page's `draft_version` at the moment this record was written.
    pub version: i64,
    /// Which draft state the frozen payload came from. Equal to `version`
    /// for a direct publish; for a rollback it names the restored version.
    pub source_draft_version: i64,
    /// Set on rollback records: the historical version that was restored.
    pub source_version_id: Option<DocId>,
    pub rollback: bool,
    /// Full page payload frozen at publish time. Absent only on legacy
    /// records; rollback refuses those.
    pub snapshot: Option<Page>,
    /// SHA-256 over the canonical JSON of `snapshot`, for idempotent
    /// re-runs and content comparison without payload diffing.
    pub content_hash: String,
    pub published_at: Timestamp,
    pub published_by: DocId,
}
