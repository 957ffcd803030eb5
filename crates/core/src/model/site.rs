//! Site document model.

use serde::{Deserialize, Serialize};

use crate::types::{DocId, Timestamp};

/// A site document as stored in the content store.
///
/// `published_snapshot_id` is the pointer the serving layer follows; it
/// only ever moves forward to a newly written snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: DocId,
    pub workspace_id: DocId,
    pub name: String,
    pub slug: String,
    pub template_id: Option<DocId>,
    /// Opaque theme payload, frozen into each snapshot as-is.
    pub theme: serde_json::Value,
    pub published_snapshot_id: Option<DocId>,
    pub published_at: Option<Timestamp>,
    pub published_by: Option<DocId>,
    pub has_unpublished_changes: bool,
    pub updated_at: Timestamp,
}
