//! Shared type aliases used across the workspace.

/// Identifier of a document in the content store. The store assigns and
/// owns these; we treat them as opaque strings.
pub type DocId = String;

/// All timestamps in the system are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
