//! Document models for the content store.
//!
//! Each submodule holds one document family as stored by the external
//! content store, plus its helper methods. All documents serialize with
//! camelCase field names to match the store's JSON contract.

pub mod alert;
pub mod counter;
pub mod page;
pub mod site;
pub mod snapshot;
pub mod version;

pub use alert::{AlertSeverity, AlertStatus, WorkspaceAlert};
pub use counter::CounterDoc;
pub use page::{Block, HeaderMode, Page, PageStatus, Seo};
pub use site::Site;
pub use snapshot::{SiteSnapshot, SnapshotEntry};
pub use version::PageVersion;
