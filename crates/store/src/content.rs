//! The content store seam: pages, sites, versions, snapshots.

use async_trait::async_trait;

use folio_core::model::{Page, PageVersion, Site, SiteSnapshot};

use crate::error::StoreError;

/// Everything the pipeline asks of the document store.
///
/// The store offers no multi-document transactions. Callers that need a
/// consistent outcome across documents must order their writes so that a
/// failure partway leaves recoverable state (history records first,
/// pointer flips last).
#[async_trait]
pub trait ContentStore: Send + Sync {
    // -- pages --------------------------------------------------------------

    /// Fetch one page of a site. `None` when the page does not exist or
    /// belongs to a different site.
    async fn get_page(&self, site_id: &str, page_id: &str) -> Result<Option<Page>, StoreError>;

    /// Persist a draft-side mutation of a page (tree moves, restores).
    async fn save_draft_page(&self, page: &Page) -> Result<(), StoreError>;

    /// Persist a full page document including publish bookkeeping.
    async fn save_page(&self, page: &Page) -> Result<(), StoreError>;

    /// All pages of a site, draft and published, in stable order.
    async fn list_site_pages(&self, site_id: &str) -> Result<Vec<Page>, StoreError>;

    /// Delete a page document. Returns `false` when it was already gone.
    async fn delete_page(&self, site_id: &str, page_id: &str) -> Result<bool, StoreError>;

    // -- sites --------------------------------------------------------------

    async fn get_site(&self, site_id: &str) -> Result<Option<Site>, StoreError>;

    /// Update an existing site document. Errors with `NotFound` when the
    /// site does not exist; sites are never created through this seam.
    async fn update_site(&self, site: &Site) -> Result<(), StoreError>;

    // -- page versions ------------------------------------------------------

    async fn get_page_version(&self, version_id: &str)
        -> Result<Option<PageVersion>, StoreError>;

    /// Write a version record, keyed by its id. Writing the same id twice
    /// overwrites in place, so a retried publish attempt cannot duplicate
    /// history.
    async fn create_page_version(&self, version: &PageVersion) -> Result<(), StoreError>;

    /// Version history of one page, newest first.
    async fn list_page_versions(&self, page_id: &str) -> Result<Vec<PageVersion>, StoreError>;

    // -- site snapshots -----------------------------------------------------

    async fn get_site_snapshot(
        &self,
        snapshot_id: &str,
    ) -> Result<Option<SiteSnapshot>, StoreError>;

    /// Write a snapshot record, keyed by its id. Same overwrite semantics
    /// as [`ContentStore::create_page_version`].
    async fn create_site_snapshot(&self, snapshot: &SiteSnapshot) -> Result<(), StoreError>;

    /// Snapshot history of one site, newest first.
    async fn list_site_snapshots(&self, site_id: &str) -> Result<Vec<SiteSnapshot>, StoreError>;

    // -- liveness -----------------------------------------------------------

    /// Cheap round-trip to the backend, for health endpoints.
    async fn health_check(&self) -> Result<(), StoreError>;
}
