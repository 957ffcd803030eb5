//! Version and snapshot writer.
//!
//! Owns the ordered write sequences behind publish, unpublish, and
//! rollback. The store has no multi-document transactions, so writes go
//! history-first: the immutable version and snapshot records land before
//! any pointer flips. A crash partway leaves orphaned history records
//! (superseded by the next successful publish) rather than pointers at
//! documents that do not exist.

use std::sync::Arc;

use folio_core::hashing::content_hash;
use folio_core::ids::{Clock, IdMint};
use folio_core::model::{Page, PageStatus, PageVersion, Site, SiteSnapshot, SnapshotEntry};
use folio_store::ContentStore;

use crate::error::PipelineError;

/// Result of a publish write sequence.
pub struct PublishWrite {
    pub page: Page,
    pub version: PageVersion,
    pub snapshot: SiteSnapshot,
    pub site: Site,
    /// Pages whose public paths the new snapshot touches, target included.
    pub affected_pages: Vec<Page>,
}

/// Result of an unpublish write sequence.
pub struct UnpublishWrite {
    pub page: Page,
    pub snapshot: SiteSnapshot,
    pub site: Site,
    /// Still-live pages plus the page that just left the surface; its old
    /// public path needs purging too.
    pub affected_pages: Vec<Page>,
}

/// Result of a rollback write sequence.
#[derive(Debug)]
pub struct RollbackWrite {
    pub page: Page,
    pub version: PageVersion,
    pub snapshot: SiteSnapshot,
    pub site: Site,
    pub affected_pages: Vec<Page>,
}

pub struct SnapshotWriter {
    store: Arc<dyn ContentStore>,
    clock: Arc<dyn Clock>,
    mint: IdMint,
}

impl SnapshotWriter {
    pub fn new(store: Arc<dyn ContentStore>, clock: Arc<dyn Clock>) -> Self {
        let mint = IdMint::new(Arc::clone(&clock));
        Self { store, clock, mint }
    }

    /// Publish `page`: freeze a version record, write a site snapshot
    /// containing it, then flip the site and page pointers.
    pub async fn publish(
        &self,
        site: &Site,
        page: &Page,
        actor: &str,
    ) -> Result<PublishWrite, PipelineError> {
        let now = self.clock.now();

        // 1. immutable version record
        let frozen = page.clone();
        let hash = content_hash(&frozen)
            .map_err(|e| PipelineError::internal(format!("content hash failed: {e}")))?;
        let version = PageVersion {
            id: self.mint.page_version_id(&page.id),
            site_id: page.site_id.clone(),
            page_id: page.id.clone(),
            workspace_id: page.workspace_id.clone(),
            version: page.draft_version,
            source_draft_version: page.draft_version,
            source_version_id: None,
            rollback: false,
            snapshot: Some(frozen),
            content_hash: hash,
            published_at: now,
            published_by: actor.to_string(),
        };
        self.store.create_page_version(&version).await?;

        // 2. immutable site snapshot: every other live page plus this one
        let (mut entries, mut affected) = self.other_live_entries(&site.id, &page.id).await?;
        entries.push(SnapshotEntry {
            page_id: page.id.clone(),
            slug: page.slug.clone(),
            version_id: version.id.clone(),
        });
        let snapshot = self
            .write_snapshot(site, entries, now, actor, None)
            .await?;

        // 3. site pointer flip
        let updated_site = self
            .flip_site_pointer(site, &snapshot.id, now, actor, false)
            .await?;

        // 4. page pointer flip and draft bump
        let mut updated_page = page.clone();
        updated_page.status = PageStatus::Published;
        updated_page.has_unpublished_changes = false;
        updated_page.published_version_id = Some(version.id.clone());
        updated_page.published_snapshot_id = Some(snapshot.id.clone());
        updated_page.published_at = Some(now);
        updated_page.published_by = Some(actor.to_string());
        updated_page.draft_version += 1;
        updated_page.updated_at = now;
        updated_page.updated_by = Some(actor.to_string());
        self.store.save_page(&updated_page).await?;

        tracing::info!(
            site_id = %site.id,
            page_id = %page.id,
            version_id = %version.id,
            snapshot_id = %snapshot.id,
            version = version.version,
            "Page published"
        );

        affected.push(updated_page.clone());
        Ok(PublishWrite {
            page: updated_page,
            version,
            snapshot,
            site: updated_site,
            affected_pages: affected,
        })
    }

    /// Unpublish `page`: write a snapshot without it, flip the site
    /// pointer, then clear the page's publish bookkeeping.
    pub async fn unpublish(
        &self,
        site: &Site,
        page: &Page,
        actor: &str,
    ) -> Result<UnpublishWrite, PipelineError> {
        let now = self.clock.now();

        let (entries, mut affected) = self.other_live_entries(&site.id, &page.id).await?;
        let snapshot = self
            .write_snapshot(site, entries, now, actor, None)
            .await?;

        // The draft content is no longer represented on the live surface.
        let updated_site = self
            .flip_site_pointer(site, &snapshot.id, now, actor, true)
            .await?;

        let mut updated_page = page.clone();
        updated_page.status = PageStatus::Draft;
        updated_page.has_unpublished_changes = true;
        updated_page.published_version_id = None;
        updated_page.published_snapshot_id = None;
        updated_page.published_at = None;
        updated_page.published_by = None;
        updated_page.draft_version += 1;
        updated_page.updated_at = now;
        updated_page.updated_by = Some(actor.to_string());
        self.store.save_page(&updated_page).await?;

        tracing::info!(
            site_id = %site.id,
            page_id = %page.id,
            snapshot_id = %snapshot.id,
            "Page unpublished"
        );

        affected.push(updated_page.clone());
        Ok(UnpublishWrite {
            page: updated_page,
            snapshot,
            site: updated_site,
            affected_pages: affected,
        })
    }

    /// Roll `page` back to the payload frozen in `source`: write a fresh
    /// version record carrying the restored content, snapshot it, flip
    /// pointers, and restore the live page's content fields.
    pub async fn rollback(
        &self,
        site: &Site,
        page: &Page,
        source: &PageVersion,
        actor: &str,
    ) -> Result<RollbackWrite, PipelineError> {
        let Some(historical) = source.snapshot.as_ref() else {
            return Err(PipelineError::not_found(
                "page version snapshot",
                source.id.clone(),
            ));
        };

        let now = self.clock.now();

        // Restore content onto the live page; tree position stays put.
        let mut restored = page.clone();
        restored.restore_content_from(historical);

        // 1. fresh version record carrying the restored payload
        let frozen = restored.clone();
        let hash = content_hash(&frozen)
            .map_err(|e| PipelineError::internal(format!("content hash failed: {e}")))?;
        let version = PageVersion {
            id: self.mint.page_version_id(&page.id),
            site_id: page.site_id.clone(),
            page_id: page.id.clone(),
            workspace_id: page.workspace_id.clone(),
            version: page.draft_version,
            source_draft_version: source.version,
            source_version_id: Some(source.id.clone()),
            rollback: true,
            snapshot: Some(frozen),
            content_hash: hash,
            published_at: now,
            published_by: actor.to_string(),
        };
        self.store.create_page_version(&version).await?;

        // 2. snapshot with the restored page live
        let (mut entries, mut affected) = self.other_live_entries(&site.id, &page.id).await?;
        entries.push(SnapshotEntry {
            page_id: page.id.clone(),
            slug: restored.slug.clone(),
            version_id: version.id.clone(),
        });
        let snapshot = self
            .write_snapshot(site, entries, now, actor, Some(source.id.clone()))
            .await?;

        // 3. site pointer flip
        let updated_site = self
            .flip_site_pointer(site, &snapshot.id, now, actor, false)
            .await?;

        // 4. live page: restored content plus fresh publish bookkeeping
        restored.status = PageStatus::Published;
        restored.has_unpublished_changes = false;
        restored.published_version_id = Some(version.id.clone());
        restored.published_snapshot_id = Some(snapshot.id.clone());
        restored.published_at = Some(now);
        restored.published_by = Some(actor.to_string());
        restored.draft_version += 1;
        restored.updated_at = now;
        restored.updated_by = Some(actor.to_string());
        self.store.save_page(&restored).await?;

        tracing::info!(
            site_id = %site.id,
            page_id = %page.id,
            source_version_id = %source.id,
            version_id = %version.id,
            snapshot_id = %snapshot.id,
            "Page rolled back"
        );

        affected.push(restored.clone());
        Ok(RollbackWrite {
            page: restored,
            version,
            snapshot,
            site: updated_site,
            affected_pages: affected,
        })
    }

    // -- shared steps -------------------------------------------------------

    /// Snapshot entries for every live page of the site except `exclude`,
    /// plus the page documents behind them.
    async fn other_live_entries(
        &self,
        site_id: &str,
        exclude_page_id: &str,
    ) -> Result<(Vec<SnapshotEntry>, Vec<Page>), PipelineError> {
        let pages = self.store.list_site_pages(site_id).await?;
        let mut entries = Vec::new();
        let mut live = Vec::new();
        for page in pages {
            if page.id == exclude_page_id || !page.status.is_published() {
                continue;
            }
            let Some(version_id) = page.published_version_id.clone() else {
                continue;
            };
            entries.push(SnapshotEntry {
                page_id: page.id.clone(),
                slug: page.slug.clone(),
                version_id,
            });
            live.push(page);
        }
        Ok((entries, live))
    }

    async fn write_snapshot(
        &self,
        site: &Site,
        entries: Vec<SnapshotEntry>,
        now: folio_core::types::Timestamp,
        actor: &str,
        rollback_from: Option<String>,
    ) -> Result<SiteSnapshot, PipelineError> {
        let snapshot = SiteSnapshot {
            id: self.mint.site_snapshot_id(),
            site_id: site.id.clone(),
            workspace_id: site.workspace_id.clone(),
            template_id: site.template_id.clone(),
            theme: site.theme.clone(),
            pages: entries,
            published_at: now,
            published_by: actor.to_string(),
            rollback_from_version_id: rollback_from,
        };
        self.store.create_site_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    async fn flip_site_pointer(
        &self,
        site: &Site,
        snapshot_id: &str,
        now: folio_core::types::Timestamp,
        actor: &str,
        has_unpublished_changes: bool,
    ) -> Result<Site, PipelineError> {
        let mut updated = site.clone();
        updated.published_snapshot_id = Some(snapshot_id.to_string());
        updated.published_at = Some(now);
        updated.published_by = Some(actor.to_string());
        updated.has_unpublished_changes = has_unpublished_changes;
        updated.updated_at = now;
        self.store.update_site(&updated).await?;
        Ok(updated)
    }
}
