//! In-memory store adapter for tests and local development.
//!
//! Backs all three store seams with process-local maps. Not durable and
//! not shared across processes; production deployments use an adapter
//! for the real document store instead.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use folio_core::model::{
    AlertStatus, CounterDoc, Page, PageVersion, Site, SiteSnapshot, WorkspaceAlert,
};
use folio_core::throttle::CounterDecision;
use folio_core::types::{DocId, Timestamp};

use crate::alerts::AlertStore;
use crate::content::ContentStore;
use crate::counters::{CounterStore, CounterTxn, DecideFn};
use crate::error::StoreError;

fn poison_err<T>(_: PoisonError<T>) -> StoreError {
    StoreError::backend("lock poisoned")
}

/// Process-local implementation of every store seam.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<HashMap<DocId, Page>>,
    sites: RwLock<HashMap<DocId, Site>>,
    versions: RwLock<HashMap<DocId, PageVersion>>,
    snapshots: RwLock<HashMap<DocId, SiteSnapshot>>,
    alerts: RwLock<HashMap<DocId, WorkspaceAlert>>,
    // Mutex, not RwLock: counter transactions hold the lock across their
    // read-decide-write cycle.
    counters: Mutex<HashMap<String, CounterDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a site document. Sites are created by the provisioning
    /// surface, not by this pipeline, so only the adapter exposes this.
    pub fn insert_site(&self, site: Site) {
        if let Ok(mut sites) = self.sites.write() {
            sites.insert(site.id.clone(), site);
        }
    }

    /// Seed a page document. Page creation belongs to the editor surface;
    /// tests and dev bootstrapping use this.
    pub fn insert_page(&self, page: Page) {
        if let Ok(mut pages) = self.pages.write() {
            pages.insert(page.id.clone(), page);
        }
    }

    /// Read a raw counter, for assertions.
    pub fn counter(&self, key: &str) -> Option<CounterDoc> {
        self.counters.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_page(&self, site_id: &str, page_id: &str) -> Result<Option<Page>, StoreError> {
        let pages = self.pages.read().map_err(poison_err)?;
        Ok(pages
            .get(page_id)
            .filter(|page| page.site_id == site_id)
            .cloned())
    }

    async fn save_draft_page(&self, page: &Page) -> Result<(), StoreError> {
        let mut pages = self.pages.write().map_err(poison_err)?;
        pages.insert(page.id.clone(), page.clone());
        Ok(())
    }

    async fn save_page(&self, page: &Page) -> Result<(), StoreError> {
        let mut pages = self.pages.write().map_err(poison_err)?;
        pages.insert(page.id.clone(), page.clone());
        Ok(())
    }

    async fn list_site_pages(&self, site_id: &str) -> Result<Vec<Page>, StoreError> {
        let pages = self.pages.read().map_err(poison_err)?;
        let mut out: Vec<Page> = pages
            .values()
            .filter(|page| page.site_id == site_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn delete_page(&self, site_id: &str, page_id: &str) -> Result<bool, StoreError> {
        let mut pages = self.pages.write().map_err(poison_err)?;
        let belongs = pages
            .get(page_id)
            .is_some_and(|page| page.site_id == site_id);
        if belongs {
            pages.remove(page_id);
        }
        Ok(belongs)
    }

    async fn get_site(&self, site_id: &str) -> Result<Option<Site>, StoreError> {
        let sites = self.sites.read().map_err(poison_err)?;
        Ok(sites.get(site_id).cloned())
    }

    async fn update_site(&self, site: &Site) -> Result<(), StoreError> {
        let mut sites = self.sites.write().map_err(poison_err)?;
        if !sites.contains_key(&site.id) {
            return Err(StoreError::not_found("site", site.id.clone()));
        }
        sites.insert(site.id.clone(), site.clone());
        Ok(())
    }

    async fn get_page_version(
        &self,
        version_id: &str,
    ) -> Result<Option<PageVersion>, StoreError> {
        let versions = self.versions.read().map_err(poison_err)?;
        Ok(versions.get(version_id).cloned())
    }

    async fn create_page_version(&self, version: &PageVersion) -> Result<(), StoreError> {
        let mut versions = self.versions.write().map_err(poison_err)?;
        versions.insert(version.id.clone(), version.clone());
        Ok(())
    }

    async fn list_page_versions(&self, page_id: &str) -> Result<Vec<PageVersion>, StoreError> {
        let versions = self.versions.read().map_err(poison_err)?;
        let mut out: Vec<PageVersion> = versions
            .values()
            .filter(|version| version.page_id == page_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(out)
    }

    async fn get_site_snapshot(
        &self,
        snapshot_id: &str,
    ) -> Result<Option<SiteSnapshot>, StoreError> {
        let snapshots = self.snapshots.read().map_err(poison_err)?;
        Ok(snapshots.get(snapshot_id).cloned())
    }

    async fn create_site_snapshot(&self, snapshot: &SiteSnapshot) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().map_err(poison_err)?;
        snapshots.insert(snapshot.id.clone(), snapshot.clone());
        Ok(())
    }

    async fn list_site_snapshots(&self, site_id: &str) -> Result<Vec<SiteSnapshot>, StoreError> {
        let snapshots = self.snapshots.read().map_err(poison_err)?;
        let mut out: Vec<SiteSnapshot> = snapshots
            .values()
            .filter(|snapshot| snapshot.site_id == site_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(out)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.pages.read().map_err(poison_err)?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn counter_transaction(
        &self,
        key: &str,
        decide: DecideFn<'_>,
    ) -> Result<CounterTxn, StoreError> {
        // Lock held across read, decide, and write: racing callers on any
        // key serialize here.
        let mut counters = self.counters.lock().map_err(poison_err)?;
        let before = counters.get(key).cloned();
        match decide(before.as_ref()) {
            CounterDecision::Admit(doc) => {
                counters.insert(key.to_string(), doc.clone());
                Ok(CounterTxn {
                    before,
                    committed: Some(doc),
                })
            }
            CounterDecision::Refuse => Ok(CounterTxn {
                before,
                committed: None,
            }),
        }
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn create_alert(&self, alert: &WorkspaceAlert) -> Result<(), StoreError> {
        let mut alerts = self.alerts.write().map_err(poison_err)?;
        alerts.insert(alert.id.clone(), alert.clone());
        Ok(())
    }

    async fn list_alerts(
        &self,
        workspace_id: &str,
        status: Option<AlertStatus>,
    ) -> Result<Vec<WorkspaceAlert>, StoreError> {
        let alerts = self.alerts.read().map_err(poison_err)?;
        let mut out: Vec<WorkspaceAlert> = alerts
            .values()
            .filter(|alert| alert.workspace_id == workspace_id)
            .filter(|alert| status.is_none_or(|wanted| alert.status == wanted))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn open_alerts_for_page(
        &self,
        page_id: &str,
    ) -> Result<Vec<WorkspaceAlert>, StoreError> {
        let alerts = self.alerts.read().map_err(poison_err)?;
        let mut out: Vec<WorkspaceAlert> = alerts
            .values()
            .filter(|alert| alert.page_id == page_id && alert.is_open())
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn resolve_alert(
        &self,
        alert_id: &str,
        resolved_by: &str,
        resolution: &str,
        at: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut alerts = self.alerts.write().map_err(poison_err)?;
        match alerts.get_mut(alert_id) {
            Some(alert) if alert.is_open() => {
                alert.status = AlertStatus::Resolved;
                alert.resolved_at = Some(at);
                alert.resolved_by = Some(resolved_by.to_string());
                alert.resolution = Some(resolution.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use folio_core::model::{AlertSeverity, HeaderMode, PageStatus, Seo};
    use folio_core::throttle::decide_window;

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn page(id: &str, site_id: &str, path: &str) -> Page {
        Page {
            id: id.to_string(),
            site_id: site_id.to_string(),
            workspace_id: "ws_1".to_string(),
            slug: path.rsplit('/').next().unwrap_or("").to_string(),
            path: path.to_string(),
            parent_page_id: None,
            order: 0,
            title: "Title".to_string(),
            seo: Seo::default(),
            header_mode: HeaderMode::Default,
            header_preset_id: None,
            blocks: vec![],
            status: PageStatus::Draft,
            has_unpublished_changes: true,
            draft_version: 1,
            published_version_id: None,
            published_snapshot_id: None,
            published_at: None,
            published_by: None,
            updated_at: ts(0),
            updated_by: None,
        }
    }

    fn site(id: &str) -> Site {
        Site {
            id: id.to_string(),
            workspace_id: "ws_1".to_string(),
            name: "Site".to_string(),
            slug: "site".to_string(),
            template_id: None,
            theme: serde_json::json!({}),
            published_snapshot_id: None,
            published_at: None,
            published_by: None,
            has_unpublished_changes: true,
            updated_at: ts(0),
        }
    }

    fn version(id: &str, page_id: &str, at: Timestamp) -> PageVersion {
        PageVersion {
            id: id.to_string(),
            site_id: "site_1".to_string(),
            page_id: page_id.to_string(),
            workspace_id: "ws_1".to_string(),
            version: 1,
            source_draft_version: 1,
            source_version_id: None,
            rollback: false,
            snapshot: None,
            content_hash: "0".repeat(64),
            published_at: at,
            published_by: "user_1".to_string(),
        }
    }

    fn alert(id: &str, page_id: &str, at: Timestamp) -> WorkspaceAlert {
        WorkspaceAlert {
            id: id.to_string(),
            workspace_id: "ws_1".to_string(),
            site_id: "site_1".to_string(),
            page_id: page_id.to_string(),
            category: "publish".to_string(),
            operation: "publish".to_string(),
            reason_code: "store_failure".to_string(),
            message: "boom".to_string(),
            severity: AlertSeverity::Critical,
            status: AlertStatus::Open,
            actor_user_id: "user_1".to_string(),
            metadata: serde_json::json!({}),
            created_at: at,
            resolved_at: None,
            resolved_by: None,
            resolution: None,
        }
    }

    // -- content ------------------------------------------------------------

    #[tokio::test]
    async fn page_reads_are_scoped_to_site() {
        let store = MemoryStore::new();
        store.insert_page(page("page_1", "site_1", "/home"));

        let hit = store.get_page("site_1", "page_1").await.unwrap();
        assert!(hit.is_some());

        let miss = store.get_page("site_2", "page_1").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn list_site_pages_is_path_ordered() {
        let store = MemoryStore::new();
        store.insert_page(page("page_b", "site_1", "/docs"));
        store.insert_page(page("page_a", "site_1", "/about"));
        store.insert_page(page("page_x", "site_2", "/other"));

        let pages = store.list_site_pages("site_1").await.unwrap();
        let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/about", "/docs"]);
    }

    #[tokio::test]
    async fn delete_page_reports_whether_it_existed() {
        let store = MemoryStore::new();
        store.insert_page(page("page_1", "site_1", "/home"));

        assert!(store.delete_page("site_1", "page_1").await.unwrap());
        assert!(!store.delete_page("site_1", "page_1").await.unwrap());
        // wrong site never deletes
        store.insert_page(page("page_2", "site_1", "/a"));
        assert!(!store.delete_page("site_2", "page_2").await.unwrap());
        assert!(store.get_page("site_1", "page_2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_site_requires_existing_document() {
        let store = MemoryStore::new();
        let err = store.update_site(&site("site_1")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "site", .. }));

        store.insert_site(site("site_1"));
        let mut updated = site("site_1");
        updated.published_snapshot_id = Some("snap_1".to_string());
        store.update_site(&updated).await.unwrap();
        let stored = store.get_site("site_1").await.unwrap().unwrap();
        assert_eq!(stored.published_snapshot_id.as_deref(), Some("snap_1"));
    }

    #[tokio::test]
    async fn version_history_is_newest_first() {
        let store = MemoryStore::new();
        store
            .create_page_version(&version("ver_1", "page_1", ts(10)))
            .await
            .unwrap();
        store
            .create_page_version(&version("ver_2", "page_1", ts(20)))
            .await
            .unwrap();
        store
            .create_page_version(&version("ver_3", "page_2", ts(30)))
            .await
            .unwrap();

        let history = store.list_page_versions("page_1").await.unwrap();
        let ids: Vec<&str> = history.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["ver_2", "ver_1"]);
    }

    #[tokio::test]
    async fn rewriting_a_version_id_does_not_duplicate_history() {
        let store = MemoryStore::new();
        let v = version("ver_1", "page_1", ts(10));
        store.create_page_version(&v).await.unwrap();
        store.create_page_version(&v).await.unwrap();
        assert_eq!(store.list_page_versions("page_1").await.unwrap().len(), 1);
    }

    // -- counters -----------------------------------------------------------

    #[tokio::test]
    async fn counter_transaction_commits_admissions_only() {
        let store = MemoryStore::new();
        let now = ts(0);
        let window = std::time::Duration::from_secs(60);

        let decide =
            move |existing: Option<&CounterDoc>| decide_window(existing, now, 2, window);

        let first = store.counter_transaction("rl:k", &decide).await.unwrap();
        assert!(first.admitted());
        assert!(first.before.is_none());

        let second = store.counter_transaction("rl:k", &decide).await.unwrap();
        assert!(second.admitted());

        let third = store.counter_transaction("rl:k", &decide).await.unwrap();
        assert!(!third.admitted());
        assert_eq!(third.before.unwrap().count, 2);
        // refused transaction left the stored count untouched
        assert_eq!(store.counter("rl:k").unwrap().count, 2);
    }

    #[tokio::test]
    async fn racing_counter_transactions_admit_exactly_the_limit() {
        let store = Arc::new(MemoryStore::new());
        let now = ts(0);
        let window = std::time::Duration::from_secs(60);

        let mut handles = Vec::new();
        for _ in 0..15 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let decide =
                    move |existing: Option<&CounterDoc>| decide_window(existing, now, 10, window);
                store
                    .counter_transaction("rl:race", &decide)
                    .await
                    .unwrap()
                    .admitted()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
        assert_eq!(store.counter("rl:race").unwrap().count, 10);
    }

    // -- alerts -------------------------------------------------------------

    #[tokio::test]
    async fn alerts_filter_by_status_and_page() {
        let store = MemoryStore::new();
        store.create_alert(&alert("alr_1", "page_1", ts(10))).await.unwrap();
        store.create_alert(&alert("alr_2", "page_2", ts(20))).await.unwrap();

        assert!(store
            .resolve_alert("alr_1", "user_2", "republished", ts(30))
            .await
            .unwrap());

        let open = store
            .list_alerts("ws_1", Some(AlertStatus::Open))
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "alr_2");

        let all = store.list_alerts("ws_1", None).await.unwrap();
        assert_eq!(all.len(), 2);
        // newest first
        assert_eq!(all[0].id, "alr_2");

        assert!(store.open_alerts_for_page("page_1").await.unwrap().is_empty());
        assert_eq!(store.open_alerts_for_page("page_2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolving_twice_reports_false() {
        let store = MemoryStore::new();
        store.create_alert(&alert("alr_1", "page_1", ts(0))).await.unwrap();

        assert!(store
            .resolve_alert("alr_1", "user_2", "fixed", ts(1))
            .await
            .unwrap());
        assert!(!store
            .resolve_alert("alr_1", "user_2", "fixed again", ts(2))
            .await
            .unwrap());
        assert!(!store
            .resolve_alert("alr_missing", "user_2", "noop", ts(3))
            .await
            .unwrap());

        let resolved = store
            .list_alerts("ws_1", Some(AlertStatus::Resolved))
            .await
            .unwrap();
        assert_eq!(resolved[0].resolution.as_deref(), Some("fixed"));
        assert_eq!(resolved[0].resolved_at, Some(ts(1)));
    }

    #[tokio::test]
    async fn health_check_succeeds_on_fresh_store() {
        let store = MemoryStore::new();
        store.health_check().await.unwrap();
    }
}
