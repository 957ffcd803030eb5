//! Cache invalidation dispatcher.
//!
//! Every publish, unpublish, and rollback changes what the live surface
//! serves, so the CDN entries for the affected pages have to go. The
//! dispatcher derives the tag and path sets from the pages a write
//! touched and hands the purge to the effect queue; the write itself
//! never waits on the CDN.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use folio_core::model::Page;
use folio_core::path::{live_page_path, live_site_path, normalize_public_path, preview_path};
use folio_events::{Effect, EffectError, EffectQueue};

/// Cache entries to drop, as surrogate tags and concrete request paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationSet {
    pub tags: Vec<String>,
    pub paths: Vec<String>,
}

impl InvalidationSet {
    /// Build a set, sorted and deduplicated so retries and logs are stable.
    pub fn from_parts(mut tags: Vec<String>, mut paths: Vec<String>) -> Self {
        tags.sort();
        tags.dedup();
        paths.sort();
        paths.dedup();
        Self { tags, paths }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.paths.is_empty()
    }
}

/// Derive the invalidation set for a write that changed `target` while
/// `affected` pages (target included) remain on or just left the surface.
pub fn derive_invalidation(
    site_id: &str,
    site_slug: &str,
    target: &Page,
    affected: &[Page],
) -> InvalidationSet {
    let mut tags = vec![
        format!("site:{site_id}"),
        format!("site-slug:{site_slug}"),
    ];
    let mut paths = vec![live_site_path(site_slug)];

    for page in affected {
        tags.push(format!("page:{}", page.id));
        tags.push(format!("path:{}", normalize_public_path(&page.path)));
        paths.push(live_page_path(site_slug, &page.path));
    }

    // The target's own entries, in case the write dropped it from the
    // affected set entirely.
    tags.push(format!("page:{}", target.id));
    tags.push(format!("path:{}", normalize_public_path(&target.path)));
    paths.push(live_page_path(site_slug, &target.path));
    paths.push(preview_path(site_id, &target.id));

    InvalidationSet::from_parts(tags, paths)
}

// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PurgeError(pub String);

/// Seam to the CDN or edge cache.
#[async_trait::async_trait]
pub trait CachePurger: Send + Sync {
    async fn purge(&self, set: &InvalidationSet) -> Result<(), PurgeError>;
}

/// Purger that only logs. Stands in until an edge provider is wired up;
/// downstream consumers can also watch the log stream.
pub struct LoggingPurger;

#[async_trait::async_trait]
impl CachePurger for LoggingPurger {
    async fn purge(&self, set: &InvalidationSet) -> Result<(), PurgeError> {
        tracing::info!(
            tags = set.tags.len(),
            paths = set.paths.len(),
            "Cache purge dispatched"
        );
        tracing::debug!(tags = ?set.tags, paths = ?set.paths, "Cache purge detail");
        Ok(())
    }
}

// ---------------------------------------------------------------------------

pub struct CacheInvalidator {
    purger: Arc<dyn CachePurger>,
    effects: EffectQueue,
}

impl CacheInvalidator {
    pub fn new(purger: Arc<dyn CachePurger>, effects: EffectQueue) -> Self {
        Self { purger, effects }
    }

    /// Queue a purge for `set`. Returns the set back when the purge was
    /// accepted, `None` when the queue refused it; the caller reports
    /// that to the client rather than failing the publish.
    pub fn dispatch(&self, set: InvalidationSet) -> Option<InvalidationSet> {
        if set.is_empty() {
            return Some(set);
        }
        let purger = Arc::clone(&self.purger);
        let payload = set.clone();
        let effect = Effect::new("cache purge", move || {
            let purger = Arc::clone(&purger);
            let set = payload.clone();
            Box::pin(async move {
                purger
                    .purge(&set)
                    .await
                    .map_err(|e| EffectError(e.to_string()))
            })
        });
        if self.effects.enqueue(effect) {
            Some(set)
        } else {
            None
        }
    }
}
