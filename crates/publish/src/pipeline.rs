//! The publishing pipeline facade.
//!
//! One entry point per operation, each with the same shape: admission
//! (rate limit, then workspace quota), the operation's write sequence,
//! then post-write bookkeeping (domain event, cache invalidation, alert
//! settlement). Handlers talk to this type only; the components under it
//! stay individually testable.

use std::sync::Arc;

use serde::Serialize;

use folio_core::actions::PipelineAction;
use folio_core::checks::ValidationCheck;
use folio_core::ids::Clock;
use folio_core::model::{AlertStatus, Page, PageVersion, Site, SiteSnapshot, WorkspaceAlert};
use folio_core::types::{DocId, Timestamp};
use folio_events::bus::event_types;
use folio_events::{DomainEvent, EffectQueue, EventBus};
use folio_store::{AlertStore, ContentStore, CounterStore};

use crate::alerts::AlertSink;
use crate::error::PipelineError;
use crate::gate::{BlockValidator, PrePublishGate, UrlProber};
use crate::invalidation::{derive_invalidation, CacheInvalidator, CachePurger, InvalidationSet};
use crate::limiter::RateLimiter;
use crate::quota::QuotaEnforcer;
use crate::tree::PageTreeManager;
use crate::writer::SnapshotWriter;

/// Resolved identity of one request: the tenant boundary plus the acting
/// user. Handlers build this from the route and the auth headers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub workspace_id: DocId,
    pub site_id: DocId,
    pub page_id: DocId,
    pub actor_user_id: DocId,
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub version_id: DocId,
    pub site_snapshot_id: DocId,
    pub published_at: Timestamp,
    pub published_by: DocId,
    pub checks: Vec<ValidationCheck>,
    /// `None` when the purge could not be queued; the content itself is
    /// out regardless.
    pub cache_invalidation: Option<InvalidationSet>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpublishReceipt {
    pub site_snapshot_id: DocId,
    pub unpublished_at: Timestamp,
    pub unpublished_by: DocId,
    pub cache_invalidation: Option<InvalidationSet>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackReceipt {
    pub source_version_id: DocId,
    pub published_version_id: DocId,
    pub site_snapshot_id: DocId,
    pub rolled_back_at: Timestamp,
    pub rolled_back_by: DocId,
    pub cache_invalidation: Option<InvalidationSet>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Injectable seams the pipeline is assembled from. Production wiring
/// passes the real store three times; tests swap individual seams.
pub struct PipelineDeps {
    pub content: Arc<dyn ContentStore>,
    pub counters: Arc<dyn CounterStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub prober: Arc<dyn UrlProber>,
    pub blocks: Arc<dyn BlockValidator>,
    pub purger: Arc<dyn CachePurger>,
    pub effects: EffectQueue,
    pub bus: Arc<EventBus>,
    pub clock: Arc<dyn Clock>,
}

pub struct PublishPipeline {
    store: Arc<dyn ContentStore>,
    alert_store: Arc<dyn AlertStore>,
    limiter: RateLimiter,
    quota: QuotaEnforcer,
    gate: PrePublishGate,
    writer: SnapshotWriter,
    tree: PageTreeManager,
    invalidator: CacheInvalidator,
    alerts: AlertSink,
    bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
}

impl PublishPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self {
            limiter: RateLimiter::new(Arc::clone(&deps.counters), Arc::clone(&deps.clock)),
            quota: QuotaEnforcer::new(deps.counters, Arc::clone(&deps.clock)),
            gate: PrePublishGate::new(deps.prober, deps.blocks),
            writer: SnapshotWriter::new(Arc::clone(&deps.content), Arc::clone(&deps.clock)),
            tree: PageTreeManager::new(Arc::clone(&deps.content), Arc::clone(&deps.clock)),
            invalidator: CacheInvalidator::new(deps.purger, deps.effects),
            alerts: AlertSink::new(Arc::clone(&deps.alerts), Arc::clone(&deps.clock)),
            store: deps.content,
            alert_store: deps.alerts,
            bus: deps.bus,
            clock: deps.clock,
        }
    }

    // -- publish ------------------------------------------------------------

    pub async fn publish(&self, ctx: &RequestContext) -> Result<PublishReceipt, PipelineError> {
        let action = PipelineAction::Publish;
        self.limiter
            .check_and_consume(&ctx.workspace_id, &ctx.actor_user_id, action)
            .await?;
        self.quota
            .check_and_consume(&ctx.workspace_id, action)
            .await?;

        let result = self.publish_admitted(ctx).await;
        self.settle(ctx, action, &result).await;
        result
    }

    async fn publish_admitted(
        &self,
        ctx: &RequestContext,
    ) -> Result<PublishReceipt, PipelineError> {
        let (site, page) = self.load_page_and_site(ctx).await?;

        let report = self.gate.run(&page).await;
        if !report.valid {
            return Err(PipelineError::ValidationFailed(report));
        }

        let write = self
            .writer
            .publish(&site, &page, &ctx.actor_user_id)
            .await?;

        let cache = self.invalidator.dispatch(derive_invalidation(
            &site.id,
            &site.slug,
            &write.page,
            &write.affected_pages,
        ));

        self.bus.publish(
            DomainEvent::new(event_types::PAGE_PUBLISHED, &ctx.workspace_id, &ctx.site_id)
                .with_page(&ctx.page_id)
                .with_actor(&ctx.actor_user_id)
                .with_payload(serde_json::json!({
                    "versionId": &write.version.id,
                    "siteSnapshotId": &write.snapshot.id,
                })),
        );

        Ok(PublishReceipt {
            version_id: write.version.id,
            site_snapshot_id: write.snapshot.id,
            published_at: write.version.published_at,
            published_by: write.version.published_by,
            checks: report.checks,
            cache_invalidation: cache,
        })
    }

    // -- unpublish ----------------------------------------------------------

    pub async fn unpublish(
        &self,
        ctx: &RequestContext,
    ) -> Result<UnpublishReceipt, PipelineError> {
        let action = PipelineAction::Unpublish;
        self.limiter
            .check_and_consume(&ctx.workspace_id, &ctx.actor_user_id, action)
            .await?;
        self.quota
            .check_and_consume(&ctx.workspace_id, action)
            .await?;

        let result = self.unpublish_admitted(ctx).await;
        self.settle(ctx, action, &result).await;
        result
    }

    async fn unpublish_admitted(
        &self,
        ctx: &RequestContext,
    ) -> Result<UnpublishReceipt, PipelineError> {
        let (site, page) = self.load_page_and_site(ctx).await?;
        if !page.status.is_published() {
            return Err(PipelineError::conflict("page is not published"));
        }

        let write = self
            .writer
            .unpublish(&site, &page, &ctx.actor_user_id)
            .await?;

        let cache = self.invalidator.dispatch(derive_invalidation(
            &site.id,
            &site.slug,
            &write.page,
            &write.affected_pages,
        ));

        self.bus.publish(
            DomainEvent::new(
                event_types::PAGE_UNPUBLISHED,
                &ctx.workspace_id,
                &ctx.site_id,
            )
            .with_page(&ctx.page_id)
            .with_actor(&ctx.actor_user_id)
            .with_payload(serde_json::json!({
                "siteSnapshotId": &write.snapshot.id,
            })),
        );

        Ok(UnpublishReceipt {
            site_snapshot_id: write.snapshot.id,
            unpublished_at: write.snapshot.published_at,
            unpublished_by: write.snapshot.published_by,
            cache_invalidation: cache,
        })
    }

    // -- rollback -----------------------------------------------------------

    pub async fn rollback(
        &self,
        ctx: &RequestContext,
        version_id: &str,
    ) -> Result<RollbackReceipt, PipelineError> {
        let action = PipelineAction::Rollback;
        self.limiter
            .check_and_consume(&ctx.workspace_id, &ctx.actor_user_id, action)
            .await?;
        self.quota
            .check_and_consume(&ctx.workspace_id, action)
            .await?;

        let result = self.rollback_admitted(ctx, version_id).await;
        self.settle(ctx, action, &result).await;
        result
    }

    async fn rollback_admitted(
        &self,
        ctx: &RequestContext,
        version_id: &str,
    ) -> Result<RollbackReceipt, PipelineError> {
        let (site, page) = self.load_page_and_site(ctx).await?;
        if !page.status.is_published() {
            return Err(PipelineError::conflict("page is not published"));
        }

        let source = self
            .store
            .get_page_version(version_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("page version", version_id.to_string()))?;
        // A version of some other page is indistinguishable from a missing
        // one as far as this page is concerned.
        if source.page_id != ctx.page_id {
            return Err(PipelineError::not_found(
                "page version",
                version_id.to_string(),
            ));
        }

        let write = self
            .writer
            .rollback(&site, &page, &source, &ctx.actor_user_id)
            .await?;

        let cache = self.invalidator.dispatch(derive_invalidation(
            &site.id,
            &site.slug,
            &write.page,
            &write.affected_pages,
        ));

        self.bus.publish(
            DomainEvent::new(
                event_types::PAGE_ROLLED_BACK,
                &ctx.workspace_id,
                &ctx.site_id,
            )
            .with_page(&ctx.page_id)
            .with_actor(&ctx.actor_user_id)
            .with_payload(serde_json::json!({
                "sourceVersionId": &source.id,
                "versionId": &write.version.id,
                "siteSnapshotId": &write.snapshot.id,
            })),
        );

        Ok(RollbackReceipt {
            source_version_id: source.id,
            published_version_id: write.version.id,
            site_snapshot_id: write.snapshot.id,
            rolled_back_at: write.version.published_at,
            rolled_back_by: write.version.published_by,
            cache_invalidation: cache,
        })
    }

    // -- tree ---------------------------------------------------------------

    pub async fn move_page(
        &self,
        ctx: &RequestContext,
        new_parent_id: Option<&str>,
    ) -> Result<Page, PipelineError> {
        self.authorize_site(&ctx.workspace_id, &ctx.site_id).await?;
        let moved = self.tree.move_page(ctx, new_parent_id).await?;

        self.bus.publish(
            DomainEvent::new(event_types::PAGE_MOVED, &ctx.workspace_id, &ctx.site_id)
                .with_page(&ctx.page_id)
                .with_actor(&ctx.actor_user_id)
                .with_payload(serde_json::json!({
                    "newParentId": new_parent_id,
                    "path": &moved.path,
                })),
        );

        Ok(moved)
    }

    pub async fn delete_page(&self, ctx: &RequestContext) -> Result<Vec<DocId>, PipelineError> {
        self.authorize_site(&ctx.workspace_id, &ctx.site_id).await?;
        let deleted = self.tree.delete_page(ctx).await?;

        self.bus.publish(
            DomainEvent::new(event_types::PAGE_DELETED, &ctx.workspace_id, &ctx.site_id)
                .with_page(&ctx.page_id)
                .with_actor(&ctx.actor_user_id)
                .with_payload(serde_json::json!({
                    "pageIds": &deleted,
                })),
        );

        Ok(deleted)
    }

    // -- history and alerts -------------------------------------------------

    pub async fn list_page_versions(
        &self,
        workspace_id: &str,
        site_id: &str,
        page_id: &str,
    ) -> Result<Vec<PageVersion>, PipelineError> {
        self.authorize_site(workspace_id, site_id).await?;
        let versions = self.store.list_page_versions(page_id).await?;
        Ok(versions
            .into_iter()
            .filter(|v| v.site_id == site_id)
            .collect())
    }

    pub async fn list_site_snapshots(
        &self,
        workspace_id: &str,
        site_id: &str,
    ) -> Result<Vec<SiteSnapshot>, PipelineError> {
        self.authorize_site(workspace_id, site_id).await?;
        Ok(self.store.list_site_snapshots(site_id).await?)
    }

    pub async fn list_alerts(
        &self,
        workspace_id: &str,
        status: Option<AlertStatus>,
    ) -> Result<Vec<WorkspaceAlert>, PipelineError> {
        Ok(self.alert_store.list_alerts(workspace_id, status).await?)
    }

    /// Manually resolve one alert. The listing lookup doubles as the
    /// tenancy check: an alert outside the workspace is simply not found.
    pub async fn resolve_alert(
        &self,
        workspace_id: &str,
        alert_id: &str,
        actor_user_id: &str,
        resolution: Option<String>,
    ) -> Result<(), PipelineError> {
        let alerts = self.alert_store.list_alerts(workspace_id, None).await?;
        let Some(alert) = alerts.iter().find(|a| a.id == alert_id) else {
            return Err(PipelineError::not_found("alert", alert_id.to_string()));
        };
        if !alert.is_open() {
            return Err(PipelineError::conflict("alert is already resolved"));
        }

        let resolution = resolution.unwrap_or_else(|| format!("resolved by {actor_user_id}"));
        self.alert_store
            .resolve_alert(alert_id, actor_user_id, &resolution, self.clock.now())
            .await?;
        Ok(())
    }

    // -- shared -------------------------------------------------------------

    async fn authorize_site(
        &self,
        workspace_id: &str,
        site_id: &str,
    ) -> Result<Site, PipelineError> {
        let site = self
            .store
            .get_site(site_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("site", site_id.to_string()))?;
        if site.workspace_id != workspace_id {
            return Err(PipelineError::Forbidden(format!(
                "site {site_id} does not belong to workspace {workspace_id}"
            )));
        }
        Ok(site)
    }

    async fn load_page_and_site(
        &self,
        ctx: &RequestContext,
    ) -> Result<(Site, Page), PipelineError> {
        let site = self.authorize_site(&ctx.workspace_id, &ctx.site_id).await?;
        let page = self
            .store
            .get_page(&ctx.site_id, &ctx.page_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("page", ctx.page_id.clone()))?;
        Ok((site, page))
    }

    /// Post-operation alert bookkeeping: success clears the page's open
    /// alerts, failure records one. Admission refusals never reach the
    /// sink.
    async fn settle<T>(
        &self,
        ctx: &RequestContext,
        action: PipelineAction,
        result: &Result<T, PipelineError>,
    ) {
        match result {
            Ok(_) => self.alerts.resolve_open_for_page(ctx, action).await,
            Err(err) => self.alerts.record_failure(ctx, action, err).await,
        }
    }
}
