//! Page tree manager.
//!
//! Moves pages within a site's tree and cascades deletes over subtrees.
//! The tree algorithms themselves (descendant walks, cycle guards, path
//! recomputation) are pure functions in `folio_core::tree`; this module
//! adds the store round-trips and the rejection rules. All checks run
//! before the first write, so a refused move leaves the tree untouched.

use std::collections::HashMap;
use std::sync::Arc;

use folio_core::ids::Clock;
use folio_core::model::Page;
use folio_core::path::child_path;
use folio_core::tree::{
    child_count, descendant_ids, recompute_paths, sibling_slug_taken, would_create_cycle, TreeNode,
};
use folio_core::types::DocId;
use folio_store::ContentStore;

use crate::error::PipelineError;
use crate::pipeline::RequestContext;

pub struct PageTreeManager {
    store: Arc<dyn ContentStore>,
    clock: Arc<dyn Clock>,
}

impl PageTreeManager {
    pub fn new(store: Arc<dyn ContentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Re-parent a page. `new_parent_id = None` moves it to the site root.
    /// The moved page gets a new order slot, a draft version bump, and a
    /// recomputed path; descendants get their paths rewritten top-down,
    /// skipping the ones already correct.
    pub async fn move_page(
        &self,
        ctx: &RequestContext,
        new_parent_id: Option<&str>,
    ) -> Result<Page, PipelineError> {
        let page = self
            .store
            .get_page(&ctx.site_id, &ctx.page_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("page", ctx.page_id.clone()))?;

        let new_parent = match new_parent_id {
            Some(parent_id) => Some(
                self.store
                    .get_page(&ctx.site_id, parent_id)
                    .await?
                    .ok_or_else(|| PipelineError::not_found("page", parent_id.to_string()))?,
            ),
            None => None,
        };

        let pages = self.store.list_site_pages(&ctx.site_id).await?;
        let nodes = tree_nodes(&pages);

        if let Some(parent_id) = new_parent_id {
            if parent_id == page.id {
                return Err(PipelineError::conflict(
                    "a page cannot be its own parent",
                ));
            }
            if would_create_cycle(&nodes, &page.id, parent_id) {
                return Err(PipelineError::conflict(
                    "cannot move a page under one of its own descendants",
                ));
            }
        }

        if sibling_slug_taken(&nodes, new_parent_id, &page.slug, &page.id) {
            return Err(PipelineError::conflict(format!(
                "slug '{}' is already used under the target parent",
                page.slug
            )));
        }

        let now = self.clock.now();
        let parent_changed = page.parent_page_id.as_deref() != new_parent_id;
        let new_parent_path = new_parent.as_ref().map(|p| p.path.as_str());

        // changed descendant paths, parents before children
        let path_changes = recompute_paths(&nodes, &page.id, new_parent_path);

        let mut moved = page.clone();
        moved.parent_page_id = new_parent_id.map(str::to_string);
        if parent_changed {
            // append after the existing children of the new parent
            moved.order = child_count(&nodes, new_parent_id, &page.id) as i32;
        }
        moved.path = child_path(new_parent_path, &page.slug);
        moved.draft_version += 1;
        moved.has_unpublished_changes = true;
        moved.updated_at = now;
        moved.updated_by = Some(ctx.actor_user_id.clone());
        self.store.save_draft_page(&moved).await?;

        // Descendant rewrites touch path only; their content did not change,
        // so their draft versions stay put.
        let by_id: HashMap<&str, &Page> = pages.iter().map(|p| (p.id.as_str(), p)).collect();
        let mut rewritten = 0usize;
        for (page_id, new_path) in &path_changes {
            if *page_id == moved.id {
                continue;
            }
            let Some(descendant) = by_id.get(page_id.as_str()) else {
                continue;
            };
            let mut updated = (*descendant).clone();
            updated.path = new_path.clone();
            updated.updated_at = now;
            updated.updated_by = Some(ctx.actor_user_id.clone());
            self.store.save_draft_page(&updated).await?;
            rewritten += 1;
        }

        tracing::info!(
            site_id = %ctx.site_id,
            page_id = %ctx.page_id,
            new_parent_id = new_parent_id.unwrap_or("(root)"),
            path = %moved.path,
            descendants_rewritten = rewritten,
            "Page moved"
        );

        Ok(moved)
    }

    /// Delete a page and its whole subtree, children before parents so an
    /// interrupted cascade never orphans a child under a deleted parent.
    /// Returns the deleted ids in deletion order, the target last.
    pub async fn delete_page(&self, ctx: &RequestContext) -> Result<Vec<DocId>, PipelineError> {
        let page = self
            .store
            .get_page(&ctx.site_id, &ctx.page_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("page", ctx.page_id.clone()))?;

        let pages = self.store.list_site_pages(&ctx.site_id).await?;
        let nodes = tree_nodes(&pages);

        let mut order = descendant_ids(&nodes, &page.id);
        order.reverse();
        order.push(page.id.clone());

        let mut deleted = Vec::with_capacity(order.len());
        for page_id in order {
            if self.store.delete_page(&ctx.site_id, &page_id).await? {
                deleted.push(page_id);
            }
        }

        tracing::info!(
            site_id = %ctx.site_id,
            page_id = %ctx.page_id,
            deleted = deleted.len(),
            "Page subtree deleted"
        );

        Ok(deleted)
    }
}

fn tree_nodes(pages: &[Page]) -> Vec<TreeNode> {
    pages
        .iter()
        .map(|page| TreeNode {
            id: page.id.clone(),
            parent_id: page.parent_page_id.clone(),
            slug: page.slug.clone(),
            path: page.path.clone(),
        })
        .collect()
}
