//! Page document model.

use serde::{Deserialize, Serialize};

use crate::types::{DocId, Timestamp};

/// Publication state of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PageStatus::Published)
    }
}

/// How the site header renders on this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Site-wide default header.
    Default,
    /// A specific preset referenced by `header_preset_id`.
    Preset,
    /// No header on this page.
    Hidden,
}

impl HeaderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderMode::Default => "default",
            HeaderMode::Preset => "preset",
            HeaderMode::Hidden => "hidden",
        }
    }
}

/// One content block on a page. `props` is an opaque payload owned by the
/// block's renderer; the pipeline only schema-checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: DocId,
    #[serde(rename = "type")]
    pub block_type: String,
    pub props: serde_json::Value,
}

/// SEO metadata carried on a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub og_image_url: Option<String>,
    pub og_image_asset_id: Option<DocId>,
}

/// A page document as stored in the content store.
///
/// `path` is derived state: parent path + "/" + slug, recomputed whenever
/// the page or an ancestor moves. `draft_version` is monotonic and starts
/// at 1; every draft mutation bumps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: DocId,
    pub site_id: DocId,
    pub workspace_id: DocId,
    pub slug: String,
    pub path: String,
    pub parent_page_id: Option<DocId>,
    pub order: i32,
    pub title: String,
    pub seo: Seo,
    pub header_mode: HeaderMode,
    pub header_preset_id: Option<DocId>,
    pub blocks: Vec<Block>,
    pub status: PageStatus,
    pub has_unpublished_changes: bool,
    pub draft_version: i64,
    pub published_version_id: Option<DocId>,
    pub published_snapshot_id: Option<DocId>,
    pub published_at: Option<Timestamp>,
    pub published_by: Option<DocId>,
    pub updated_at: Timestamp,
    pub updated_by: Option<DocId>,
}

impl Page {
    /// Overwrite this page's content fields from a historical snapshot.
    /// Identity, publish bookkeeping, and tree position (parent, slug,
    /// path, order) stay untouched: rollback restores what a page said,
    /// not where it sits. A restored slug could collide with a sibling
    /// created since, so structural fields never roll back.
    pub fn restore_content_from(&mut self, snapshot: &Page) {
        self.title = snapshot.title.clone();
        self.seo = snapshot.seo.clone();
        self.header_mode = snapshot.header_mode;
        self.header_preset_id = snapshot.header_preset_id.clone();
        self.blocks = snapshot.blocks.clone();
    }

    /// The fields [`Page::restore_content_from`] carries, for content
    /// comparison. Two pages equal here render the same body.
    pub fn content_eq(&self, other: &Page) -> bool {
        self.title == other.title
            && self.seo == other.seo
            && self.header_mode == other.header_mode
            && self.header_preset_id == other.header_preset_id
            && self.blocks == other.blocks
    }
}
