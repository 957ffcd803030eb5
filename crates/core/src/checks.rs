//! Pre-publish check identifiers and report types.
//!
//! A page must clear every check before the pipeline writes anything.
//! The pure field checks live here; checks that need I/O (image probing,
//! block schema validation) run in the publish crate and feed the same
//! report shape.

use serde::{Deserialize, Serialize};

use crate::model::page::Page;
use crate::slug;

// ---------------------------------------------------------------------------
// Check identifiers
// ---------------------------------------------------------------------------

/// Page title present and non-blank.
pub const CHECK_TITLE: &str = "title";
/// Slug present and in normalized form.
pub const CHECK_SLUG: &str = "slug";
/// SEO payload well-formed as a whole.
pub const CHECK_SEO: &str = "seo";
/// SEO meta title present.
pub const CHECK_SEO_TITLE: &str = "seo-title";
/// SEO meta description present.
pub const CHECK_SEO_DESCRIPTION: &str = "seo-description";
/// Open Graph image present and reachable.
pub const CHECK_OG_IMAGE: &str = "og-image";
/// Page has at least one content block.
pub const CHECK_BLOCKS: &str = "blocks";
/// Every block passes schema validation.
pub const CHECK_BLOCK_SCHEMA: &str = "block-schema";

/// Every check the gate runs, in report order.
pub const ALL_CHECKS: &[&str] = &[
    CHECK_TITLE,
    CHECK_SLUG,
    CHECK_SEO,
    CHECK_SEO_TITLE,
    CHECK_SEO_DESCRIPTION,
    CHECK_OG_IMAGE,
    CHECK_BLOCKS,
    CHECK_BLOCK_SCHEMA,
];

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// Outcome of one pre-publish check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub id: String,
    pub label: String,
    pub status: CheckStatus,
    /// Human-readable explanation, set on failures.
    pub message: Option<String>,
}

impl ValidationCheck {
    pub fn pass(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            status: CheckStatus::Pass,
            message: None,
        }
    }

    pub fn fail(id: &str, label: &str, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            status: CheckStatus::Fail,
            message: Some(message.into()),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// Full gate outcome. The gate always runs every check, so a failing
/// report still lists each check with its individual status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    pub fn from_checks(checks: Vec<ValidationCheck>) -> Self {
        let valid = checks.iter().all(ValidationCheck::passed);
        Self { valid, checks }
    }

    /// Ids of the checks that failed, in report order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.passed())
            .map(|c| c.id.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Pure field checks
// ---------------------------------------------------------------------------

pub fn check_title(page: &Page) -> ValidationCheck {
    if page.title.trim().is_empty() {
        ValidationCheck::fail(CHECK_TITLE, "Page title", "Page title is empty")
    } else {
        ValidationCheck::pass(CHECK_TITLE, "Page title")
    }
}

pub fn check_slug(page: &Page) -> ValidationCheck {
    if page.slug.is_empty() {
        ValidationCheck::fail(CHECK_SLUG, "Page slug", "Page slug is empty")
    } else if !slug::is_normalized(&page.slug) {
        ValidationCheck::fail(
            CHECK_SLUG,
            "Page slug",
            format!(
                "Slug {:?} is not in normalized form (expected {:?})",
                page.slug,
                slug::normalize_slug(&page.slug)
            ),
        )
    } else {
        ValidationCheck::pass(CHECK_SLUG, "Page slug")
    }
}

pub fn check_seo_title(page: &Page) -> ValidationCheck {
    match page.seo.meta_title.as_deref() {
        Some(title) if !title.trim().is_empty() => {
            ValidationCheck::pass(CHECK_SEO_TITLE, "SEO title")
        }
        _ => ValidationCheck::fail(CHECK_SEO_TITLE, "SEO title", "SEO meta title is missing"),
    }
}

pub fn check_seo_description(page: &Page) -> ValidationCheck {
    match page.seo.meta_description.as_deref() {
        Some(desc) if !desc.trim().is_empty() => {
            ValidationCheck::pass(CHECK_SEO_DESCRIPTION, "SEO description")
        }
        _ => ValidationCheck::fail(
            CHECK_SEO_DESCRIPTION,
            "SEO description",
            "SEO meta description is missing",
        ),
    }
}

pub fn check_has_blocks(page: &Page) -> ValidationCheck {
    if page.blocks.is_empty() {
        ValidationCheck::fail(CHECK_BLOCKS, "Content blocks", "Page has no content blocks")
    } else {
        ValidationCheck::pass(CHECK_BLOCKS, "Content blocks")
    }
}
