//! The pre-publish validation gate.
//!
//! Runs every check against the draft page and returns the full report;
//! a single failing check blocks the publish before anything is written.
//! Checks never early-exit, so the editor can surface all problems at
//! once. Field checks are pure and live in [`folio_core::checks`]; this
//! module adds the two that need I/O: Open Graph image reachability and
//! block schema validation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use folio_core::checks::{
    self, ValidationCheck, ValidationReport, CHECK_BLOCK_SCHEMA, CHECK_OG_IMAGE, CHECK_SEO,
};
use folio_core::model::{Block, Page};
use folio_core::seo::validate_seo;
use folio_core::types::DocId;

/// HTTP timeout for a single image probe attempt.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// URL probing
// ---------------------------------------------------------------------------

/// Error type for probe attempts that could not produce a verdict.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProbeError(pub String);

/// Answers whether a URL currently serves a success response.
#[async_trait]
pub trait UrlProber: Send + Sync {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError>;
}

/// Probes over HTTP: HEAD first, falling back to GET for servers that
/// reject HEAD outright.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Self {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlProber for HttpProber {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError> {
        let head = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ProbeError(e.to_string()))?;

        let status = head.status();
        if status.is_success() {
            return Ok(true);
        }

        // Some CDNs answer HEAD with 405/501 while serving GET fine.
        if status.as_u16() == 405 || status.as_u16() == 501 {
            let get = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| ProbeError(e.to_string()))?;
            return Ok(get.status().is_success());
        }

        Ok(false)
    }
}

// ---------------------------------------------------------------------------
// Block schema validation
// ---------------------------------------------------------------------------

/// A schema problem found in one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockIssue {
    pub block_id: DocId,
    pub message: String,
}

/// Validates a single block against its type's schema.
#[async_trait]
pub trait BlockValidator: Send + Sync {
    /// Empty result means the block is valid.
    async fn validate(&self, block: &Block) -> Vec<BlockIssue>;
}

/// Structural validator: block ids and types must be present and props
/// must be a JSON object. Type-specific schemas live with the block
/// registry service behind this same trait.
pub struct BasicBlockValidator;

#[async_trait]
impl BlockValidator for BasicBlockValidator {
    async fn validate(&self, block: &Block) -> Vec<BlockIssue> {
        let mut issues = Vec::new();
        if block.id.trim().is_empty() {
            issues.push(BlockIssue {
                block_id: block.id.clone(),
                message: "block id is empty".to_string(),
            });
        }
        if block.block_type.trim().is_empty() {
            issues.push(BlockIssue {
                block_id: block.id.clone(),
                message: "block type is empty".to_string(),
            });
        }
        if !block.props.is_object() {
            issues.push(BlockIssue {
                block_id: block.id.clone(),
                message: "block props must be a JSON object".to_string(),
            });
        }
        issues
    }
}

// ---------------------------------------------------------------------------
// The gate
// ---------------------------------------------------------------------------

pub struct PrePublishGate {
    prober: Arc<dyn UrlProber>,
    blocks: Arc<dyn BlockValidator>,
}

impl PrePublishGate {
    pub fn new(prober: Arc<dyn UrlProber>, blocks: Arc<dyn BlockValidator>) -> Self {
        Self { prober, blocks }
    }

    /// Run every check against `page`. Always returns the full report.
    pub async fn run(&self, page: &Page) -> ValidationReport {
        let mut results = Vec::with_capacity(checks::ALL_CHECKS.len());

        results.push(checks::check_title(page));
        results.push(checks::check_slug(page));
        results.push(self.check_seo_shape(page));
        results.push(checks::check_seo_title(page));
        results.push(checks::check_seo_description(page));
        results.push(self.check_og_image(page).await);
        results.push(checks::check_has_blocks(page));
        results.push(self.check_block_schemas(page).await);

        let report = ValidationReport::from_checks(results);
        if !report.valid {
            tracing::info!(
                page_id = %page.id,
                failed = ?report.failed_ids(),
                "Pre-publish validation failed"
            );
        }
        report
    }

    fn check_seo_shape(&self, page: &Page) -> ValidationCheck {
        let problems = validate_seo(&page.seo);
        if problems.is_empty() {
            ValidationCheck::pass(CHECK_SEO, "SEO payload")
        } else {
            ValidationCheck::fail(CHECK_SEO, "SEO payload", problems.join("; "))
        }
    }

    /// The Open Graph image must exist and answer a probe. Probe faults
    /// fail the check: an unverifiable image does not ship.
    async fn check_og_image(&self, page: &Page) -> ValidationCheck {
        let label = "Open Graph image";
        let url = match page.seo.og_image_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                return ValidationCheck::fail(
                    CHECK_OG_IMAGE,
                    label,
                    "Open Graph image is required before publishing",
                )
            }
        };

        match self.prober.probe(url).await {
            Ok(true) => ValidationCheck::pass(CHECK_OG_IMAGE, label),
            Ok(false) => ValidationCheck::fail(
                CHECK_OG_IMAGE,
                label,
                format!("Open Graph image {url} answered with a non-success status"),
            ),
            Err(e) => ValidationCheck::fail(
                CHECK_OG_IMAGE,
                label,
                format!("Open Graph image {url} could not be verified: {e}"),
            ),
        }
    }

    async fn check_block_schemas(&self, page: &Page) -> ValidationCheck {
        let label = "Block schemas";
        let mut problems = Vec::new();
        for block in &page.blocks {
            for issue in self.blocks.validate(block).await {
                problems.push(format!("block {}: {}", issue.block_id, issue.message));
            }
        }

        if problems.is_empty() {
            ValidationCheck::pass(CHECK_BLOCK_SCHEMA, label)
        } else {
            ValidationCheck::fail(CHECK_BLOCK_SCHEMA, label, problems.join("; "))
        }
    }
}
