//! SEO payload well-formedness rules.
//!
//! These are shape rules, not content checks: presence of individual
//! fields is judged by the per-field pre-publish checks. A page with no
//! SEO fields at all passes this module and fails those.

use crate::model::page::Seo;

/// Lengths beyond which search engines truncate the rendered snippet.
pub const MAX_META_TITLE_CHARS: usize = 70;
pub const MAX_META_DESCRIPTION_CHARS: usize = 160;

/// Collect every shape problem in an SEO payload. Empty result means the
/// payload is well-formed.
pub fn validate_seo(seo: &Seo) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some(title) = seo.meta_title.as_deref() {
        let chars = title.chars().count();
        if chars > MAX_META_TITLE_CHARS {
            problems.push(format!(
                "meta title is {chars} characters (max {MAX_META_TITLE_CHARS})"
            ));
        }
    }

    if let Some(desc) = seo.meta_description.as_deref() {
        let chars = desc.chars().count();
        if chars > MAX_META_DESCRIPTION_CHARS {
            problems.push(format!(
                "meta description is {chars} characters (max {MAX_META_DESCRIPTION_CHARS})"
            ));
        }
    }

    if let Some(url) = seo.og_image_url.as_deref() {
        if !url.is_empty() && !is_absolute_http_url(url) {
            problems.push(format!("og image url {url:?} is not an absolute http(s) URL"));
        }
    }

    problems
}

fn is_absolute_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
