//! Page path derivation and public path addressing.
//!
//! A page's `path` is derived state: the parent's path plus the page's
//! slug. Cache invalidation and the serving layer address pages by the
//! public paths built here.

/// Compute a page's tree path from its parent's path and its own slug.
/// Root pages (no parent) live at `/{slug}`.
pub fn child_path(parent_path: Option<&str>, slug: &str) -> String {
    match parent_path {
        Some(parent) if parent != "/" => format!("{parent}/{slug}"),
        _ => format!("/{slug}"),
    }
}

/// Normalize a path for cache addressing: drop query and fragment, force
/// a leading slash, strip trailing slashes (except the bare root).
pub fn normalize_public_path(raw: &str) -> String {
    let trimmed = match raw.find(|c| c == '?' || c == '#') {
        Some(idx) => &raw[..idx],
        None => raw,
    };

    let mut path = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    path
}

/// Public root of a site's published surface.
pub fn live_site_path(site_slug: &str) -> String {
    format!("/live/{site_slug}")
}

/// Public address of one published page.
pub fn live_page_path(site_slug: &str, page_path: &str) -> String {
    format!("/live/{site_slug}{}", normalize_public_path(page_path))
}

/// Editor preview address of a page, published or not.
pub fn preview_path(site_id: &str, page_id: &str) -> String {
    format!("/cms/preview/{site_id}/{page_id}")
}
