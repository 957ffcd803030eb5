//! Slug normalization rules.
//!
//! Slugs are the URL-facing name of a page. The tree manager normalizes
//! both sides before any uniqueness comparison, so two pages can never
//! differ only by case or punctuation.

/// Hard cap on slug length, applied after normalization.
pub const MAX_SLUG_LEN: usize = 64;

/// Normalize free-form text into a slug.
///
/// Rules: lowercase, every run of characters outside `[a-z0-9]` collapses
/// to a single `-`, leading/trailing `-` stripped, truncated to
/// [`MAX_SLUG_LEN`].
///
/// # Examples
///
/// ```
/// use folio_core::slug::normalize_slug;
///
/// assert_eq!(normalize_slug("Hello World"), "hello-world");
/// assert_eq!(normalize_slug("  --About / Us--  "), "about-us");
/// assert_eq!(normalize_slug("FAQ#2"), "faq-2");
/// ```
pub fn normalize_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len().min(MAX_SLUG_LEN));
    let mut pending_separator = false;

    for c in input.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    // Slug is pure ASCII here, so byte truncation is char-safe.
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// True when `input` is already in normalized form.
pub fn is_normalized(input: &str) -> bool {
    !input.is_empty() && normalize_slug(input) == input
}
