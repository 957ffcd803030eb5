//! Core domain logic for the folio publishing platform.
//!
//! Document models, slug and path rules, counter decision math,
//! pre-publish check evaluation, and page-tree algorithms, plus the clock
//! and id-minting seams everything else injects. No storage, no HTTP.
//! The store and pipeline crates build on these types.

pub mod actions;
pub mod checks;
pub mod hashing;
pub mod ids;
pub mod model;
pub mod path;
pub mod seo;
pub mod slug;
pub mod throttle;
pub mod tree;
pub mod types;
