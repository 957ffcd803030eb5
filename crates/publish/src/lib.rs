//! The content publishing pipeline.
//!
//! Orchestrates everything between "user hit Publish" and "new content is
//! live": admission control (rate limit, daily quota), the pre-publish
//! validation gate, version and snapshot writing, page-tree maintenance,
//! cache invalidation, and failure alerting. [`PublishPipeline`] is the
//! facade the API layer calls.

pub mod alerts;
pub mod error;
pub mod gate;
pub mod invalidation;
pub mod limiter;
pub mod pipeline;
pub mod quota;
pub mod tree;
pub mod writer;

pub use error::PipelineError;
pub use pipeline::{PublishPipeline, RequestContext};
