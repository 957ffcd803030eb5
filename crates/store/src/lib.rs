//! Storage seams for the publishing pipeline.
//!
//! The content store is an external collaborator; this crate defines the
//! narrow trait surface the pipeline needs from it, plus an in-memory
//! adapter used by tests and local development. Production deployments
//! swap in an adapter for the real document store behind the same traits.

pub mod alerts;
pub mod content;
pub mod counters;
pub mod error;
pub mod memory;

pub use alerts::AlertStore;
pub use content::ContentStore;
pub use counters::{CounterStore, CounterTxn, DecideFn};
pub use error::StoreError;
pub use memory::MemoryStore;
