//! Event fan-out and background effect infrastructure.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the canonical event envelope for publishing
//!   lifecycle changes.
//! - [`effects`] -- bounded queue of retryable best-effort side effects
//!   (cache purges and the like), drained by a background worker.

pub mod bus;
pub mod effects;

pub use bus::{DomainEvent, EventBus};
pub use effects::{Effect, EffectError, EffectQueue, EffectWorker};
