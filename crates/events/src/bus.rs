//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DomainEvent`]s. It is
//! shared via `Arc<EventBus>` across the application; subscribers include
//! live-update surfaces and audit capture.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use folio_core::types::DocId;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Dot-separated event names emitted by the publishing pipeline.
pub mod event_types {
    pub const PAGE_PUBLISHED: &str = "page.published";
    pub const PAGE_UNPUBLISHED: &str = "page.unpublished";
    pub const PAGE_ROLLED_BACK: &str = "page.rolled_back";
    pub const PAGE_MOVED: &str = "page.moved";
    pub const PAGE_DELETED: &str = "page.deleted";
}

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A publishing lifecycle event.
///
/// Constructed via [`DomainEvent::new`] and enriched with the builder
/// methods [`with_page`](DomainEvent::with_page),
/// [`with_actor`](DomainEvent::with_actor), and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, one of [`event_types`].
    pub event_type: String,

    /// Workspace the event belongs to.
    pub workspace_id: DocId,

    /// Site the event belongs to.
    pub site_id: DocId,

    /// Page the event concerns, absent for site-level events.
    pub page_id: Option<DocId>,

    /// User whose request triggered the event.
    pub actor_user_id: Option<DocId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with its required scope fields.
    pub fn new(
        event_type: impl Into<String>,
        workspace_id: impl Into<DocId>,
        site_id: impl Into<DocId>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            workspace_id: workspace_id.into(),
            site_id: site_id.into(),
            page_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the page the event concerns.
    pub fn with_page(mut self, page_id: impl Into<DocId>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    /// Attach the acting user.
    pub fn with_actor(mut self, user_id: impl Into<DocId>) -> Self {
        self.actor_user_id = Some(user_id.into());
        self
    }

    /// Set the JSON payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no active subscribers the event is silently dropped; the bus
    /// is a live feed, not durable storage.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
