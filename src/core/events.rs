//! Record change notifications
//!
//! The EventBus decouples registry mutations from the live views that
//! re-render on change. It is a thin wrapper over `tokio::sync::broadcast`.
//!
//! ```text
//! POST /clients ─────────┐
//! PUT /clients/{id} ─────┼──▶ EventBus::publish() ──▶ /clients/live subscribers
//! POST /clients/bulk/* ──┘                        ──▶ audit log (tracing)
//! ```

use crate::core::entity::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A mutation on a registry collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecordEvent {
    Created {
        collection: String,
        record_id: Uuid,
        data: serde_json::Value,
    },
    Updated {
        collection: String,
        record_id: Uuid,
        data: serde_json::Value,
    },
    Deleted {
        collection: String,
        record_ids: Vec<Uuid>,
    },
    /// Bulk or single status change
    StatusChanged {
        collection: String,
        record_ids: Vec<Uuid>,
        status: Option<Status>,
    },
}

impl RecordEvent {
    pub fn collection(&self) -> &str {
        match self {
            RecordEvent::Created { collection, .. }
            | RecordEvent::Updated { collection, .. }
            | RecordEvent::Deleted { collection, .. }
            | RecordEvent::StatusChanged { collection, .. } => collection,
        }
    }

    /// Records touched by the event
    pub fn record_ids(&self) -> Vec<Uuid> {
        match self {
            RecordEvent::Created { record_id, .. } | RecordEvent::Updated { record_id, .. } => {
                vec![*record_id]
            }
            RecordEvent::Deleted { record_ids, .. }
            | RecordEvent::StatusChanged { record_ids, .. } => record_ids.clone(),
        }
    }

    pub fn action(&self) -> &str {
        match self {
            RecordEvent::Created { .. } => "created",
            RecordEvent::Updated { .. } => "updated",
            RecordEvent::Deleted { .. } => "deleted",
            RecordEvent::StatusChanged { .. } => "status_changed",
        }
    }
}

/// Envelope wrapping a record event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Email of the user that caused the change, if known
    pub actor: Option<String>,
    pub event: RecordEvent,
}

impl EventEnvelope {
    pub fn new(event: RecordEvent, actor: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor,
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes to the same subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: RecordEvent, actor: Option<String>) -> usize {
        tracing::info!(
            collection = event.collection(),
            action = event.action(),
            records = event.record_ids().len(),
            actor = actor.as_deref().unwrap_or("-"),
            "record change"
        );
        let envelope = EventEnvelope::new(event, actor);
        // send() only fails when nobody listens
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
