//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`FormEvent`]s. Every
//! mutation of the form tree is published here; subscribers (the email
//! message pipeline, any rendering layer) each receive every event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// FormEvent
// ---------------------------------------------------------------------------

/// What happened to the form tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormEventKind {
    /// A leaf's value was changed by a user edit.
    ValueChanged,
    /// A leaf received and lost focus.
    Touched,
    /// An address group was appended to the address list.
    AddressAdded,
}

/// A discrete change event on the form tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormEvent {
    pub kind: FormEventKind,

    /// Dot-separated path of the affected control, e.g. `"emailGroup.email"`.
    pub path: String,

    /// The new value for [`FormEventKind::ValueChanged`], the new index for
    /// [`FormEventKind::AddressAdded`], null otherwise.
    pub value: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl FormEvent {
    pub fn value_changed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind: FormEventKind::ValueChanged,
            path: path.into(),
            value,
            timestamp: Utc::now(),
        }
    }

    pub fn touched(path: impl Into<String>) -> Self {
        Self {
            kind: FormEventKind::Touched,
            path: path.into(),
            value: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn address_added(index: usize) -> Self {
        Self {
            kind: FormEventKind::AddressAdded,
            path: regform_core::paths::ADDRESSES.to_string(),
            value: serde_json::json!(index),
            timestamp: Utc::now(),
        }
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
/// independently receive every published [`FormEvent`].
pub struct EventBus {
    sender: broadcast::Sender<FormEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: FormEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
