//! Event queue feeding the coordinator.
//!
//! Events are produced by:
//! - GPIO interrupt callbacks (button edges, already debounced)
//! - The MQTT connection thread (remote `/set` commands)
//! - The sensor poller thread (new readings)
//! - Shutdown (wakes the coordinator so it can exit)
//!
//! Events are consumed by the single coordinator thread, one at a time in
//! arrival order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ GPIO IRQ    │────▶│              │     │              │
//! │ MQTT thread │────▶│  Event Queue │────▶│ Coordinator  │
//! │ Poller      │────▶│  (bounded)   │     │  (consumer)  │
//! │ Shutdown    │────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use log::warn;

use crate::app::commands::RemoteCommand;
use crate::sensors::Reading;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Inputs to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The poller obtained a fresh reading.
    ReadingUpdated(Reading),
    /// Light button falling edge.
    LightButton,
    /// Display button falling edge.
    DisplayButton,
    /// Command received on a `/set` topic.
    Remote(RemoteCommand),
    /// Stop the coordinator loop.
    Shutdown,
}

/// Cloneable producer half of the queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: SyncSender<Event>,
}

impl EventSender {
    /// Non-blocking push for interrupt callbacks.
    /// Returns `false` if the queue is full (event dropped) or closed.
    pub fn push(&self, event: Event) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                warn!("Event queue full, dropping {:?}", dropped);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Blocking push for producer threads that may wait for space.
    /// Returns `false` once the coordinator has gone away.
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Create the bounded coordinator queue.
pub fn event_queue() -> (EventSender, Receiver<Event>) {
    let (tx, rx) = mpsc::sync_channel(EVENT_QUEUE_CAP);
    (EventSender { tx }, rx)
}
