//! Debounced push-button edges.
//!
//! ## Hardware
//!
//! Active-low momentary switch on an input with pull-up.  The GPIO layer
//! fires a callback on every falling edge (on its own interrupt thread);
//! [`ButtonHandler::on_edge`] filters contact bounce and turns accepted
//! edges into coordinator events.
//!
//! ## Debounce
//!
//! | Edge arrives                        | Result    |
//! |-------------------------------------|-----------|
//! | First edge ever                     | accepted  |
//! | < window after last accepted edge   | dropped   |
//! | >= window after last accepted edge  | accepted  |
//!
//! The window is measured from the last *accepted* edge, so a switch that
//! chatters for longer than the window still yields one event per window.

use core::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::debug;

use crate::events::{Event, EventSender};

/// Default debounce window for both buttons.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

const NEVER: u64 = u64::MAX;

/// Lock-free edge filter; safe to call from interrupt callbacks.
pub struct Debouncer {
    window_ms: u64,
    epoch: Instant,
    last_accepted_ms: AtomicU64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.as_millis() as u64,
            epoch: Instant::now(),
            last_accepted_ms: AtomicU64::new(NEVER),
        }
    }

    /// Filter an edge observed now.
    pub fn accept(&self) -> bool {
        self.accept_at(self.epoch.elapsed().as_millis() as u64)
    }

    /// Filter an edge at `now_ms` (monotonic milliseconds).
    pub fn accept_at(&self, now_ms: u64) -> bool {
        let mut last = self.last_accepted_ms.load(Ordering::Acquire);
        loop {
            if last != NEVER && now_ms.saturating_sub(last) < self.window_ms {
                return false;
            }
            match self.last_accepted_ms.compare_exchange_weak(
                last,
                now_ms,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(current) => last = current,
            }
        }
    }
}

/// Binds a debouncer to the event a button produces.
pub struct ButtonHandler {
    name: &'static str,
    event: Event,
    debouncer: Debouncer,
    events: EventSender,
}

impl ButtonHandler {
    pub fn new(name: &'static str, event: Event, window: Duration, events: EventSender) -> Self {
        Self {
            name,
            event,
            debouncer: Debouncer::new(window),
            events,
        }
    }

    /// Falling-edge callback.  Never blocks.
    pub fn on_edge(&self) {
        if self.debouncer.accept() {
            debug!("{} button pressed", self.name);
            self.events.push(self.event.clone());
        }
    }
}
