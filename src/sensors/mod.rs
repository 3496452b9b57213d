//! Sensor subsystem — the DHT decoder, bounded-retry reads and the
//! background [`SensorPoller`](poller::SensorPoller).
//!
//! A failed read is routine for single-wire sensors: the retry loop
//! absorbs most of them, and a cycle that still fails is skipped.

pub mod dht;
pub mod poller;

use std::time::Duration;

use log::{debug, warn};

use crate::app::ports::ClimateSensor;

/// One temperature/humidity sample.  Replaced wholesale, never edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Fixed retry budget for one poll.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 15,
            delay: Duration::from_secs(2),
        }
    }
}

/// Read `sensor` up to `policy.attempts` times, pausing between failures.
///
/// `pause` blocks for the given delay and returns `true` when the poll has
/// been cancelled, which abandons the remaining attempts.  Returns `None`
/// when every attempt failed or the poll was cancelled.
pub fn read_with_retry(
    sensor: &mut dyn ClimateSensor,
    policy: RetryPolicy,
    mut pause: impl FnMut(Duration) -> bool,
) -> Option<Reading> {
    for attempt in 1..=policy.attempts {
        match sensor.read() {
            Ok(reading) => return Some(reading),
            Err(e) => {
                debug!("Sensor attempt {}/{} failed: {}", attempt, policy.attempts, e);
                if attempt < policy.attempts && pause(policy.delay) {
                    debug!("Sensor poll cancelled after {} attempts", attempt);
                    return None;
                }
            }
        }
    }
    warn!("No sensor reading after {} attempts", policy.attempts);
    None
}
