//! Recurring background sensor poll.
//!
//! One owned thread per poller: poll immediately, forward the reading,
//! then sleep for the configured interval on a condition variable so that
//! [`SensorPoller::stop`] can cut the wait short.  Pauses between retry
//! attempts use the same condition variable.  The next poll is only
//! scheduled after the previous one has finished, so at most one read is
//! ever in flight.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{info, warn};

use super::{RetryPolicy, read_with_retry};
use crate::app::ports::ClimateSensor;
use crate::events::{Event, EventSender};

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }

    fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `interval` or until stopped.  Returns `true` if stopped.
    fn wait(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            stopped = self
                .wake
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *stopped
    }
}

/// Handle to the running poll thread.
pub struct SensorPoller {
    signal: Arc<StopSignal>,
    worker: Option<JoinHandle<()>>,
}

impl SensorPoller {
    /// Spawn the poll thread.  The first poll runs immediately.
    pub fn start(
        mut sensor: Box<dyn ClimateSensor>,
        interval: Duration,
        retry: RetryPolicy,
        events: EventSender,
    ) -> Self {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);
        let worker = thread::Builder::new()
            .name("sensor-poller".into())
            .spawn(move || {
                info!("Sensor poller started, interval {:?}", interval);
                loop {
                    if thread_signal.is_stopped() {
                        break;
                    }
                    let polled =
                        read_with_retry(sensor.as_mut(), retry, |d| thread_signal.wait(d));
                    if let Some(reading) = polled {
                        info!(
                            "Temp={:.1}\u{00b0}C  Humidity={:.1}%",
                            reading.temperature_c, reading.humidity_pct
                        );
                        if !events.send(Event::ReadingUpdated(reading)) {
                            warn!("Coordinator gone, sensor poller exiting");
                            break;
                        }
                    }
                    if thread_signal.wait(interval) {
                        break;
                    }
                }
                info!("Sensor poller stopped");
            })
            .ok();
        if worker.is_none() {
            warn!("Could not spawn sensor poller thread");
        }
        Self { signal, worker }
    }

    /// Cancel the pending wait or retry pause and join the thread.  A single
    /// sensor read already in progress finishes first.
    pub fn stop(&mut self) {
        self.signal.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Sensor poller thread panicked");
            }
        }
    }
}
