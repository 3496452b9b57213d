//! Running system and its one-shot shutdown.
//!
//! ## Shutdown order
//!
//! | Step | Action                                  |
//! |------|-----------------------------------------|
//! | 1    | stop the sensor poller (join)           |
//! | 2    | release button interrupts               |
//! | 3    | clear the run flag, wake and join the coordinator |
//! | 4    | clear the LED strip                     |
//! | 5    | clear the display                       |
//! | 6    | disconnect messaging                    |
//!
//! [`Runtime::shutdown`] may be called from any thread, any number of
//! times; the sequence runs exactly once and later callers block until it
//! has finished.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, Once, PoisonError};
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use super::ports::{ClimateSensor, InputPort};
use super::service::{Devices, NightLight};
use crate::error::{Error, Result};
use crate::events::{Event, EventSender};
use crate::sensors::RetryPolicy;
use crate::sensors::poller::SensorPoller;

pub struct Runtime {
    once: Once,
    running: Arc<AtomicBool>,
    events: EventSender,
    poller: Mutex<Option<SensorPoller>>,
    inputs: Mutex<Option<Box<dyn InputPort>>>,
    coordinator: Mutex<Option<JoinHandle<()>>>,
    devices: Devices,
}

impl Runtime {
    /// Apply the initial modes, start the coordinator thread, then start
    /// polling the sensor.
    pub fn launch(
        mut night_light: NightLight,
        events: (EventSender, Receiver<Event>),
        sensor: Box<dyn ClimateSensor>,
        retry: RetryPolicy,
        inputs: Box<dyn InputPort>,
    ) -> Result<Arc<Self>> {
        let (tx, rx) = events;
        night_light.start()?;

        let devices = night_light.devices().clone();
        let interval = night_light.config().update_interval();
        let running = Arc::new(AtomicBool::new(true));

        let loop_running = Arc::clone(&running);
        let coordinator = thread::Builder::new()
            .name("coordinator".into())
            .spawn(move || night_light.run(&rx, &loop_running))
            .map_err(|e| Error::Spawn(e.to_string()))?;

        let poller = SensorPoller::start(sensor, interval, retry, tx.clone());

        Ok(Arc::new(Self {
            once: Once::new(),
            running,
            events: tx,
            poller: Mutex::new(Some(poller)),
            inputs: Mutex::new(Some(inputs)),
            coordinator: Mutex::new(Some(coordinator)),
            devices,
        }))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop everything and blank the hardware.  Idempotent.
    pub fn shutdown(&self) {
        self.once.call_once(|| {
            info!("Shutting down");

            if let Some(mut poller) = take(&self.poller) {
                poller.stop();
            }
            if let Some(mut inputs) = take(&self.inputs) {
                inputs.release();
            }

            self.running.store(false, Ordering::Release);
            self.events.push(Event::Shutdown);
            if let Some(handle) = take(&self.coordinator) {
                if handle.join().is_err() {
                    warn!("Coordinator thread panicked");
                }
            }

            if let Err(e) = self.devices.strip.clear() {
                error!("Failed to clear LED strip: {}", e);
            }
            if let Err(e) = self.devices.display.clear() {
                error!("Failed to clear display: {}", e);
            }
            self.devices.publisher.disconnect();
            info!("Shutdown complete");
        });
    }
}

fn take<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}
