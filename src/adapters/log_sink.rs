//! Log-only publisher.
//!
//! Implements [`Publisher`] by writing every state update to the log.
//! Used when `mqtt.enable` is false so the coordinator publishes the same
//! way whether or not a broker is configured.

use log::{debug, info};

use crate::app::ports::Publisher;
use crate::error::CommsError;

pub struct LogPublisher;

impl LogPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher for LogPublisher {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), CommsError> {
        debug!("PUBLISH | {} = {} | retain={}", topic, payload, retain);
        Ok(())
    }

    fn disconnect(&self) {
        info!("Messaging disabled, nothing to disconnect");
    }
}
