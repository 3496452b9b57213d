//! Port traits — the hexagonal boundary between the coordinator and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NightLight (domain)
//! ```
//!
//! Driven adapters (LED strip, OLED, sensor, MQTT, GPIO buttons) implement
//! these traits.  The coordinator and the device controllers consume them
//! via generics or trait objects, so the domain never touches hardware
//! directly and every port can be mocked on the host.

use crate::error::{CommsError, DeviceError, SensorError};
use crate::drivers::led_patterns::Rgb;
use crate::graphics::MonoImage;
use crate::sensors::Reading;

// ───────────────────────────────────────────────────────────────
// LED strip port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Raw pixel access to an addressable strip.
///
/// Pixel writes are buffered until [`show`](LedStripPort::show).
pub trait LedStripPort: Send {
    /// Physical number of pixels.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer `colour` for pixel `index` at `brightness` percent (0-100).
    fn set_pixel(&mut self, index: usize, colour: Rgb, brightness: u8) -> Result<(), DeviceError>;

    /// Buffer every pixel as off.
    fn clear(&mut self);

    /// Push the buffered frame to the strip.
    fn show(&mut self) -> Result<(), DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// 1-bit panel at its native resolution.
pub trait DisplayPort: Send {
    /// Copy `image` into the frame buffer.
    fn image(&mut self, image: &MonoImage);

    /// Blank the frame buffer.
    fn clear(&mut self);

    /// Push the frame buffer to the panel.
    fn show(&mut self) -> Result<(), DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// Climate sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// A single attempt at reading temperature and humidity.
///
/// Retries belong to the caller; one failed frame is routine for
/// single-wire sensors.
pub trait ClimateSensor: Send {
    fn read(&mut self) -> Result<Reading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Publisher port (domain → messaging)
// ───────────────────────────────────────────────────────────────

/// Outbound state and telemetry.
pub trait Publisher: Send + Sync {
    /// Queue `payload` on `topic`.
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), CommsError>;

    /// Close the broker connection.  Only called once, from shutdown.
    fn disconnect(&self);
}

// ───────────────────────────────────────────────────────────────
// Input port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Registered button interrupts that must be unwound on shutdown.
pub trait InputPort: Send {
    fn release(&mut self);
}
