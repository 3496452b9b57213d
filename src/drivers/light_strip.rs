//! Lock-guarded LED strip controller.
//!
//! The coordinator thread and the shutdown path both drive the strip, so
//! every operation takes the strip lock for the whole buffer-and-commit
//! sequence.  A poisoned lock is recovered: the strip holds no invariant
//! that a panicked writer could break beyond a stale frame.

use std::ops::Range;
use std::sync::{Mutex, PoisonError};

use super::led_patterns::Rgb;
use crate::app::ports::LedStripPort;
use crate::error::DeviceError;

pub struct LightStripController {
    strip: Mutex<Box<dyn LedStripPort>>,
    /// Positive: first N pixels.  Negative: last |N| pixels.
    light: i32,
}

impl LightStripController {
    pub fn new(strip: Box<dyn LedStripPort>, light: i32) -> Self {
        Self {
            strip: Mutex::new(strip),
            light,
        }
    }

    /// Light the configured pixels in `colour` and commit.
    pub fn set_all(&self, colour: Rgb, brightness: u8) -> Result<(), DeviceError> {
        let mut strip = self.strip.lock().unwrap_or_else(PoisonError::into_inner);
        strip.clear();
        for index in lit_range(self.light, strip.len()) {
            strip.set_pixel(index, colour, brightness)?;
        }
        strip.show()
    }

    /// Turn every pixel off and commit.
    pub fn clear(&self) -> Result<(), DeviceError> {
        let mut strip = self.strip.lock().unwrap_or_else(PoisonError::into_inner);
        strip.clear();
        strip.show()
    }
}

/// Pixel indices selected by the signed `light` count.
pub fn lit_range(light: i32, length: usize) -> Range<usize> {
    let count = (light.unsigned_abs() as usize).min(length);
    if light >= 0 {
        0..count
    } else {
        length - count..length
    }
}
