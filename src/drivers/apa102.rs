//! APA102 addressable LED strip over SPI.
//!
//! ## Wire format
//!
//! | Part        | Bytes                                     |
//! |-------------|-------------------------------------------|
//! | Start frame | 4 × `0x00`                                |
//! | Per LED     | `0xE0 \| bright5`, blue, green, red        |
//! | End frame   | `ceil(n / 16)` × `0x00` (clock push-through) |
//!
//! Per-pixel brightness is given in percent and scaled into the strip's
//! global ceiling `max_brightness` (0-31), rounding up so that any
//! non-zero percentage stays visible.

use embedded_hal::spi::SpiBus;

use crate::app::ports::LedStripPort;
use crate::drivers::led_patterns::Rgb;
use crate::error::DeviceError;

const START_FRAME: [u8; 4] = [0; 4];
const LED_FRAME_MARKER: u8 = 0xE0;
const BRIGHTNESS_MASK: u8 = 0x1F;

/// Hardware brightness field for `percent` of `max`.
pub fn scale_brightness(percent: u8, max: u8) -> u8 {
    let pct = u16::from(percent.min(100));
    let max = u16::from(max & BRIGHTNESS_MASK);
    ((pct * max).div_ceil(100) as u8) & BRIGHTNESS_MASK
}

pub struct Apa102<SPI> {
    spi: SPI,
    /// Pre-encoded LED frames.
    pixels: Vec<[u8; 4]>,
    max_brightness: u8,
}

impl<SPI: SpiBus> Apa102<SPI> {
    pub fn new(spi: SPI, length: usize, max_brightness: u8) -> Self {
        Self {
            spi,
            pixels: vec![[LED_FRAME_MARKER, 0, 0, 0]; length],
            max_brightness,
        }
    }

    fn encode(&self) -> Vec<u8> {
        let n = self.pixels.len();
        let mut out = Vec::with_capacity(START_FRAME.len() + n * 4 + n.div_ceil(16));
        out.extend_from_slice(&START_FRAME);
        for px in &self.pixels {
            out.extend_from_slice(px);
        }
        out.resize(out.len() + n.div_ceil(16), 0);
        out
    }
}

impl<SPI: SpiBus + Send> LedStripPort for Apa102<SPI> {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, colour: Rgb, brightness: u8) -> Result<(), DeviceError> {
        let bright = scale_brightness(brightness, self.max_brightness);
        let px = self
            .pixels
            .get_mut(index)
            .ok_or(DeviceError::PixelOutOfRange)?;
        *px = [LED_FRAME_MARKER | bright, colour.b, colour.g, colour.r];
        Ok(())
    }

    fn clear(&mut self) {
        self.pixels.fill([LED_FRAME_MARKER, 0, 0, 0]);
    }

    fn show(&mut self) -> Result<(), DeviceError> {
        let frame = self.encode();
        self.spi
            .write(&frame)
            .map_err(|_| DeviceError::SpiWriteFailed)?;
        self.spi.flush().map_err(|_| DeviceError::SpiWriteFailed)
    }
}
