//! Fixed bus assignments on the Raspberry Pi header.
//!
//! Button and sensor pins are configurable (BCM numbering, see
//! [`crate::config`]); the buses below are wired the same on every unit.

// ---------------------------------------------------------------------------
// LED strip (APA102) — SPI0, MOSI = BCM 10, SCLK = BCM 11
// ---------------------------------------------------------------------------

/// SPI clock for the strip.  APA102 tolerates far more; 8 MHz keeps
/// long strips reliable.
pub const STRIP_SPI_HZ: u32 = 8_000_000;

// ---------------------------------------------------------------------------
// OLED (SSD1306) — I2C1, SDA = BCM 2, SCL = BCM 3
// ---------------------------------------------------------------------------

/// 7-bit I2C address of the panel.
pub const OLED_I2C_ADDR: u8 = crate::drivers::ssd1306::DEFAULT_ADDRESS;
