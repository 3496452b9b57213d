//! DHT-family single-wire temperature/humidity sensors (DHT11, DHT22,
//! AM2302).
//!
//! ## Frame format
//!
//! After the host start signal the sensor answers with 40 bits.  Every bit
//! is a ~50 µs low pulse followed by a high pulse: ~27 µs for `0`, ~70 µs
//! for `1`.  The five bytes are humidity hi/lo, temperature hi/lo and an
//! 8-bit checksum over the first four.
//!
//! | Sensor        | Humidity            | Temperature                      |
//! |---------------|---------------------|----------------------------------|
//! | DHT11         | byte0 + byte1 / 10  | byte2 + byte3 / 10               |
//! | DHT22, AM2302 | u16(byte0..1) / 10  | u16(byte2 & 0x7F..3) / 10, sign = byte2 bit 7 |
//!
//! Pulse capture is platform specific (see the hardware adapter); the
//! decoding here is pure.

use serde::{Deserialize, Serialize};

use super::Reading;
use crate::error::SensorError;

/// Bits in one sensor frame.
pub const FRAME_BITS: usize = 40;

/// Supported sensor models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorKind {
    #[serde(rename = "DHT11")]
    Dht11,
    #[serde(rename = "DHT22")]
    Dht22,
    #[default]
    #[serde(rename = "AM2302")]
    Am2302,
}

impl SensorKind {
    /// How long the host holds the line low to request a frame.
    pub fn start_signal_us(self) -> u64 {
        match self {
            Self::Dht11 => 18_000,
            Self::Dht22 | Self::Am2302 => 1_100,
        }
    }

    fn temperature_range(self) -> (f32, f32) {
        match self {
            Self::Dht11 => (0.0, 50.0),
            Self::Dht22 | Self::Am2302 => (-40.0, 80.0),
        }
    }
}

/// Pack captured `(low_us, high_us)` bit pulses into frame bytes.
///
/// Extra leading pulses (the sensor's response preamble) are skipped.
pub fn frame_from_pulses(pulses: &[(u32, u32)]) -> Result<[u8; 5], SensorError> {
    if pulses.len() < FRAME_BITS {
        return Err(SensorError::ShortFrame);
    }
    let mut frame = [0u8; 5];
    for (i, (low, high)) in pulses[pulses.len() - FRAME_BITS..].iter().enumerate() {
        frame[i / 8] <<= 1;
        if high > low {
            frame[i / 8] |= 1;
        }
    }
    Ok(frame)
}

/// Decode a checked frame into a reading.
pub fn decode(kind: SensorKind, frame: [u8; 5]) -> Result<Reading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let (temperature_c, humidity_pct) = match kind {
        SensorKind::Dht11 => (
            f32::from(frame[2]) + f32::from(frame[3]) / 10.0,
            f32::from(frame[0]) + f32::from(frame[1]) / 10.0,
        ),
        SensorKind::Dht22 | SensorKind::Am2302 => {
            let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
            let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
            let temperature = if frame[2] & 0x80 != 0 {
                -magnitude
            } else {
                magnitude
            };
            (temperature, humidity)
        }
    };

    let (t_min, t_max) = kind.temperature_range();
    if !(0.0..=100.0).contains(&humidity_pct) || !(t_min..=t_max).contains(&temperature_c) {
        return Err(SensorError::OutOfRange);
    }
    Ok(Reading {
        temperature_c,
        humidity_pct,
    })
}
