//! Colour patterns for the LED strip.
//!
//! Two sources of colour feed the strip:
//!
//! | Source        | Used by light mode | Output                          |
//! |---------------|--------------------|---------------------------------|
//! | Hue wheel     | Rainbow            | `wheel(phase)`, phase 0–254     |
//! | Temperature   | Temperature        | palette bucket for the reading  |
//!
//! The wheel matches the classic APA102 helper: red → green → blue → red
//! across 0–255 in three 85-step segments.

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Hue shown in Temperature mode before the first reading arrives.
pub const PLACEHOLDER_HUE: u8 = 140;

/// Number of distinct rainbow phases; the phase counter wraps at this value.
pub const RAINBOW_STEPS: u8 = 255;

/// Colour at position `pos` on the hue wheel.
pub fn wheel(pos: u8) -> Rgb {
    match pos {
        0..=84 => Rgb::new(pos * 3, 255 - pos * 3, 0),
        85..=169 => {
            let p = pos - 85;
            Rgb::new(255 - p * 3, 0, p * 3)
        }
        _ => {
            let p = pos - 170;
            Rgb::new(0, p * 3, 255 - p * 3)
        }
    }
}

/// Advance the rainbow phase by one step, wrapping 254 → 0.
pub fn next_phase(phase: u8) -> u8 {
    ((phase as u16 + 1) % RAINBOW_STEPS as u16) as u8
}

/// One pass through every wheel position, ending back on hue 0.
///
/// Played when the light button selects Rainbow, as quick feedback.
pub fn quick_sweep() -> impl Iterator<Item = Rgb> {
    (0..RAINBOW_STEPS).map(wheel).chain(core::iter::once(wheel(0)))
}

/// Piecewise-constant temperature → colour classification.
///
/// `boundaries` are strictly ascending and `colours` holds one more entry
/// than `boundaries`.  Intervals are right-closed: `(b[i], b[i+1]]`.
#[derive(Debug, Clone, Copy)]
pub struct TemperaturePalette<'a> {
    boundaries: &'a [f32],
    colours: &'a [Rgb],
}

impl<'a> TemperaturePalette<'a> {
    /// Borrow a validated boundary/colour pair.
    pub fn new(boundaries: &'a [f32], colours: &'a [Rgb]) -> Self {
        debug_assert!(!boundaries.is_empty());
        debug_assert_eq!(colours.len(), boundaries.len() + 1);
        Self {
            boundaries,
            colours,
        }
    }

    /// Index of the interval containing `celsius`: the number of
    /// boundaries strictly below it.
    pub fn bucket(&self, celsius: f32) -> usize {
        self.boundaries.partition_point(|b| *b < celsius)
    }

    pub fn colour_for(&self, celsius: f32) -> Rgb {
        self.colours[self.bucket(celsius)]
    }
}
