//! Light and display mode definitions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Behaviour of the LED strip.  The configured order is the order the
/// light button cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightMode {
    /// Colour follows the latest temperature reading.
    Temperature,
    /// Hue wheel animation.
    Rainbow,
    /// Strip dark.
    Off,
}

impl LightMode {
    /// Name used on the wire and in the config.
    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Rainbow => "Rainbow",
            Self::Off => "Off",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Temperature" => Some(Self::Temperature),
            "Rainbow" => Some(Self::Rainbow),
            "Off" => Some(Self::Off),
            _ => None,
        }
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour of the OLED panel.
///
/// Remote commands may name a mode the panel does not know; the name is
/// kept and published but nothing is rendered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayMode {
    Temperature,
    Off,
    Unrecognised(String),
}

impl DisplayMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Temperature" => Self::Temperature,
            "Off" => Self::Off,
            other => Self::Unrecognised(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Temperature => "Temperature",
            Self::Off => "Off",
            Self::Unrecognised(name) => name,
        }
    }

    /// Mode the display button switches to; `None` for unrecognised modes.
    pub fn toggled(&self) -> Option<Self> {
        match self {
            Self::Temperature => Some(Self::Off),
            Self::Off => Some(Self::Temperature),
            Self::Unrecognised(_) => None,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
