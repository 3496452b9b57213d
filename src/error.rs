//! Unified error types for the night light.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! coordinator loop can log any failed event the same way.  Subsystem
//! enums stay `Copy`; only asset and spawn errors carry owned text.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The LED strip or display rejected a frame.
    Device(DeviceError),
    /// The messaging client failed.
    Comms(CommsError),
    /// An image asset could not be loaded or has the wrong geometry.
    Asset(String),
    /// A worker thread could not be spawned.
    Spawn(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Asset(msg) => write!(f, "asset: {msg}"),
            Self::Spawn(msg) => write!(f, "thread spawn: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// SPI transfer to the LED strip failed.
    SpiWriteFailed,
    /// I2C transfer to the display failed.
    I2cWriteFailed,
    /// A GPIO pin could not be claimed or driven.
    GpioFailed,
    /// Pixel index outside the physical strip.
    PixelOutOfRange,
    /// The peripheral could not be opened.
    Unavailable,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpiWriteFailed => write!(f, "SPI write failed"),
            Self::I2cWriteFailed => write!(f, "I2C write failed"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::PixelOutOfRange => write!(f, "pixel index out of range"),
            Self::Unavailable => write!(f, "peripheral unavailable"),
        }
    }
}

impl std::error::Error for DeviceError {}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor never answered the start signal.
    NoResponse,
    /// Fewer than 40 data bits were captured.
    ShortFrame,
    /// The frame checksum did not match.
    ChecksumMismatch,
    /// Decoded values are physically implausible.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response from sensor"),
            Self::ShortFrame => write!(f, "incomplete frame"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The CA bundle for the broker could not be read.
    CaBundleUnreadable,
    /// The publish request could not be queued.
    PublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaBundleUnreadable => write!(f, "CA bundle unreadable"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl std::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
