//! NightLightPi library.
//!
//! Exposes the coordinator, drivers and adapters for the binary and for
//! integration testing.  Raspberry Pi peripheral access is gated behind
//! the `rpi` feature; everything else builds and tests on any host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod graphics;
pub mod pins;
pub mod sensors;
