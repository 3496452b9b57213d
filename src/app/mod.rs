//! Application core — mode logic, zero direct I/O.
//!
//! All interaction with hardware and the broker happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod lifecycle;
pub mod modes;
pub mod ports;
pub mod service;
