//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                    | Connects to            |
//! |-------------|-------------------------------|------------------------|
//! | `hardware`  | LedStripPort, DisplayPort     | rppal SPI / I2C        |
//! |             | ClimateSensor, InputPort      | rppal GPIO             |
//! | `log_sink`  | Publisher                     | Log output             |
//! | `mqtt`      | Publisher                     | MQTT broker over TLS   |

#[cfg(feature = "rpi")]
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
