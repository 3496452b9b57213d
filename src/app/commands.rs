//! Inbound remote commands.
//!
//! These arrive on the three `/set` topics and are handed to the
//! coordinator unparsed: payload validation is the coordinator's job so
//! that a bad value can be logged against the current state.

use crate::config::MqttConfig;

/// Commands that the messaging adapter can send into the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Set the display mode by name.
    SetDisplay(String),
    /// Jump to a light mode by name.
    SetLight(String),
    /// Set brightness from a raw integer string.
    SetBrightness(String),
}

/// Maps `/set` topics to commands.
#[derive(Debug, Clone)]
pub struct CommandTopics {
    display: String,
    light: String,
    brightness: String,
}

impl CommandTopics {
    pub fn new(mqtt: &MqttConfig) -> Self {
        Self {
            display: mqtt.display_set_topic(),
            light: mqtt.light_set_topic(),
            brightness: mqtt.brightness_set_topic(),
        }
    }

    /// Topics to (re)subscribe to on every connect.
    pub fn all(&self) -> [&str; 3] {
        [&self.display, &self.light, &self.brightness]
    }

    /// Decode a message; `None` for topics we do not handle.
    pub fn parse(&self, topic: &str, payload: &[u8]) -> Option<RemoteCommand> {
        let payload = String::from_utf8_lossy(payload).into_owned();
        if topic == self.display {
            Some(RemoteCommand::SetDisplay(payload))
        } else if topic == self.light {
            Some(RemoteCommand::SetLight(payload))
        } else if topic == self.brightness {
            Some(RemoteCommand::SetBrightness(payload))
        } else {
            None
        }
    }
}
