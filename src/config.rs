//! System configuration
//!
//! Static settings for the night light, loaded once at startup from a JSON
//! document and never mutated afterwards.  Runtime-adjustable values
//! (brightness, current modes) start from here but live in the coordinator.
//!
//! The file path comes from `NIGHTLIGHTPICONFIG`, falling back to
//! [`ETC_PATH`].  The raw document is checked for required keys before it
//! is deserialised, so a missing key is reported by its dotted name.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::modes::{DisplayMode, LightMode};
use crate::drivers::led_patterns::Rgb;
use crate::sensors::dht::SensorKind;

/// Default location on a Raspberry Pi install.
pub const ETC_PATH: &str = "/etc/nightlightpi/nightlightpi.json";
/// Environment variable overriding [`ETC_PATH`].
pub const ENV_CONFIG_PATH: &str = "NIGHTLIGHTPICONFIG";

/// Keys every document must carry, as JSON pointers.
const REQUIRED_KEYS: &[&str] = &[
    "/mqtt",
    "/mqtt/enable",
    "/mqtt/server",
    "/mqtt/port",
    "/mqtt/user",
    "/mqtt/password",
    "/mqtt/temperature_topic",
    "/mqtt/humidity_topic",
    "/mqtt/display_topic",
    "/mqtt/light_topic",
    "/mqtt/brightness_topic",
    "/led_strip",
    "/led_strip/length",
    "/led_strip/light",
    "/led_strip/max_brightness",
    "/led_strip/brightness",
    "/inputs",
    "/inputs/buttons_light",
    "/inputs/buttons_display",
    "/temperature",
    "/temperature/sensor_ranges",
    "/temperature/sensor_colours",
    "/display_modes",
];

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub led_strip: LedStripConfig,
    pub inputs: InputsConfig,
    pub temperature: TemperatureConfig,
    pub display_modes: Vec<DisplayModeConfig>,
    /// Order the light button cycles through.
    #[serde(default = "default_light_modes")]
    pub light_modes: Vec<LightMode>,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub enable: bool,
    pub server: String,
    pub port: u16,
    /// Also used as the MQTT client id.
    pub user: String,
    pub password: String,
    /// PEM bundle used to verify the broker certificate.
    #[serde(default = "default_ca_certs")]
    pub ca_certs: PathBuf,
    pub temperature_topic: String,
    pub humidity_topic: String,
    pub display_topic: String,
    pub light_topic: String,
    pub brightness_topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedStripConfig {
    /// Physical number of pixels on the strip.
    pub length: usize,
    /// Pixels to light: positive counts from the start, negative from the end.
    pub light: i32,
    /// Global hardware brightness ceiling (0-31).
    pub max_brightness: u8,
    /// Default brightness in percent of `max_brightness`.
    pub brightness: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// BCM pin of the light-mode button.
    pub buttons_light: u8,
    /// BCM pin of the display button.
    pub buttons_display: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureConfig {
    #[serde(default)]
    pub sensor_type: SensorKind,
    /// BCM pin of the sensor data line.
    #[serde(default = "default_sensor_pin")]
    pub pin: u8,
    #[serde(default = "default_update_seconds")]
    pub update_seconds: u64,
    /// Ascending temperature boundaries in Celsius.
    pub sensor_ranges: Vec<f32>,
    /// One colour per interval: `sensor_ranges.len() + 1` entries.
    pub sensor_colours: Vec<Rgb>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayModeConfig {
    pub name: String,
    /// Image shown when the mode has nothing better to render.
    pub menu: PathBuf,
    #[serde(default)]
    pub background: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay between rainbow animation steps.
    #[serde(default = "default_speed")]
    pub speed_in_seconds: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            speed_in_seconds: default_speed(),
        }
    }
}

fn default_light_modes() -> Vec<LightMode> {
    vec![LightMode::Temperature, LightMode::Rainbow, LightMode::Off]
}

fn default_ca_certs() -> PathBuf {
    PathBuf::from("/etc/ssl/certs/ca-certificates.crt")
}

fn default_sensor_pin() -> u8 {
    22
}

fn default_update_seconds() -> u64 {
    60
}

fn default_speed() -> f64 {
    1.0
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    Unreadable { path: String, reason: String },
    /// The document is not valid JSON or has a mistyped value.
    Parse(String),
    /// A required key is absent (dotted path).
    MissingKey(String),
    /// A value failed range or consistency validation.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, reason } => write!(f, "cannot read {path}: {reason}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::MissingKey(key) => write!(f, "missing configuration value: {key}"),
            Self::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ───────────────────────────────────────────────────────────────
// Loading
// ───────────────────────────────────────────────────────────────

/// Resolve the config path from the value of [`ENV_CONFIG_PATH`].
pub fn config_path_from(env_value: Option<OsString>) -> PathBuf {
    env_value.map_or_else(|| PathBuf::from(ETC_PATH), PathBuf::from)
}

/// Load configuration from the environment-selected path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path_from(std::env::var_os(ENV_CONFIG_PATH)))
}

/// Load and validate configuration from `path`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Config::from_json(&text)
}

impl Config {
    /// Parse a JSON document, check required keys, then validate values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: Value = serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        check_required_keys(&raw)?;
        let config: Config =
            serde_json::from_value(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Range and consistency checks that the schema alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.temperature;
        if t.sensor_ranges.is_empty() {
            return Err(invalid("temperature.sensor_ranges must not be empty"));
        }
        if t.sensor_ranges.iter().any(|b| !b.is_finite()) {
            return Err(invalid("temperature.sensor_ranges must be finite numbers"));
        }
        if t.sensor_ranges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("temperature.sensor_ranges must be strictly ascending"));
        }
        if t.sensor_colours.len() != t.sensor_ranges.len() + 1 {
            return Err(ConfigError::Invalid(format!(
                "temperature.sensor_colours needs {} entries, found {}",
                t.sensor_ranges.len() + 1,
                t.sensor_colours.len()
            )));
        }
        if t.update_seconds == 0 {
            return Err(invalid("temperature.update_seconds must be positive"));
        }

        let strip = &self.led_strip;
        if strip.light.unsigned_abs() as usize > strip.length {
            return Err(invalid("led_strip.light exceeds led_strip.length"));
        }
        if strip.max_brightness > 31 {
            return Err(invalid("led_strip.max_brightness must be 0-31"));
        }
        if strip.brightness > 100 {
            return Err(invalid("led_strip.brightness must be 0-100"));
        }

        let speed = self.timing.speed_in_seconds;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(invalid("timing.speed_in_seconds must be positive"));
        }

        if self.light_modes.is_empty() {
            return Err(invalid("light_modes must not be empty"));
        }
        for (i, mode) in self.light_modes.iter().enumerate() {
            if self.light_modes[..i].contains(mode) {
                return Err(ConfigError::Invalid(format!("light_modes lists {mode} twice")));
            }
        }

        if self.display_mode(DisplayMode::Temperature.name()).is_none() {
            return Err(invalid("display_modes needs a Temperature entry"));
        }
        Ok(())
    }

    /// Catalog entry for the named display mode.
    pub fn display_mode(&self, name: &str) -> Option<&DisplayModeConfig> {
        self.display_modes.iter().find(|m| m.name == name)
    }

    /// Rainbow animation step interval.
    pub fn speed(&self) -> Duration {
        Duration::from_secs_f64(self.timing.speed_in_seconds)
    }

    /// Sensor polling interval.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.temperature.update_seconds)
    }
}

impl MqttConfig {
    pub fn display_set_topic(&self) -> String {
        format!("{}/set", self.display_topic)
    }

    pub fn light_set_topic(&self) -> String {
        format!("{}/set", self.light_topic)
    }

    pub fn brightness_set_topic(&self) -> String {
        format!("{}/set", self.brightness_topic)
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

fn check_required_keys(raw: &Value) -> Result<(), ConfigError> {
    for pointer in REQUIRED_KEYS {
        if raw.pointer(pointer).is_none() {
            return Err(ConfigError::MissingKey(dotted(pointer)));
        }
    }
    if let Some(modes) = raw.pointer("/display_modes").and_then(Value::as_array) {
        for (i, mode) in modes.iter().enumerate() {
            for key in ["name", "menu"] {
                if mode.get(key).is_none() {
                    return Err(ConfigError::MissingKey(format!("display_modes[{i}].{key}")));
                }
            }
        }
    }
    Ok(())
}

fn dotted(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}
