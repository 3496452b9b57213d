//! Mock adapters for integration tests.
//!
//! Every mock records into shared state behind an `Arc`, so a test keeps
//! a handle to the record after the mock itself has been boxed and moved
//! into a controller or the runtime.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use nightlightpi::app::ports::{ClimateSensor, DisplayPort, InputPort, LedStripPort, Publisher};
use nightlightpi::app::service::{Devices, NightLight};
use nightlightpi::config::Config;
use nightlightpi::drivers::display::DisplayController;
use nightlightpi::drivers::led_patterns::Rgb;
use nightlightpi::drivers::light_strip::LightStripController;
use nightlightpi::error::{CommsError, DeviceError, SensorError};
use nightlightpi::graphics::MonoImage;
use nightlightpi::graphics::panel::PanelAssets;
use nightlightpi::sensors::Reading;

pub const SAMPLE_CONFIG: &str = include_str!("../../config/nightlightpi.json");

pub type Pixels = Vec<Option<(Rgb, u8)>>;

// ── Strip ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StripRecord {
    /// Every committed frame, oldest first.
    pub frames: Vec<Pixels>,
    /// While set, `show` fails and records nothing.
    pub failing: bool,
}

#[allow(dead_code)]
impl StripRecord {
    pub fn last(&self) -> Option<&Pixels> {
        self.frames.last()
    }

    /// Colour of the first lit pixel in the last frame.
    pub fn last_colour(&self) -> Option<(Rgb, u8)> {
        self.last().and_then(|f| f.iter().flatten().next().copied())
    }

    pub fn last_is_dark(&self) -> bool {
        self.last().is_some_and(|f| f.iter().all(Option::is_none))
    }
}

pub struct MockStrip {
    record: Arc<Mutex<StripRecord>>,
    pending: Pixels,
}

impl LedStripPort for MockStrip {
    fn len(&self) -> usize {
        self.pending.len()
    }

    fn set_pixel(&mut self, index: usize, colour: Rgb, brightness: u8) -> Result<(), DeviceError> {
        let px = self
            .pending
            .get_mut(index)
            .ok_or(DeviceError::PixelOutOfRange)?;
        *px = Some((colour, brightness));
        Ok(())
    }

    fn clear(&mut self) {
        self.pending.fill(None);
    }

    fn show(&mut self) -> Result<(), DeviceError> {
        let mut record = self.record.lock().unwrap();
        if record.failing {
            return Err(DeviceError::SpiWriteFailed);
        }
        record.frames.push(self.pending.clone());
        Ok(())
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct DisplayRecord {
    pub shown: Vec<MonoImage>,
    /// While set, `show` fails and records nothing.
    pub failing: bool,
}

#[allow(dead_code)]
impl DisplayRecord {
    pub fn last(&self) -> Option<&MonoImage> {
        self.shown.last()
    }
}

pub struct MockDisplay {
    record: Arc<Mutex<DisplayRecord>>,
    buffer: MonoImage,
}

impl DisplayPort for MockDisplay {
    fn image(&mut self, image: &MonoImage) {
        self.buffer = image.clone();
    }

    fn clear(&mut self) {
        self.buffer = MonoImage::blank();
    }

    fn show(&mut self) -> Result<(), DeviceError> {
        let mut record = self.record.lock().unwrap();
        if record.failing {
            return Err(DeviceError::I2cWriteFailed);
        }
        record.shown.push(self.buffer.clone());
        Ok(())
    }
}

// ── Publisher ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

#[derive(Default)]
pub struct MockPublisher {
    pub messages: Mutex<Vec<Published>>,
    pub disconnects: AtomicU32,
    /// While set, every publish is rejected.
    pub failing: AtomicBool,
}

#[allow(dead_code)]
impl MockPublisher {
    pub fn on_topic(&self, topic: &str) -> Vec<Published> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn forget(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl Publisher for MockPublisher {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), CommsError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CommsError::PublishFailed);
        }
        self.messages.lock().unwrap().push(Published {
            topic: topic.to_string(),
            payload: payload.to_string(),
            retain,
        });
        Ok(())
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Inputs ────────────────────────────────────────────────────

pub struct MockInputs {
    pub releases: Arc<AtomicU32>,
}

impl InputPort for MockInputs {
    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// Replays scripted results, then fails forever.
pub struct ScriptedSensor {
    pub script: VecDeque<Result<Reading, SensorError>>,
}

impl ClimateSensor for ScriptedSensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.script
            .pop_front()
            .unwrap_or(Err(SensorError::NoResponse))
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A coordinator wired to recording mocks.
pub struct Rig {
    pub config: Arc<Config>,
    pub assets: PanelAssets,
    pub devices: Devices,
    pub strip: Arc<Mutex<StripRecord>>,
    pub display: Arc<Mutex<DisplayRecord>>,
    pub publisher: Arc<MockPublisher>,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(Config::from_json(SAMPLE_CONFIG).unwrap())
    }

    pub fn with_config(config: Config) -> Self {
        let strip = Arc::new(Mutex::new(StripRecord::default()));
        let display = Arc::new(Mutex::new(DisplayRecord::default()));
        let publisher = Arc::new(MockPublisher::default());

        let mock_strip = MockStrip {
            record: Arc::clone(&strip),
            pending: vec![None; config.led_strip.length],
        };
        let mock_display = MockDisplay {
            record: Arc::clone(&display),
            buffer: MonoImage::blank(),
        };
        let devices = Devices {
            strip: Arc::new(LightStripController::new(
                Box::new(mock_strip),
                config.led_strip.light,
            )),
            display: Arc::new(DisplayController::new(Box::new(mock_display))),
            publisher: Arc::clone(&publisher) as Arc<dyn Publisher>,
        };

        let mut menu = MonoImage::blank();
        menu.set(5, 5, true);
        let mut background = MonoImage::blank();
        background.set(0, 63, true);

        Self {
            config: Arc::new(config),
            assets: PanelAssets { menu, background },
            devices,
            strip,
            display,
            publisher,
        }
    }

    pub fn night_light(&self) -> NightLight {
        NightLight::new(
            Arc::clone(&self.config),
            self.assets.clone(),
            self.devices.clone(),
        )
    }

    /// A started coordinator with the startup publishes forgotten.
    pub fn started(&self) -> NightLight {
        let mut nl = self.night_light();
        nl.start().unwrap();
        self.publisher.forget();
        nl
    }

    pub fn strip_frames(&self) -> usize {
        self.strip.lock().unwrap().frames.len()
    }

    pub fn display_frames(&self) -> usize {
        self.display.lock().unwrap().shown.len()
    }

    pub fn last_panel(&self) -> Option<MonoImage> {
        self.display.lock().unwrap().last().cloned()
    }
}

pub fn reading(temperature_c: f32, humidity_pct: f32) -> Reading {
    Reading {
        temperature_c,
        humidity_pct,
    }
}
