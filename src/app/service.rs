//! Mode coordinator — the hexagonal core.
//!
//! [`NightLight`] owns every piece of runtime state (light mode, display
//! mode, brightness, latest reading, rainbow phase) and is the only thing
//! that mutates it.  Each [`Event`] is applied as one step: mutate state,
//! drive the strip and panel, publish the new state.  All I/O flows
//! through the controllers and the [`Publisher`] port, so the whole
//! service runs against mocks on the host.
//!
//! ```text
//!  Event queue ──▶ ┌───────────────────────────┐ ──▶ LightStripController
//!                  │        NightLight         │ ──▶ DisplayController
//!  rainbow tick ─▶ │  modes · brightness · Δt  │ ──▶ Publisher
//!                  └───────────────────────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use super::commands::RemoteCommand;
use super::modes::{DisplayMode, LightMode};
use super::ports::Publisher;
use crate::config::Config;
use crate::drivers::display::DisplayController;
use crate::drivers::led_patterns::{self, PLACEHOLDER_HUE, TemperaturePalette};
use crate::drivers::light_strip::LightStripController;
use crate::error::Result;
use crate::events::Event;
use crate::graphics::panel::{PanelAssets, render_temperature_panel};
use crate::sensors::Reading;

/// Queue wait when no animation is running.  Bounds how long the loop
/// takes to notice a cleared run flag.
const IDLE_WAIT: Duration = Duration::from_millis(250);

// ───────────────────────────────────────────────────────────────
// Devices
// ───────────────────────────────────────────────────────────────

/// Shared handles to everything the coordinator drives.  Shutdown holds
/// a second set of the same handles.
#[derive(Clone)]
pub struct Devices {
    pub strip: Arc<LightStripController>,
    pub display: Arc<DisplayController>,
    pub publisher: Arc<dyn Publisher>,
}

// ───────────────────────────────────────────────────────────────
// Runtime state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeState {
    pub light_index: usize,
    pub display_mode: DisplayMode,
    /// Percent of the strip's hardware ceiling.
    pub brightness: u8,
    pub reading: Option<Reading>,
    pub rainbow_phase: u8,
}

// ───────────────────────────────────────────────────────────────
// NightLight
// ───────────────────────────────────────────────────────────────

pub struct NightLight {
    config: Arc<Config>,
    assets: PanelAssets,
    devices: Devices,
    state: RuntimeState,
}

impl NightLight {
    /// Build the coordinator.  Nothing is driven until [`start`](Self::start).
    pub fn new(config: Arc<Config>, assets: PanelAssets, devices: Devices) -> Self {
        let state = RuntimeState {
            light_index: 0,
            display_mode: DisplayMode::Temperature,
            brightness: config.led_strip.brightness,
            reading: None,
            rainbow_phase: 0,
        };
        Self {
            config,
            assets,
            devices,
            state,
        }
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    pub fn light_mode(&self) -> LightMode {
        self.config.light_modes[self.state.light_index]
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Apply the initial modes: first configured light mode, Temperature
    /// on the panel (menu image until a reading arrives).
    pub fn start(&mut self) -> Result<()> {
        self.state.light_index = 0;
        self.state.display_mode = DisplayMode::Temperature;
        self.apply_light_mode()?;
        self.apply_display_mode()?;
        info!(
            "NightLight started: light={} display={} brightness={}",
            self.light_mode(),
            self.state.display_mode,
            self.state.brightness
        );
        Ok(())
    }

    /// Consume events until `Shutdown`, a cleared run flag or a closed
    /// queue, stepping the rainbow in between.  Failed events are logged
    /// and the loop carries on.
    pub fn run(mut self, events: &Receiver<Event>, running: &AtomicBool) {
        let speed = self.config.speed();
        let mut next_tick = Instant::now() + speed;

        while running.load(Ordering::Acquire) {
            let wait = if self.light_mode() == LightMode::Rainbow {
                next_tick.saturating_duration_since(Instant::now())
            } else {
                IDLE_WAIT
            };

            match events.recv_timeout(wait) {
                Ok(Event::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(event) => {
                    if let Err(e) = self.handle(event.clone()) {
                        error!("Failed to handle {:?}: {}", event, e);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            let now = Instant::now();
            if self.light_mode() != LightMode::Rainbow {
                next_tick = now + speed;
            } else if now >= next_tick {
                if let Err(e) = self.tick() {
                    error!("Rainbow step failed: {}", e);
                }
                next_tick = now + speed;
            }
        }
        info!("Coordinator loop exited");
    }

    // ── Event handling ────────────────────────────────────────

    pub fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::ReadingUpdated(reading) => self.on_reading(reading),
            Event::LightButton => self.on_light_button(),
            Event::DisplayButton => self.on_display_button(),
            Event::Remote(RemoteCommand::SetDisplay(name)) => self.set_display_mode(&name),
            Event::Remote(RemoteCommand::SetLight(name)) => self.set_light_mode(&name),
            Event::Remote(RemoteCommand::SetBrightness(raw)) => self.set_brightness(&raw),
            Event::Shutdown => Ok(()),
        }
    }

    fn on_reading(&mut self, reading: Reading) -> Result<()> {
        self.state.reading = Some(reading);
        let topics = &self.config.mqtt;
        self.publish(
            &topics.temperature_topic,
            &format!("{:.1}", reading.temperature_c),
        );
        self.publish(&topics.humidity_topic, &format!("{:.1}", reading.humidity_pct));

        if self.state.display_mode == DisplayMode::Temperature {
            self.render_temperature()?;
        }
        if self.light_mode() == LightMode::Temperature {
            self.show_temperature_colour()?;
        }
        Ok(())
    }

    fn on_light_button(&mut self) -> Result<()> {
        let next = (self.state.light_index + 1) % self.config.light_modes.len();
        let mode = self.config.light_modes[next];
        info!("Light button: switching to {}", mode);
        // The mode only changes once the sweep has reached the strip.
        if mode == LightMode::Rainbow {
            for colour in led_patterns::quick_sweep() {
                self.devices.strip.set_all(colour, self.state.brightness)?;
            }
            self.state.rainbow_phase = 0;
        }
        self.state.light_index = next;
        self.apply_light_mode()
    }

    fn on_display_button(&mut self) -> Result<()> {
        match self.state.display_mode.toggled() {
            Some(next) => {
                info!("Display button: switching to {}", next);
                self.state.display_mode = next;
                self.apply_display_mode()
            }
            None => {
                info!(
                    "Display button ignored in mode {}",
                    self.state.display_mode
                );
                Ok(())
            }
        }
    }

    fn set_display_mode(&mut self, name: &str) -> Result<()> {
        let mode = DisplayMode::from_name(name);
        if let DisplayMode::Unrecognised(_) = mode {
            warn!("Unknown display mode '{}', publishing without rendering", name);
        } else {
            info!("Remote display mode: {}", mode);
        }
        self.state.display_mode = mode;
        self.apply_display_mode()
    }

    fn set_light_mode(&mut self, name: &str) -> Result<()> {
        let Some(index) = LightMode::from_name(name)
            .and_then(|mode| self.config.light_modes.iter().position(|m| *m == mode))
        else {
            warn!("Ignoring unknown light mode '{}'", name);
            return Ok(());
        };
        info!("Remote light mode: {}", name);
        self.state.light_index = index;
        self.apply_light_mode()
    }

    fn set_brightness(&mut self, raw: &str) -> Result<()> {
        let brightness = match raw.trim().parse::<u8>() {
            Ok(b) if b <= 100 => b,
            Ok(b) => {
                warn!("Brightness {} out of range 0-100, keeping {}", b, self.state.brightness);
                return Ok(());
            }
            Err(e) => {
                warn!(
                    "Invalid brightness '{}' ({}), keeping {}",
                    raw, e, self.state.brightness
                );
                return Ok(());
            }
        };
        info!("Brightness set to {}", brightness);
        self.state.brightness = brightness;
        if self.light_mode() == LightMode::Temperature {
            self.show_temperature_colour()?;
        }
        let topic = &self.config.mqtt.brightness_topic;
        self.publish(topic, &brightness.to_string());
        Ok(())
    }

    /// One rainbow animation step.
    pub fn tick(&mut self) -> Result<()> {
        self.state.rainbow_phase = led_patterns::next_phase(self.state.rainbow_phase);
        self.devices.strip.set_all(
            led_patterns::wheel(self.state.rainbow_phase),
            self.state.brightness,
        )?;
        Ok(())
    }

    // ── Apply ─────────────────────────────────────────────────

    fn apply_light_mode(&mut self) -> Result<()> {
        match self.light_mode() {
            LightMode::Off => self.devices.strip.clear()?,
            LightMode::Temperature => self.show_temperature_colour()?,
            LightMode::Rainbow => {}
        }
        let mode = self.light_mode();
        self.publish(&self.config.mqtt.light_topic, mode.name());
        Ok(())
    }

    fn apply_display_mode(&mut self) -> Result<()> {
        match self.state.display_mode {
            DisplayMode::Temperature => self.render_temperature()?,
            DisplayMode::Off => self.devices.display.clear()?,
            DisplayMode::Unrecognised(_) => {}
        }
        self.publish(
            &self.config.mqtt.display_topic,
            self.state.display_mode.name(),
        );
        Ok(())
    }

    fn render_temperature(&self) -> Result<()> {
        match self.state.reading {
            Some(r) => {
                let panel =
                    render_temperature_panel(&self.assets.background, r.temperature_c, r.humidity_pct);
                self.devices.display.render(&panel)?;
            }
            None => self.devices.display.render(&self.assets.menu)?,
        }
        Ok(())
    }

    fn show_temperature_colour(&self) -> Result<()> {
        let colour = match self.state.reading {
            Some(r) => {
                let t = &self.config.temperature;
                TemperaturePalette::new(&t.sensor_ranges, &t.sensor_colours)
                    .colour_for(r.temperature_c)
            }
            None => led_patterns::wheel(PLACEHOLDER_HUE),
        };
        self.devices.strip.set_all(colour, self.state.brightness)?;
        Ok(())
    }

    /// Retained publish; messaging failures never fail an event.
    fn publish(&self, topic: &str, payload: &str) {
        if let Err(e) = self.devices.publisher.publish(topic, payload, true) {
            warn!("Publish to {} failed: {}", topic, e);
        }
    }
}
