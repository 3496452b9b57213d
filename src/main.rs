//! NightLightPi — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Apa102 (SPI)   Ssd1306 (I2C)   DhtSensor   GpioButtons        │
//! │  MqttClient / LogPublisher                                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        NightLight coordinator (event queue)            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  SensorPoller thread · Runtime (one-shot shutdown)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use rppal::gpio::Gpio;
use tokio::signal::unix::{SignalKind, signal};

use nightlightpi::adapters::hardware::{DhtSensor, GpioButtons, open_display, open_strip};
use nightlightpi::adapters::log_sink::LogPublisher;
use nightlightpi::adapters::mqtt::MqttClient;
use nightlightpi::app::lifecycle::Runtime;
use nightlightpi::app::ports::Publisher;
use nightlightpi::app::service::{Devices, NightLight};
use nightlightpi::config;
use nightlightpi::drivers::display::DisplayController;
use nightlightpi::drivers::light_strip::LightStripController;
use nightlightpi::events::event_queue;
use nightlightpi::graphics::panel::PanelAssets;
use nightlightpi::sensors::RetryPolicy;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("NightLightPi v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration and assets ───────────────────────────
    let config = Arc::new(config::load_config().context("loading configuration")?);
    let assets = PanelAssets::load(&config).context("loading display images")?;

    // ── 3. Messaging ──────────────────────────────────────────
    let (tx, rx) = event_queue();
    let publisher: Arc<dyn Publisher> = if config.mqtt.enable {
        Arc::new(MqttClient::connect(&config.mqtt, tx.clone()).context("starting MQTT client")?)
    } else {
        warn!("MQTT disabled, state updates go to the log only");
        Arc::new(LogPublisher::new())
    };

    // ── 4. Peripherals ────────────────────────────────────────
    let strip = open_strip(&config.led_strip).context("opening LED strip")?;
    let oled = open_display().context("opening OLED")?;
    let gpio = Gpio::new().context("opening GPIO")?;
    let sensor = DhtSensor::open(&gpio, &config.temperature).context("opening sensor")?;
    let buttons = GpioButtons::register(&gpio, &config.inputs, &tx).context("registering buttons")?;

    let devices = Devices {
        strip: Arc::new(LightStripController::new(Box::new(strip), config.led_strip.light)),
        display: Arc::new(DisplayController::new(Box::new(oled))),
        publisher,
    };

    // ── 5. Run ────────────────────────────────────────────────
    let night_light = NightLight::new(Arc::clone(&config), assets, devices);
    let runtime = Runtime::launch(
        night_light,
        (tx, rx),
        Box::new(sensor),
        RetryPolicy::default(),
        Box::new(buttons),
    )
    .context("starting night light")?;

    // ── 6. Wait for SIGINT / SIGTERM ──────────────────────────
    let signals = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building signal runtime")?;
    let reason = signals
        .block_on(async {
            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::select! {
                r = tokio::signal::ctrl_c() => r.map(|()| "SIGINT"),
                _ = sigterm.recv() => Ok("SIGTERM"),
            }
        })
        .context("waiting for shutdown signal")?;
    info!("{} received", reason);

    runtime.shutdown();
    Ok(())
}
