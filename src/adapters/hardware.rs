//! Hardware adapter — bridges Raspberry Pi peripherals to the port traits.
//!
//! This is the only module that touches real hardware, and it only
//! exists with the `rpi` feature:
//!
//! | Peripheral      | Bus        | Port              |
//! |-----------------|------------|-------------------|
//! | APA102 strip    | SPI0       | `LedStripPort`    |
//! | SSD1306 OLED    | I2C1       | `DisplayPort`     |
//! | DHT sensor      | GPIO (bit-banged) | `ClimateSensor` |
//! | Two buttons     | GPIO IRQ   | `InputPort`       |

use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use rppal::gpio::{Gpio, InputPin, IoPin, Level, Mode, Trigger};
use rppal::i2c::I2c;
use rppal::spi::{Bus, Mode as SpiMode, SlaveSelect, Spi};

use crate::app::ports::{ClimateSensor, InputPort};
use crate::config::{InputsConfig, LedStripConfig, TemperatureConfig};
use crate::drivers::apa102::Apa102;
use crate::drivers::button::{ButtonHandler, DEBOUNCE};
use crate::drivers::ssd1306::Ssd1306;
use crate::error::{DeviceError, SensorError};
use crate::events::{Event, EventSender};
use crate::pins;
use crate::sensors::Reading;
use crate::sensors::dht::{self, FRAME_BITS, SensorKind};

// ── Bus peripherals ───────────────────────────────────────────

pub fn open_strip(config: &LedStripConfig) -> Result<Apa102<Spi>, DeviceError> {
    let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, pins::STRIP_SPI_HZ, SpiMode::Mode0)
        .map_err(|e| {
            error!("SPI0 open failed: {}", e);
            DeviceError::Unavailable
        })?;
    info!("LED strip on SPI0: {} pixels", config.length);
    Ok(Apa102::new(spi, config.length, config.max_brightness))
}

pub fn open_display() -> Result<Ssd1306<I2c>, DeviceError> {
    let i2c = I2c::new().map_err(|e| {
        error!("I2C open failed: {}", e);
        DeviceError::Unavailable
    })?;
    let mut oled = Ssd1306::new(i2c, pins::OLED_I2C_ADDR);
    oled.init()?;
    info!("OLED on I2C1 at {:#04x}", pins::OLED_I2C_ADDR);
    Ok(oled)
}

fn gpio_err(e: rppal::gpio::Error) -> DeviceError {
    error!("GPIO failure: {}", e);
    DeviceError::GpioFailed
}

// ── DHT sensor ────────────────────────────────────────────────

/// Longest a single level may last inside a frame.
const LEVEL_TIMEOUT: Duration = Duration::from_micros(200);
/// How long to wait for the sensor to answer the start signal.
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(1);

pub struct DhtSensor {
    pin: IoPin,
    kind: SensorKind,
}

impl DhtSensor {
    pub fn open(gpio: &Gpio, config: &TemperatureConfig) -> Result<Self, DeviceError> {
        let pin = gpio
            .get(config.pin)
            .map_err(gpio_err)?
            .into_io(Mode::Output);
        info!("{:?} sensor on BCM {}", config.sensor_type, config.pin);
        Ok(Self {
            pin,
            kind: config.sensor_type,
        })
    }

    /// Time spent at `level`, in microseconds.
    fn level_duration(&self, level: Level, timeout: Duration) -> Option<u32> {
        let start = Instant::now();
        while self.pin.read() == level {
            if start.elapsed() > timeout {
                return None;
            }
        }
        Some(start.elapsed().as_micros() as u32)
    }

    fn capture(&mut self) -> Result<Vec<(u32, u32)>, SensorError> {
        self.pin.set_mode(Mode::Output);
        self.pin.set_low();
        thread::sleep(Duration::from_micros(self.kind.start_signal_us()));
        self.pin.set_high();
        self.pin.set_mode(Mode::Input);

        // Sensor pulls low, then high, before the first bit.
        self.level_duration(Level::High, RESPONSE_TIMEOUT)
            .ok_or(SensorError::NoResponse)?;
        let mut pulses = Vec::with_capacity(FRAME_BITS + 1);
        for _ in 0..=FRAME_BITS {
            let Some(low) = self.level_duration(Level::Low, LEVEL_TIMEOUT) else {
                break;
            };
            let Some(high) = self.level_duration(Level::High, LEVEL_TIMEOUT) else {
                break;
            };
            pulses.push((low, high));
        }
        Ok(pulses)
    }
}

impl ClimateSensor for DhtSensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        let pulses = self.capture()?;
        let frame = dht::frame_from_pulses(&pulses)?;
        dht::decode(self.kind, frame)
    }
}

// ── Buttons ───────────────────────────────────────────────────

/// Both buttons, registered for falling-edge interrupts.
pub struct GpioButtons {
    pins: Vec<InputPin>,
}

impl GpioButtons {
    pub fn register(
        gpio: &Gpio,
        inputs: &InputsConfig,
        events: &EventSender,
    ) -> Result<Self, DeviceError> {
        let wiring = [
            ("light", inputs.buttons_light, Event::LightButton),
            ("display", inputs.buttons_display, Event::DisplayButton),
        ];
        let mut pins = Vec::with_capacity(wiring.len());
        for (name, bcm, event) in wiring {
            let mut pin = gpio.get(bcm).map_err(gpio_err)?.into_input_pullup();
            let handler = ButtonHandler::new(name, event, DEBOUNCE, events.clone());
            pin.set_async_interrupt(Trigger::FallingEdge, Some(DEBOUNCE), move |_| {
                handler.on_edge();
            })
            .map_err(gpio_err)?;
            info!("{} button on BCM {}", name, bcm);
            pins.push(pin);
        }
        Ok(Self { pins })
    }
}

impl InputPort for GpioButtons {
    fn release(&mut self) {
        for pin in &mut self.pins {
            if let Err(e) = pin.clear_async_interrupt() {
                warn!("Failed to release BCM {}: {}", pin.pin(), e);
            }
        }
        info!("Button interrupts released");
    }
}
