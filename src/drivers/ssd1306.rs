//! SSD1306 128×64 OLED over I²C.
//!
//! Every I²C write starts with a control byte: `0x00` for a command
//! stream, `0x40` for GDDRAM data.  The panel runs in horizontal
//! addressing mode, so a full frame is the column/page window followed by
//! the 1024 frame-buffer bytes in page order.

use embedded_hal::i2c::I2c;

use crate::app::ports::DisplayPort;
use crate::error::DeviceError;
use crate::graphics::MonoImage;

/// Default 7-bit address (SA0 low).
pub const DEFAULT_ADDRESS: u8 = 0x3C;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;
/// Data bytes per I²C write, after the control byte.
const DATA_CHUNK: usize = 16;

/// Power-up sequence for a 128×64 panel with the internal charge pump.
const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH deselect
    0xA4, // resume from RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

const WINDOW: &[u8] = &[
    0x21, 0, 127, // columns
    0x22, 0, 7, // pages
];

pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    buffer: MonoImage,
}

impl<I2C: I2c> Ssd1306<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: MonoImage::blank(),
        }
    }

    /// Send the power-up sequence.  Call once before the first `show`.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        self.commands(INIT_SEQUENCE)
    }

    fn commands(&mut self, cmds: &[u8]) -> Result<(), DeviceError> {
        let mut msg = Vec::with_capacity(cmds.len() + 1);
        msg.push(CONTROL_COMMAND);
        msg.extend_from_slice(cmds);
        self.i2c
            .write(self.address, &msg)
            .map_err(|_| DeviceError::I2cWriteFailed)
    }
}

impl<I2C: I2c + Send> DisplayPort for Ssd1306<I2C> {
    fn image(&mut self, image: &MonoImage) {
        self.buffer = image.clone();
    }

    fn clear(&mut self) {
        self.buffer = MonoImage::blank();
    }

    fn show(&mut self) -> Result<(), DeviceError> {
        self.commands(WINDOW)?;
        let mut msg = [0u8; DATA_CHUNK + 1];
        msg[0] = CONTROL_DATA;
        for chunk in self.buffer.as_bytes().chunks(DATA_CHUNK) {
            msg[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c
                .write(self.address, &msg[..=chunk.len()])
                .map_err(|_| DeviceError::I2cWriteFailed)?;
        }
        Ok(())
    }
}
