//! 1-bit frame buffer for the 128×64 OLED.
//!
//! The buffer uses the SSD1306 page layout: eight pages of 128 columns,
//! one byte per column per page, least significant bit at the top.  That
//! lets the display driver stream [`MonoImage::as_bytes`] straight into
//! the panel's GDDRAM without reshuffling.
//!
//! [`MonoImage`] is an `embedded-graphics` draw target, so text and
//! primitives can be drawn onto it directly.

pub mod panel;

use core::convert::Infallible;
use std::path::Path;

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use image::GrayImage;

use crate::error::{Error, Result};

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;
pub const BUFFER_LEN: usize = WIDTH * PAGES;

/// Luma at or above this value is an "on" pixel.
const LUMA_THRESHOLD: u8 = 128;

#[derive(Clone, PartialEq, Eq)]
pub struct MonoImage {
    buf: [u8; BUFFER_LEN],
}

impl MonoImage {
    /// All pixels off.
    pub fn blank() -> Self {
        Self {
            buf: [0; BUFFER_LEN],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.buf[(y / 8) * WIDTH + x] & (1 << (y % 8)) != 0
    }

    /// Out-of-bounds writes are dropped.
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let byte = &mut self.buf[(y / 8) * WIDTH + x];
        if on {
            *byte |= 1 << (y % 8);
        } else {
            *byte &= !(1 << (y % 8));
        }
    }

    pub fn is_blank(&self) -> bool {
        self.buf.iter().all(|b| *b == 0)
    }

    /// Number of lit pixels.
    pub fn lit(&self) -> u32 {
        self.buf.iter().map(|b| b.count_ones()).sum()
    }

    /// Page-major bytes, ready for the panel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Threshold a greyscale image of exactly the panel size.
    pub fn from_luma(img: &GrayImage) -> Result<Self> {
        if img.width() as usize != WIDTH || img.height() as usize != HEIGHT {
            return Err(Error::Asset(format!(
                "image is {}x{}, panel is {}x{}",
                img.width(),
                img.height(),
                WIDTH,
                HEIGHT
            )));
        }
        let mut out = Self::blank();
        for (x, y, px) in img.enumerate_pixels() {
            out.set(x as usize, y as usize, px.0[0] >= LUMA_THRESHOLD);
        }
        Ok(out)
    }

    /// Load a PBM/PGM/PPM or PNG asset from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .map_err(|e| Error::Asset(format!("{}: {}", path.display(), e)))?;
        Self::from_luma(&img.to_luma8()).map_err(|e| match e {
            Error::Asset(msg) => Error::Asset(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }
}

impl Default for MonoImage {
    fn default() -> Self {
        Self::blank()
    }
}

impl core::fmt::Debug for MonoImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "MonoImage({}x{}, {} lit)", WIDTH, HEIGHT, self.lit())
    }
}

impl OriginDimensions for MonoImage {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for MonoImage {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, colour) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set(x, y, colour.is_on());
            }
        }
        Ok(())
    }
}
