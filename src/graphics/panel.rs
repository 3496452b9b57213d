//! Temperature readout composition.
//!
//! ```text
//!  ┌──────┬──────────────────────────┐
//!  │ menu │        21.5°             │  large font, centred
//!  │ 38px │                          │
//!  │      │         48.0%            │  small font, near bottom
//!  └──────┴──────────────────────────┘
//! ```
//!
//! The left strip belongs to the background image (the menu icons); text
//! is centred in the remaining width.  Number formatting is fixed-point
//! with one decimal and never depends on the process locale.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_1::{FONT_7X14, FONT_10X20};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::info;

use super::{HEIGHT, MonoImage, WIDTH};
use crate::app::modes::DisplayMode;
use crate::config::Config;
use crate::error::{Error, Result};

/// Width reserved for the menu strip on the left.
pub const MENU_STRIP_PX: i32 = 38;
/// Gap kept above the temperature and below the humidity.
const EDGE_PADDING_PX: i32 = 2;

pub fn format_temperature(celsius: f32) -> String {
    format!("{celsius:.1}\u{00b0}")
}

pub fn format_humidity(percent: f32) -> String {
    format!("{percent:.1}%")
}

/// Draw the readout over a copy of `background`.
pub fn render_temperature_panel(background: &MonoImage, celsius: f32, humidity: f32) -> MonoImage {
    let mut image = background.clone();
    let centre_x = MENU_STRIP_PX + (WIDTH as i32 - MENU_STRIP_PX) / 2;

    let top = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    let bottom = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Bottom)
        .build();

    let large = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
    let small = MonoTextStyle::new(&FONT_7X14, BinaryColor::On);

    // Drawing into a MonoImage cannot fail.
    let _ = Text::with_text_style(
        &format_temperature(celsius),
        Point::new(centre_x, EDGE_PADDING_PX),
        large,
        top,
    )
    .draw(&mut image);
    let _ = Text::with_text_style(
        &format_humidity(humidity),
        Point::new(centre_x, HEIGHT as i32 - EDGE_PADDING_PX),
        small,
        bottom,
    )
    .draw(&mut image);

    image
}

/// Images for the Temperature display mode, decoded once at startup.
#[derive(Debug, Clone, Default)]
pub struct PanelAssets {
    /// Shown until the first reading arrives.
    pub menu: MonoImage,
    /// Canvas for the readout.  Blank when the catalog names none.
    pub background: MonoImage,
}

impl PanelAssets {
    pub fn load(config: &Config) -> Result<Self> {
        let mode = config
            .display_mode(DisplayMode::Temperature.name())
            .ok_or_else(|| Error::Asset("no Temperature display mode".into()))?;
        let menu = MonoImage::load(&mode.menu)?;
        let background = match &mode.background {
            Some(path) => MonoImage::load(path)?,
            None => MonoImage::blank(),
        };
        info!("Loaded display assets from {}", mode.menu.display());
        Ok(Self { menu, background })
    }
}
