//! Peripheral drivers, device controllers and colour patterns.

pub mod apa102;
pub mod button;
pub mod display;
pub mod led_patterns;
pub mod light_strip;
pub mod ssd1306;
