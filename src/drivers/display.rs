//! Lock-guarded OLED controller.

use std::sync::{Mutex, PoisonError};

use crate::app::ports::DisplayPort;
use crate::error::DeviceError;
use crate::graphics::MonoImage;

pub struct DisplayController {
    panel: Mutex<Box<dyn DisplayPort>>,
}

impl DisplayController {
    pub fn new(panel: Box<dyn DisplayPort>) -> Self {
        Self {
            panel: Mutex::new(panel),
        }
    }

    /// Show `image`.  The lock spans buffer copy and transfer.
    pub fn render(&self, image: &MonoImage) -> Result<(), DeviceError> {
        let mut panel = self.panel.lock().unwrap_or_else(PoisonError::into_inner);
        panel.image(image);
        panel.show()
    }

    pub fn clear(&self) -> Result<(), DeviceError> {
        let mut panel = self.panel.lock().unwrap_or_else(PoisonError::into_inner);
        panel.clear();
        panel.show()
    }
}
