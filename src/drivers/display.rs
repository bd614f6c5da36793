//! E-paper panel behind the status console.
//!
//! Owns the SSD1677 driver plus one strip buffer; the console hands it a
//! draw closure and the panel replays it once per strip.

use embedded_graphics_core::geometry::Size;
use esp_hal::delay::Delay;
use log::info;
use sd_demo_core::{Panel, Refresh};

use super::ssd1677::{HEIGHT, WIDTH};
use super::strip::StripBuffer;
use crate::board::{DisplayHw, Epd};

pub struct EpdPanel {
    epd: Epd,
    strip: StripBuffer,
    delay: Delay,
}

impl EpdPanel {
    /// Reset and configure the controller. Nothing is shown until the
    /// first refresh.
    pub fn new(hw: DisplayHw) -> Self {
        let mut delay = Delay::new();
        let mut epd = hw.epd;
        epd.init(&mut delay);
        info!("display: {}x{} ready", WIDTH, HEIGHT);

        Self {
            epd,
            strip: StripBuffer::new(),
            delay,
        }
    }

    pub fn sleep(&mut self) {
        self.epd.hibernate(&mut self.delay);
        info!("display: hibernating");
    }
}

impl Panel for EpdPanel {
    type Target = StripBuffer;

    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }

    fn refresh<F>(&mut self, area: Refresh, draw: F)
    where
        F: Fn(&mut StripBuffer),
    {
        match area {
            Refresh::Full => self.epd.render_full(&mut self.strip, &mut self.delay, draw),
            Refresh::Window(r) => {
                self.epd
                    .render_partial(&mut self.strip, r, &mut self.delay, draw)
            }
        }
    }
}
