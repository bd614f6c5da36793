// SSD1677 e-paper controller (GDEQ0426T82, 800x480), landscape only.
// Timings and init sequence follow GxEPD2_426_GDEQ0426T82 by Jean-Marc Zingg.
// No framebuffer: frames are streamed into controller RAM strip by strip.

use embedded_graphics_core::geometry::Size;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use esp_hal::delay::Delay;
use log::debug;
use sd_demo_core::Region;

use super::strip::{STRIP_COUNT, StripBuffer};

pub const WIDTH: u16 = 800;
pub const HEIGHT: u16 = 480;

pub const SPI_FREQ_MHZ: u32 = 20;

const POWER_OFF_TIME_MS: u32 = 200;
const FULL_REFRESH_TIME_MS: u32 = 1600;
const PARTIAL_REFRESH_TIME_MS: u32 = 600;

mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const BOOSTER_SOFT_START: u8 = 0x0C;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMPERATURE_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_1: u8 = 0x21;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24; // new frame
    pub const WRITE_RAM_RED: u8 = 0x26; // previous frame, for differential refresh
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

pub struct DisplayDriver<SPI, DC, RST, BUSY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    power_is_on: bool,
    init_done: bool,
    initial_refresh: bool,
}

impl<SPI, DC, RST, BUSY> DisplayDriver<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            power_is_on: false,
            init_done: false,
            initial_refresh: true,
        }
    }

    pub fn reset(&mut self, delay: &mut Delay) {
        let _ = self.rst.set_high();
        delay.delay_millis(20);
        let _ = self.rst.set_low();
        delay.delay_millis(2);
        let _ = self.rst.set_high();
        delay.delay_millis(20);
    }

    pub fn init(&mut self, delay: &mut Delay) {
        self.reset(delay);
        self.init_display(delay);
    }

    /// Stream the whole frame into both RAM banks and do a full refresh.
    pub fn render_full<F>(&mut self, strip: &mut StripBuffer, delay: &mut Delay, draw: F)
    where
        F: Fn(&mut StripBuffer),
    {
        if !self.init_done {
            self.init_display(delay);
        }

        for &ram_cmd in &[cmd::WRITE_RAM_RED, cmd::WRITE_RAM_BW] {
            self.set_ram_area(Region::new(0, 0, WIDTH, HEIGHT));
            self.send_command(ram_cmd);

            for i in 0..STRIP_COUNT {
                strip.begin_strip(i);
                draw(strip);
                self.send_data(strip.data());
            }
        }

        self.update_full(delay);
        self.initial_refresh = false;
    }

    /// Repaint one region with a partial (differential) refresh.
    /// The first refresh after power-up is always promoted to full.
    pub fn render_partial<F>(
        &mut self,
        strip: &mut StripBuffer,
        region: Region,
        delay: &mut Delay,
        draw: F,
    ) where
        F: Fn(&mut StripBuffer),
    {
        if self.initial_refresh {
            return self.render_full(strip, delay, draw);
        }

        if !self.init_done {
            self.init_display(delay);
        }

        // controller addresses x in whole bytes
        let r = region
            .align8()
            .clamp_to(Size::new(WIDTH as u32, HEIGHT as u32));
        if r.is_empty() {
            return;
        }

        self.write_region(strip, r, cmd::WRITE_RAM_BW, &draw);
        self.set_ram_area(r);
        self.update_partial(delay);

        // sync the previous-frame bank so the next diff starts clean
        self.write_region(strip, r, cmd::WRITE_RAM_RED, &draw);
        self.write_region(strip, r, cmd::WRITE_RAM_BW, &draw);

        self.power_off(delay);
    }

    pub fn power_off(&mut self, delay: &mut Delay) {
        if self.power_is_on {
            self.write_reg(cmd::DISPLAY_UPDATE_CONTROL_2, &[0x83]);
            self.send_command(cmd::MASTER_ACTIVATION);
            self.wait_busy(delay, POWER_OFF_TIME_MS);
            self.power_is_on = false;
        }
    }

    /// Deep sleep; the panel keeps its image and needs a reset to wake.
    pub fn hibernate(&mut self, delay: &mut Delay) {
        self.power_off(delay);
        self.write_reg(cmd::DEEP_SLEEP, &[0x01]);
        self.init_done = false;
    }

    // regions taller than the strip buffer go out in several passes
    fn write_region<F>(&mut self, strip: &mut StripBuffer, r: Region, ram_cmd: u8, draw: &F)
    where
        F: Fn(&mut StripBuffer),
    {
        let max_rows = StripBuffer::max_rows_for_width(r.w);
        if max_rows == 0 {
            return;
        }

        self.set_ram_area(r);
        self.send_command(ram_cmd);

        let mut y = r.y;
        while y < r.bottom() {
            let rows = max_rows.min(r.bottom() - y);
            strip.begin_window(Region::new(r.x, y, r.w, rows));
            draw(strip);
            self.send_data(strip.data());
            y += rows;
        }
    }

    fn init_display(&mut self, delay: &mut Delay) {
        self.send_command(cmd::SW_RESET);
        delay.delay_millis(10);

        self.write_reg(cmd::TEMPERATURE_SENSOR, &[0x80]); // internal sensor
        self.write_reg(cmd::BOOSTER_SOFT_START, &[0xAE, 0xC7, 0xC3, 0xC0, 0x80]);

        // gate count, then interlaced scan
        let [gates_lo, gates_hi] = (HEIGHT - 1).to_le_bytes();
        self.write_reg(cmd::DRIVER_OUTPUT_CONTROL, &[gates_lo, gates_hi, 0x02]);
        self.write_reg(cmd::BORDER_WAVEFORM, &[0x01]);

        self.set_ram_area(Region::new(0, 0, WIDTH, HEIGHT));
        self.init_done = true;
    }

    fn set_ram_area(&mut self, r: Region) {
        // gates are wired bottom-up on this panel, so y runs backwards
        let y_top = HEIGHT - r.bottom();
        let [x0l, x0h] = r.x.to_le_bytes();
        let [x1l, x1h] = (r.x + r.w - 1).to_le_bytes();
        let [y0l, y0h] = (y_top + r.h - 1).to_le_bytes();
        let [y1l, y1h] = y_top.to_le_bytes();

        self.write_reg(cmd::DATA_ENTRY_MODE, &[0x01]); // X inc, Y dec
        self.write_reg(cmd::SET_RAM_X_RANGE, &[x0l, x0h, x1l, x1h]);
        self.write_reg(cmd::SET_RAM_Y_RANGE, &[y0l, y0h, y1l, y1h]);
        self.write_reg(cmd::SET_RAM_X_COUNTER, &[x0l, x0h]);
        self.write_reg(cmd::SET_RAM_Y_COUNTER, &[y0l, y0h]);
    }

    fn update_full(&mut self, delay: &mut Delay) {
        self.activate(delay, [0x40, 0x00], 0xF7, FULL_REFRESH_TIME_MS);
        self.power_is_on = false;
    }

    // waveform from OTP LUT; analog stays on for the bank sync writes
    fn update_partial(&mut self, delay: &mut Delay) {
        self.activate(delay, [0x00, 0x00], 0xFC, PARTIAL_REFRESH_TIME_MS);
        self.power_is_on = true;
    }

    fn activate(&mut self, delay: &mut Delay, ctrl1: [u8; 2], ctrl2: u8, timeout_ms: u32) {
        self.write_reg(cmd::DISPLAY_UPDATE_CONTROL_1, &ctrl1);
        self.write_reg(cmd::DISPLAY_UPDATE_CONTROL_2, &[ctrl2]);
        self.send_command(cmd::MASTER_ACTIVATION);
        self.wait_busy(delay, timeout_ms);
    }

    fn wait_busy(&mut self, delay: &mut Delay, timeout_ms: u32) {
        let mut elapsed = 0u32;
        while elapsed < timeout_ms {
            if self.busy.is_low().unwrap_or(true) {
                return;
            }
            delay.delay_millis(1);
            elapsed += 1;
        }
        debug!("epd: busy still high after {}ms", timeout_ms);
    }

    fn write_reg(&mut self, reg: u8, data: &[u8]) {
        self.send_command(reg);
        self.send_data(data);
    }

    fn send_command(&mut self, cmd: u8) {
        let _ = self.dc.set_low();
        let _ = self.spi.write(&[cmd]);
        let _ = self.dc.set_high();
    }

    fn send_data(&mut self, data: &[u8]) {
        let _ = self.dc.set_high();
        let _ = self.spi.write(data);
    }
}
