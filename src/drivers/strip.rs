// Strip-based rendering buffer for e-paper.
// 4KB strip instead of a 48KB framebuffer; the panel is covered in
// horizontal bands and every draw is clipped to the current band.
// begin_strip() for full refresh, begin_window() for partial.

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};
use log::warn;
use sd_demo_core::Region;

use super::ssd1677::{HEIGHT, WIDTH};

pub const STRIP_ROWS: u16 = 40; // 4000B per strip (800/8 * 40)
pub const PHYS_BYTES_PER_ROW: usize = (WIDTH as usize) / 8;

pub const STRIP_BUF_SIZE: usize = PHYS_BYTES_PER_ROW * STRIP_ROWS as usize;
pub const STRIP_COUNT: u16 = HEIGHT / STRIP_ROWS; // 12 strips

pub struct StripBuffer {
    buf: [u8; STRIP_BUF_SIZE],
    win: Region,
    row_bytes: u16,
}

impl StripBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0xFF; STRIP_BUF_SIZE],
            win: Region::new(0, 0, WIDTH, STRIP_ROWS),
            row_bytes: WIDTH / 8,
        }
    }

    pub fn begin_strip(&mut self, strip_idx: u16) {
        self.win = Region::new(0, strip_idx * STRIP_ROWS, WIDTH, STRIP_ROWS);
        self.row_bytes = PHYS_BYTES_PER_ROW as u16;
        self.buf.fill(0xFF);
    }

    /// Point the buffer at an arbitrary byte-aligned window. Windows taller
    /// than the buffer holds are cut short.
    pub fn begin_window(&mut self, window: Region) {
        let rb = window.w / 8;
        if rb == 0 {
            self.win = Region::new(window.x, window.y, 0, 0);
            self.row_bytes = 0;
            return;
        }

        let max_h = Self::max_rows_for_width(window.w);
        let mut h = window.h;
        if h > max_h {
            warn!(
                "strip: {}x{} window exceeds buffer, clamping h -> {}",
                window.w, h, max_h
            );
            h = max_h;
        }

        self.win = Region::new(window.x, window.y, window.w, h);
        self.row_bytes = rb;
        let total = rb as usize * h as usize;
        self.buf[..total].fill(0xFF);
    }

    pub fn data(&self) -> &[u8] {
        let total = self.row_bytes as usize * self.win.h as usize;
        &self.buf[..total]
    }

    pub fn max_rows_for_width(width: u16) -> u16 {
        let rb = (width / 8) as usize;
        if rb == 0 {
            return 0;
        }
        (STRIP_BUF_SIZE / rb) as u16
    }

    #[inline]
    fn set_pixel(&mut self, x: u16, y: u16, black: bool) {
        let w = self.win;
        if x < w.x || x >= w.x + w.w || y < w.y || y >= w.bottom() {
            return;
        }

        let local_x = (x - w.x) as usize;
        let local_y = (y - w.y) as usize;
        let idx = (local_x / 8) + (local_y * self.row_bytes as usize);
        let bit = 7 - (local_x % 8);

        // 0 bits are black on this controller
        if black {
            self.buf[idx] &= !(1 << bit);
        } else {
            self.buf[idx] |= 1 << bit;
        }
    }

    // byte-wise rect fill, clipped to window
    fn fill_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, black: bool) {
        let w = self.win;
        let cx0 = x0.max(w.x);
        let cx1 = x1.min(w.x + w.w);
        let cy0 = y0.max(w.y);
        let cy1 = y1.min(w.bottom());
        if cx0 >= cx1 || cy0 >= cy1 {
            return;
        }

        let lx0 = (cx0 - w.x) as usize;
        let lx1 = (cx1 - w.x) as usize;
        let ly0 = (cy0 - w.y) as usize;
        let ly1 = (cy1 - w.y) as usize;
        let rb = self.row_bytes as usize;

        let first_byte = lx0 / 8;
        let last_byte = (lx1 - 1) / 8;
        let first_mask: u8 = 0xFF >> (lx0 & 7);
        let last_mask: u8 = 0xFF << (7 - ((lx1 - 1) & 7));

        let (fill, edge_op): (u8, fn(&mut u8, u8)) = if black {
            (0x00, |b, m| *b &= !m)
        } else {
            (0xFF, |b, m| *b |= m)
        };

        for ly in ly0..ly1 {
            let row = ly * rb;
            if first_byte == last_byte {
                edge_op(&mut self.buf[row + first_byte], first_mask & last_mask);
            } else {
                edge_op(&mut self.buf[row + first_byte], first_mask);
                for b in first_byte + 1..last_byte {
                    self.buf[row + b] = fill;
                }
                edge_op(&mut self.buf[row + last_byte], last_mask);
            }
        }
    }
}

impl Default for StripBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for StripBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for StripBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.x >= WIDTH as i32 || coord.y < 0 || coord.y >= HEIGHT as i32 {
                continue;
            }
            self.set_pixel(coord.x as u16, coord.y as u16, color == BinaryColor::On);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clip = |v: i32, max: u16| (v.max(0) as u32).min(max as u32) as u16;

        let x0 = clip(area.top_left.x, WIDTH);
        let y0 = clip(area.top_left.y, HEIGHT);
        let x1 = clip(area.top_left.x.saturating_add(area.size.width as i32), WIDTH);
        let y1 = clip(area.top_left.y.saturating_add(area.size.height as i32), HEIGHT);

        self.fill_rect(x0, y0, x1, y1, color == BinaryColor::On);
        Ok(())
    }
}

