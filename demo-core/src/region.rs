// Screen region geometry.
// x/w get widened to byte (8 px) boundaries before a partial refresh
// so the controller never sees a split byte.

use embedded_graphics::prelude::*;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub const fn bottom(self) -> u16 {
        self.y + self.h
    }

    pub const fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn align8(self) -> Self {
        let aligned_x = (self.x / 8) * 8;
        let extra = self.x - aligned_x;
        Self {
            x: aligned_x,
            y: self.y,
            w: (self.w + extra).div_ceil(8) * 8,
            h: self.h,
        }
    }

    // clip against a screen of the given size
    pub fn clamp_to(self, size: Size) -> Self {
        let sw = size.width.min(u16::MAX as u32) as u16;
        let sh = size.height.min(u16::MAX as u32) as u16;
        let x = self.x.min(sw);
        let y = self.y.min(sh);
        Self {
            x,
            y,
            w: self.w.min(sw - x),
            h: self.h.min(sh - y),
        }
    }
}
