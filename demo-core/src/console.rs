//! On-screen status log.
//!
//! [`Console`] writes one line per message down a 1-bit panel, starting
//! at [`TOP_MARGIN`] and stepping [`LINE_HEIGHT`] each time. Each line
//! is pushed to the glass right away (a partial refresh of just that
//! band). The cursor is advanced first and checked second: the message
//! whose step reaches the panel height wraps the log, and the next
//! message lands on a freshly cleared screen at the top.

use embedded_graphics::{
    mono_font::{MonoTextStyle, MonoTextStyleBuilder, ascii::FONT_10X20},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::{debug, info};

use crate::event::Event;
use crate::region::Region;
use crate::stack_fmt::StackFmt;

pub const TOP_MARGIN: u16 = 10;
pub const LEFT_MARGIN: u16 = 10;
pub const LINE_HEIGHT: u16 = 30;

// bytes kept per line; longer messages are cut
pub const LINE_CAP: usize = 64;

// upper bound on rows between wraps, whatever the panel height
pub const MAX_LINES: usize = 32;

/// What part of the panel a refresh repaints.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Refresh {
    /// Whole screen; wipes anything not redrawn.
    Full,
    /// Just this band, in logical coordinates.
    Window(Region),
}

/// A display that repaints by calling back into the content.
///
/// `refresh` may call `draw` more than once (one call per strip on
/// e-paper), so the callback must be a pure function of the content.
pub trait Panel {
    type Target: DrawTarget<Color = BinaryColor>;

    fn size(&self) -> Size;
    fn refresh<F>(&mut self, area: Refresh, draw: F)
    where
        F: Fn(&mut Self::Target);
}

#[derive(Clone, Copy)]
struct Line {
    y: u16,
    text: StackFmt<LINE_CAP>,
}

impl Line {
    const EMPTY: Self = Self {
        y: 0,
        text: StackFmt::new(),
    };
}

pub struct Console<P: Panel> {
    panel: P,
    lines: [Line; MAX_LINES],
    count: usize,
    cursor_y: u16,
    clear_pending: bool,
    wraps: u32,
}

impl<P: Panel> Console<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            lines: [Line::EMPTY; MAX_LINES],
            count: 0,
            cursor_y: TOP_MARGIN,
            clear_pending: true,
            wraps: 0,
        }
    }

    /// Blank the panel and home the cursor.
    pub fn init(&mut self) {
        self.count = 0;
        self.cursor_y = TOP_MARGIN;
        self.panel.refresh(Refresh::Full, |t| {
            let _ = draw_lines(&[], t);
        });
        self.clear_pending = false;
    }

    pub fn log(&mut self, message: &str) {
        info!("{}", message);

        if self.count == MAX_LINES {
            self.wrap();
        }

        let size = self.panel.size();
        let y = self.cursor_y;
        self.lines[self.count] = Line {
            y,
            text: StackFmt::from_args(format_args!("{}", message)),
        };
        self.count += 1;

        let area = if self.clear_pending {
            Refresh::Full
        } else {
            let width = size.width.min(u16::MAX as u32) as u16;
            Refresh::Window(Region::new(0, y, width, LINE_HEIGHT).clamp_to(size))
        };

        let skip = matches!(area, Refresh::Window(r) if r.is_empty());
        if !skip {
            let lines = &self.lines[..self.count];
            self.panel.refresh(area, |t| {
                let _ = draw_lines(lines, t);
            });
            self.clear_pending = false;
        }

        self.cursor_y = self.cursor_y.saturating_add(LINE_HEIGHT);
        if self.cursor_y as u32 >= size.height {
            self.wrap();
        }
    }

    pub fn show(&mut self, event: &Event<'_>) {
        let msg = StackFmt::<LINE_CAP>::from_args(format_args!("{}", event));
        self.log(msg.as_str());
    }

    fn wrap(&mut self) {
        debug!("console: wrap after {} lines", self.count);
        self.cursor_y = TOP_MARGIN;
        self.count = 0;
        self.clear_pending = true;
        self.wraps += 1;
    }

    /// Row the next message will be drawn at.
    pub fn cursor(&self) -> u16 {
        self.cursor_y
    }

    /// Number of clear-and-reset cycles so far.
    pub fn wraps(&self) -> u32 {
        self.wraps
    }

    /// Text currently on screen, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines[..self.count].iter().map(|l| l.text.as_str())
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_10X20)
        .text_color(BinaryColor::On)
        .background_color(BinaryColor::Off)
        .build()
}

fn draw_lines<D>(lines: &[Line], target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = text_style();
    for line in lines {
        Text::with_baseline(
            line.text.as_str(),
            Point::new(LEFT_MARGIN as i32, line.y as i32),
            style,
            Baseline::Top,
        )
        .draw(target)?;
    }
    Ok(())
}
