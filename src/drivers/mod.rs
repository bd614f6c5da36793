// Hardware drivers: chip-level and protocol-level.
//
// Pin assignments and bus wiring live in board/; everything here is
// written against embedded-hal traits or the board's type aliases.

pub mod display;
pub mod sdcard;
pub mod ssd1677;
pub mod strip;
