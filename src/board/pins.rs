//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  4   | SD CS           | SD card chip select
//!  5   | EPD CS          | Display chip select
//! 12   | SPI2 MOSI       | SD card data in; strapping pin (MTDI)
//! 13   | SPI2 MISO       | SD card data out
//! 14   | SPI2 SCK        | SD card clock
//! 16   | EPD RST         | Reset (active low)
//! 17   | EPD DC          | Data/Command select
//! 18   | SPI3 SCK        | Display clock
//! 19   | EPD BUSY        | Busy signal from display
//! 23   | SPI3 MOSI       | Display data out (write-only, no MISO)

// ----- SD Card (SPI2 / HSPI) -----
pub const SD_SCK: u8 = 14;
pub const SD_MISO: u8 = 13;
pub const SD_MOSI: u8 = 12;
pub const SD_CS: u8 = 4;

// ----- E-Paper Display (SPI3 / VSPI) -----
pub const EPD_SCK: u8 = 18;
pub const EPD_MOSI: u8 = 23;
pub const EPD_CS: u8 = 5;
pub const EPD_DC: u8 = 17;
pub const EPD_RST: u8 = 16;
pub const EPD_BUSY: u8 = 19;
