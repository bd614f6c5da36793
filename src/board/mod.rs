//! Board support for the SD demo: ESP32 + SSD1677 e-paper + SD slot.
//!
//! Maps physical hardware to named subsystems so the rest of the
//! firmware never touches GPIO numbers. The display gets its own SPI3
//! bus and is brought up here at boot. The SD slot on SPI2 is handed
//! over as raw peripherals, because bringing that bus up (and tearing it
//! down again) is part of the demo flow itself.

pub mod pins;

use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    peripherals::{GPIO4, GPIO12, GPIO13, GPIO14, Peripherals, SPI2},
    spi::{self, master::ConfigError},
    time::Rate,
};
use log::debug;
use sd_demo_core::config::{MAX_TRANSFER_SIZE, SD_MAX_FREQ_KHZ};
use sd_demo_core::{BusConfig, DemoConfig};

use crate::drivers::ssd1677::{DisplayDriver, SPI_FREQ_MHZ};

// Type Aliases
pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type SpiDevice = ExclusiveDevice<SpiBus, Output<'static>, Delay>;
pub type Epd = DisplayDriver<SpiDevice, Output<'static>, Output<'static>, Input<'static>>;

/// SD slot wiring, as handed to the demo flow.
pub const SD_BUS: BusConfig = BusConfig {
    sclk: pins::SD_SCK,
    miso: pins::SD_MISO,
    mosi: pins::SD_MOSI,
    cs: pins::SD_CS,
    max_freq_khz: SD_MAX_FREQ_KHZ,
    max_transfer_sz: MAX_TRANSFER_SIZE,
};

pub const DEMO: DemoConfig = DemoConfig::new(SD_BUS);

// Hardware Bundles
/// Display subsystem hardware: SPI3 device plus control lines, not yet reset.
pub struct DisplayHw {
    pub epd: Epd,
}

/// SD slot peripherals, unconfigured. Consumed by the SPI host on bus init.
pub struct SdHw {
    pub spi: SPI2<'static>,
    pub sck: GPIO14<'static>,
    pub miso: GPIO13<'static>,
    pub mosi: GPIO12<'static>,
    pub cs: GPIO4<'static>,
}

pub struct Board {
    pub display: DisplayHw,
    pub sd: SdHw,
}

impl Board {
    pub fn init(p: Peripherals) -> Result<Self, ConfigError> {
        let sd = SdHw {
            spi: p.SPI2,
            sck: p.GPIO14,
            miso: p.GPIO13,
            mosi: p.GPIO12,
            cs: p.GPIO4,
        };

        // GPIO setup
        let cs = Output::new(p.GPIO5, Level::High, OutputConfig::default());
        let dc = Output::new(p.GPIO17, Level::High, OutputConfig::default());
        let rst = Output::new(p.GPIO16, Level::High, OutputConfig::default());
        let busy = Input::new(p.GPIO19, InputConfig::default().with_pull(Pull::None));

        // SPI bus
        let spi_cfg =
            spi::master::Config::default().with_frequency(Rate::from_mhz(SPI_FREQ_MHZ));
        let spi_bus = spi::master::Spi::new(p.SPI3, spi_cfg)?
            .with_sck(p.GPIO18)
            .with_mosi(p.GPIO23);

        let Ok(spi_dev) = ExclusiveDevice::new(spi_bus, cs, Delay::new());
        debug!(
            "board: epd on SPI3 (sck {} mosi {} cs {} dc {} rst {} busy {})",
            pins::EPD_SCK,
            pins::EPD_MOSI,
            pins::EPD_CS,
            pins::EPD_DC,
            pins::EPD_RST,
            pins::EPD_BUSY
        );

        let display = DisplayHw {
            epd: DisplayDriver::new(spi_dev, dc, rst, busy),
        };

        Ok(Board { display, sd })
    }
}
