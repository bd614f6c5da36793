// SD card over SPI with FAT volume manager
// No RTC on board; timestamps are fixed to 2025-01-01.
//
// Ownership chain: SPI2 bus -> SdCard -> VolumeManager -> SdVolume.
// Dropping the volume closes the root dir and volume, then the card and
// finally the bus go with it.

use embedded_hal::spi::SpiDevice;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{
    Mode, RawDirectory, RawFile, RawVolume, SdCard, SdCardError, TimeSource, Timestamp,
    VolumeIdx, VolumeManager,
};
use esp_hal::{
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    spi::{
        self,
        master::{ConfigError, Spi},
    },
    time::Rate,
};
use log::{info, warn};
use sd_demo_core::config::MAX_OPEN_FILES;
use sd_demo_core::{BusConfig, MountConfig, Mounter, OpenMode, SpiHost, Volume};

use crate::board::{SdHw, SpiDevice as SdSpiDevice, pins};

// only the root directory is ever open
const MAX_DIRS: usize = 1;
const MAX_VOLUMES: usize = 1;
// handle ids start here so stale handles from another manager never alias
const HANDLE_ID_OFFSET: u32 = 5000;

#[derive(Default, Clone, Copy)]
pub struct FixedTimeSource;

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 55,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

#[derive(Debug)]
pub enum BusError {
    /// The SD peripherals were already handed out.
    AlreadyTaken,
    /// Requested wiring differs from the board's SD slot.
    PinMismatch,
    Config(ConfigError),
}

impl From<ConfigError> for BusError {
    fn from(e: ConfigError) -> Self {
        BusError::Config(e)
    }
}

/// SPI2 host for the SD slot. Hands out the bus at most once.
pub struct SdHost {
    hw: Option<SdHw>,
}

impl SdHost {
    pub fn new(hw: SdHw) -> Self {
        Self { hw: Some(hw) }
    }
}

impl SpiHost for SdHost {
    type Bus = SdSpiDevice;
    type Error = BusError;

    fn init_bus(&mut self, cfg: &BusConfig) -> Result<SdSpiDevice, BusError> {
        let wired = (pins::SD_SCK, pins::SD_MISO, pins::SD_MOSI, pins::SD_CS);
        if (cfg.sclk, cfg.miso, cfg.mosi, cfg.cs) != wired {
            return Err(BusError::PinMismatch);
        }

        let hw = self.hw.take().ok_or(BusError::AlreadyTaken)?;

        // cards must be initialised at <= 400kHz; no DMA so the transfer
        // limit only matters for the logged config
        let spi_cfg = spi::master::Config::default()
            .with_frequency(Rate::from_khz(cfg.max_freq_khz))
            .with_mode(spi::Mode::_0);
        let bus = Spi::new(hw.spi, spi_cfg)?
            .with_sck(hw.sck)
            .with_miso(hw.miso)
            .with_mosi(hw.mosi);

        let cs = Output::new(hw.cs, Level::High, OutputConfig::default());
        let Ok(dev) = ExclusiveDevice::new(bus, cs, Delay::new());
        Ok(dev)
    }
}

#[derive(Debug)]
pub enum MountError {
    /// No card answered, or it failed to initialise.
    Card(SdCardError),
    Volume(embedded_sdmmc::Error<SdCardError>),
    RootDir(embedded_sdmmc::Error<SdCardError>),
}

#[derive(Default)]
pub struct SdMounter;

impl<SPI: SpiDevice> Mounter<SPI> for SdMounter {
    type Volume = SdVolume<SPI>;
    type Error = MountError;

    fn mount(&mut self, bus: SPI, cfg: &MountConfig) -> Result<SdVolume<SPI>, MountError> {
        if cfg.format_if_mount_failed {
            warn!("sd: formatting is not supported, mounting as-is");
        }
        if cfg.max_files > MAX_OPEN_FILES {
            warn!(
                "sd: max_files {} capped to {}",
                cfg.max_files, MAX_OPEN_FILES
            );
        }

        let card = SdCard::new(bus, Delay::new());
        let bytes = card.num_bytes().map_err(MountError::Card)?;
        info!("SD card: {} bytes ({} MB)", bytes, bytes / 1024 / 1024);

        let volume_mgr = VolumeManager::new_with_limits(card, FixedTimeSource, HANDLE_ID_OFFSET);
        let volume = volume_mgr
            .open_raw_volume(VolumeIdx(cfg.volume))
            .map_err(MountError::Volume)?;
        let root = match volume_mgr.open_root_dir(volume) {
            Ok(root) => root,
            Err(e) => {
                let _ = volume_mgr.close_volume(volume);
                return Err(MountError::RootDir(e));
            }
        };

        info!("sd: volume {} mounted at {}", cfg.volume, cfg.mount_point);
        Ok(SdVolume {
            volume_mgr,
            volume,
            root,
        })
    }
}

pub struct SdVolume<SPI: SpiDevice> {
    volume_mgr:
        VolumeManager<SdCard<SPI, Delay>, FixedTimeSource, MAX_DIRS, MAX_OPEN_FILES, MAX_VOLUMES>,
    volume: RawVolume,
    root: RawDirectory,
}

impl<SPI: SpiDevice> Volume for SdVolume<SPI> {
    type File = RawFile;
    type Error = embedded_sdmmc::Error<SdCardError>;

    fn open(&mut self, name: &str, mode: OpenMode) -> Result<RawFile, Self::Error> {
        let mode = match mode {
            OpenMode::Write => Mode::ReadWriteCreateOrTruncate,
            OpenMode::Read => Mode::ReadOnly,
        };
        self.volume_mgr.open_file_in_dir(self.root, name, mode)
    }

    fn write(&mut self, file: &RawFile, data: &[u8]) -> Result<(), Self::Error> {
        self.volume_mgr.write(*file, data)
    }

    fn read(&mut self, file: &RawFile, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.volume_mgr.file_eof(*file)? {
            return Ok(0);
        }
        self.volume_mgr.read(*file, buf)
    }

    fn close(&mut self, file: RawFile) -> Result<(), Self::Error> {
        self.volume_mgr.close_file(file)
    }
}

impl<SPI: SpiDevice> Drop for SdVolume<SPI> {
    fn drop(&mut self) {
        if let Err(e) = self.volume_mgr.close_dir(self.root) {
            warn!("sd: close root dir failed: {:?}", e);
        }
        if let Err(e) = self.volume_mgr.close_volume(self.volume) {
            warn!("sd: close volume failed: {:?}", e);
        }
        info!("sd: volume unmounted, releasing bus");
    }
}
