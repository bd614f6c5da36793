#![allow(dead_code)]

// Host-side fakes for the demo flow: a recording panel, a scripted SPI
// host / mounter / volume that journal every call, and a delay that
// only counts milliseconds.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_graphics::{Pixel, pixelcolor::BinaryColor, prelude::*};
use embedded_hal::delay::DelayNs;

use sd_demo_core::config::SD_MAX_FREQ_KHZ;
use sd_demo_core::{BusConfig, DemoConfig, MountConfig, Mounter, OpenMode, Panel, Refresh, SpiHost, Volume};

// ── Panel ───────────────────────────────────────────────────────────

/// Records the rows holding black pixels; white pixels are ignored.
pub struct Canvas {
    size: Size,
    pub black: Vec<Point>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            black: Vec::new(),
        }
    }

    pub fn rows(&self) -> Option<(i32, i32)> {
        let min = self.black.iter().map(|p| p.y).min()?;
        let max = self.black.iter().map(|p| p.y).max()?;
        Some((min, max))
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if color == BinaryColor::On {
                self.black.push(p);
            }
        }
        Ok(())
    }
}

pub struct RecordingPanel {
    size: Size,
    pub refreshes: Vec<(Refresh, Canvas)>,
}

impl RecordingPanel {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            refreshes: Vec::new(),
        }
    }

    pub fn areas(&self) -> Vec<Refresh> {
        self.refreshes.iter().map(|(a, _)| *a).collect()
    }
}

impl Panel for RecordingPanel {
    type Target = Canvas;

    fn size(&self) -> Size {
        self.size
    }

    fn refresh<F>(&mut self, area: Refresh, draw: F)
    where
        F: Fn(&mut Canvas),
    {
        let mut canvas = Canvas::new(self.size);
        draw(&mut canvas);
        self.refreshes.push((area, canvas));
    }
}

// ── Delay ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MsDelay {
    pub waits_ms: Vec<u32>,
}

impl MsDelay {
    pub fn total_ms(&self) -> u32 {
        self.waits_ms.iter().sum()
    }
}

impl DelayNs for MsDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

// ── Storage ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    BusInit,
    Mount,
    Open(String, OpenMode),
    Write(Vec<u8>),
    Read,
    Close,
    Unmount,
    BusFree,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeError {
    BusInUse,
    CardNotFound,
    NotFound,
    DiskFull,
}

/// Which call should fail, if any.
#[derive(Clone, Copy, Debug, Default)]
pub struct Faults {
    pub bus_init: bool,
    pub mount: bool,
    pub create: bool,
    pub write: bool,
    pub reopen: bool,
}

#[derive(Clone, Default)]
pub struct Rig {
    pub journal: Rc<RefCell<Vec<Call>>>,
    pub files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
    pub faults: Faults,
    // max bytes returned per read call; 0 means unlimited
    pub read_chunk: usize,
}

impl Rig {
    pub fn new(faults: Faults) -> Self {
        Self {
            faults,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(name).cloned()
    }

    fn log(&self, call: Call) {
        self.journal.borrow_mut().push(call);
    }
}

pub struct FakeHost(pub Rig);

pub struct FakeBus(Rig);

impl Drop for FakeBus {
    fn drop(&mut self) {
        self.0.log(Call::BusFree);
    }
}

impl SpiHost for FakeHost {
    type Bus = FakeBus;
    type Error = FakeError;

    fn init_bus(&mut self, _cfg: &BusConfig) -> Result<FakeBus, FakeError> {
        self.0.log(Call::BusInit);
        if self.0.faults.bus_init {
            return Err(FakeError::BusInUse);
        }
        Ok(FakeBus(self.0.clone()))
    }
}

pub struct FakeMounter(pub Rig);

impl Mounter<FakeBus> for FakeMounter {
    type Volume = FakeVolume;
    type Error = FakeError;

    fn mount(&mut self, bus: FakeBus, _cfg: &MountConfig) -> Result<FakeVolume, FakeError> {
        self.0.log(Call::Mount);
        if self.0.faults.mount {
            return Err(FakeError::CardNotFound);
        }
        Ok(FakeVolume {
            rig: self.0.clone(),
            _bus: bus,
        })
    }
}

pub struct FakeFile {
    name: String,
    pos: RefCell<usize>,
}

// field order matters: Drop logs Unmount, then `_bus` drops and logs BusFree
pub struct FakeVolume {
    rig: Rig,
    _bus: FakeBus,
}

impl Drop for FakeVolume {
    fn drop(&mut self) {
        self.rig.log(Call::Unmount);
    }
}

impl Volume for FakeVolume {
    type File = FakeFile;
    type Error = FakeError;

    fn open(&mut self, name: &str, mode: OpenMode) -> Result<FakeFile, FakeError> {
        self.rig.log(Call::Open(name.to_string(), mode));
        match mode {
            OpenMode::Write => {
                if self.rig.faults.create {
                    return Err(FakeError::DiskFull);
                }
                self.rig.files.borrow_mut().insert(name.to_string(), Vec::new());
            }
            OpenMode::Read => {
                if self.rig.faults.reopen || !self.rig.files.borrow().contains_key(name) {
                    return Err(FakeError::NotFound);
                }
            }
        }
        Ok(FakeFile {
            name: name.to_string(),
            pos: RefCell::new(0),
        })
    }

    fn write(&mut self, file: &FakeFile, data: &[u8]) -> Result<(), FakeError> {
        self.rig.log(Call::Write(data.to_vec()));
        if self.rig.faults.write {
            return Err(FakeError::DiskFull);
        }
        self.rig
            .files
            .borrow_mut()
            .entry(file.name.clone())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }

    fn read(&mut self, file: &FakeFile, buf: &mut [u8]) -> Result<usize, FakeError> {
        self.rig.log(Call::Read);
        let files = self.rig.files.borrow();
        let data = files.get(&file.name).ok_or(FakeError::NotFound)?;
        let mut pos = file.pos.borrow_mut();
        let left = &data[*pos..];
        let mut n = left.len().min(buf.len());
        if self.rig.read_chunk > 0 {
            n = n.min(self.rig.read_chunk);
        }
        buf[..n].copy_from_slice(&left[..n]);
        *pos += n;
        Ok(n)
    }

    fn close(&mut self, _file: FakeFile) -> Result<(), FakeError> {
        self.rig.log(Call::Close);
        Ok(())
    }
}

// ── Config ──────────────────────────────────────────────────────────

pub fn demo_config() -> DemoConfig {
    DemoConfig::new(BusConfig {
        sclk: 14,
        miso: 13,
        mosi: 12,
        cs: 4,
        max_freq_khz: SD_MAX_FREQ_KHZ,
        max_transfer_sz: 4000,
    })
}

pub fn mounted_volume(rig: &Rig) -> FakeVolume {
    let mut host = FakeHost(rig.clone());
    let mut mounter = FakeMounter(rig.clone());
    let bus = host.init_bus(&demo_config().bus).unwrap();
    mounter.mount(bus, &demo_config().mount).unwrap()
}
