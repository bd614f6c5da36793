//! Storage seams for the round-trip demo.
//!
//! The flow talks to three backends: a [`SpiHost`] that brings up the
//! peripheral bus, a [`Mounter`] that attaches the card and mounts its
//! filesystem, and the mounted [`Volume`] itself. Ownership carries the
//! teardown order:
//!
//! - the bus handle moves into the mounted volume
//! - dropping the volume unmounts it, then releases the bus
//! - dropping an [`OpenFile`] closes the file
//!
//! so every early return releases exactly what was acquired, newest
//! first, without the flow tracking it by hand.

use core::fmt::{self, Debug, Write};

use log::{debug, info, warn};

use crate::stack_fmt::StackFmt;

pub const PATH_CAP: usize = 40;

/// SPI wiring and clocking for the card slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BusConfig {
    pub sclk: u8,
    pub miso: u8,
    pub mosi: u8,
    pub cs: u8,
    /// Clock cap in kHz.
    pub max_freq_khz: u32,
    pub max_transfer_sz: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MountConfig {
    pub mount_point: &'static str,
    /// Partition index on the card.
    pub volume: usize,
    pub max_files: usize,
    pub format_if_mount_failed: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpenMode {
    /// Create the file, truncating any previous contents.
    Write,
    Read,
}

/// Brings up the peripheral bus.
pub trait SpiHost {
    /// Initialized bus; dropping it frees the bus.
    type Bus;
    type Error: Debug;

    fn init_bus(&mut self, cfg: &BusConfig) -> Result<Self::Bus, Self::Error>;
}

/// Attaches the card on an initialized bus and mounts its filesystem.
///
/// `mount` takes the bus by value. On failure the bus is dropped along
/// with everything else built on it.
pub trait Mounter<B> {
    type Volume: Volume;
    type Error: Debug;

    fn mount(&mut self, bus: B, cfg: &MountConfig) -> Result<Self::Volume, Self::Error>;
}

/// A mounted filesystem. Dropping it unmounts and releases the bus it owns.
pub trait Volume {
    type File;
    type Error: Debug;

    fn open(&mut self, name: &str, mode: OpenMode) -> Result<Self::File, Self::Error>;
    fn write(&mut self, file: &Self::File, data: &[u8]) -> Result<(), Self::Error>;
    /// Returns 0 at end of file.
    fn read(&mut self, file: &Self::File, buf: &mut [u8]) -> Result<usize, Self::Error>;
    fn close(&mut self, file: Self::File) -> Result<(), Self::Error>;
}

/// A mounted card together with the configuration it was brought up with.
pub struct Session<V: Volume> {
    volume: V,
    bus: BusConfig,
    mount: MountConfig,
}

impl<V: Volume> Session<V> {
    pub fn new(volume: V, bus: BusConfig, mount: MountConfig) -> Self {
        Self { volume, bus, mount }
    }

    pub fn mount_point(&self) -> &'static str {
        self.mount.mount_point
    }

    // absolute path as shown to the user; the volume itself is addressed by name
    pub fn path(&self, name: &str) -> StackFmt<PATH_CAP> {
        let mut out = StackFmt::new();
        let _ = write!(out, "{}/{}", self.mount.mount_point, name);
        out
    }

    pub fn open(&mut self, name: &str, mode: OpenMode) -> Result<OpenFile<'_, V>, V::Error> {
        OpenFile::open(&mut self.volume, name, mode)
    }

    /// Unmount and free the bus.
    pub fn teardown(self) {
        info!("storage: unmounting {}", self.mount.mount_point);
        drop(self.volume);
    }
}

impl<V: Volume> fmt::Debug for Session<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("bus", &self.bus)
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}

/// Open file handle that is closed when it goes out of scope.
pub struct OpenFile<'v, V: Volume> {
    volume: &'v mut V,
    file: Option<V::File>,
}

impl<'v, V: Volume> OpenFile<'v, V> {
    pub fn open(volume: &'v mut V, name: &str, mode: OpenMode) -> Result<Self, V::Error> {
        let file = volume.open(name, mode)?;
        debug!("storage: opened {} ({:?})", name, mode);
        Ok(Self {
            volume,
            file: Some(file),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), V::Error> {
        match self.file.as_ref() {
            Some(file) => self.volume.write(file, data),
            None => Ok(()),
        }
    }

    /// Read the first line into `buf`, like fgets: stops at the first
    /// newline or when `buf` is full. Overflow is dropped silently. The
    /// newline and a trailing `\r` are not part of the result.
    pub fn read_line<'b>(&mut self, buf: &'b mut [u8]) -> Result<&'b str, V::Error> {
        let Some(file) = self.file.as_ref() else {
            return Ok("");
        };

        let mut total = 0;
        while total < buf.len() {
            let n = self.volume.read(file, &mut buf[total..])?;
            if n == 0 {
                break;
            }
            if buf[total..total + n].contains(&b'\n') {
                total += n;
                break;
            }
            total += n;
        }

        let mut line = &buf[..total];
        if let Some(nl) = line.iter().position(|&b| b == b'\n') {
            line = &line[..nl];
        }
        if let [rest @ .., b'\r'] = line {
            line = rest;
        }

        // a cut may land inside a multi-byte char; keep the whole ones
        Ok(match core::str::from_utf8(line) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&line[..e.valid_up_to()]).unwrap_or(""),
        })
    }

    /// Close now and report the result; the drop path only logs it.
    pub fn close(mut self) -> Result<(), V::Error> {
        match self.file.take() {
            Some(file) => self.volume.close(file),
            None => Ok(()),
        }
    }
}

impl<V: Volume> Drop for OpenFile<'_, V> {
    fn drop(&mut self) {
        if let Some(file) = self.file.take()
            && let Err(e) = self.volume.close(file)
        {
            warn!("storage: close on drop failed: {:?}", e);
        }
    }
}
