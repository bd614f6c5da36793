// SD card round-trip demo, portable half.
//
// Status console, storage session guards and the staged
// write/read-back flow. No HAL types live here: the firmware crate
// plugs in the ESP32 SPI host, the embedded-sdmmc backend and the
// e-paper panel, and host tests plug in fakes.

#![no_std]

pub mod config;
pub mod console;
pub mod event;
pub mod flow;
pub mod region;
pub mod stack_fmt;
pub mod storage;

pub use config::DemoConfig;
pub use console::{Console, Panel, Refresh};
pub use event::{Event, Fault, Stage};
pub use region::Region;
pub use stack_fmt::StackFmt;
pub use storage::{BusConfig, MountConfig, Mounter, OpenFile, OpenMode, Session, SpiHost, Volume};
