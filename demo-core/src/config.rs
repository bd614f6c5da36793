// Compile-time configuration for the round-trip demo.
// The board crate supplies pin numbers; everything else is fixed here.

use crate::storage::{BusConfig, MountConfig};

pub const MOUNT_POINT: &str = "/sdcard";

// 8.3 name in the volume root
pub const FILE_NAME: &str = "EXAMPLE.TXT";

pub const PAYLOAD: &str = "Hello, SD card!";

// bound for the read-back line
pub const READ_BUF_LEN: usize = 64;

// card stays at the identification clock for the whole run
pub const SD_MAX_FREQ_KHZ: u32 = 400;

pub const MAX_TRANSFER_SIZE: usize = 4000;

pub const MAX_OPEN_FILES: usize = 5;

/// How long each status message stays up before the flow moves on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Holds {
    /// Pause after mount and after file creation.
    pub settle_ms: u32,
    /// Hold after a failure so the message can be read.
    pub error_ms: u32,
    /// Hold after the completion message.
    pub final_ms: u32,
}

impl Holds {
    pub const DEFAULT: Self = Self {
        settle_ms: 1_000,
        error_ms: 2_000,
        final_ms: 5_000,
    };
}

#[derive(Clone, Copy, Debug)]
pub struct DemoConfig {
    pub bus: BusConfig,
    pub mount: MountConfig,
    pub file_name: &'static str,
    pub payload: &'static str,
    pub holds: Holds,
}

impl DemoConfig {
    /// Default demo settings on the given SD bus wiring.
    pub const fn new(bus: BusConfig) -> Self {
        Self {
            bus,
            mount: MountConfig {
                mount_point: MOUNT_POINT,
                volume: 0,
                max_files: MAX_OPEN_FILES,
                format_if_mount_failed: false,
            },
            file_name: FILE_NAME,
            payload: PAYLOAD,
            holds: Holds::DEFAULT,
        }
    }
}
