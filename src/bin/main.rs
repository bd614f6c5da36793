// sd-demo entry point
//
// Boot sequence: logger -> hardware -> display -> demo flow -> idle
//
// The flow runs exactly once. Whatever the outcome, the last status
// line stays on the panel and the CPU idles afterwards.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use log::{error, info};

use sd_demo::board::{self, Board};
use sd_demo::drivers::display::EpdPanel;
use sd_demo::drivers::sdcard::{SdHost, SdMounter};
use sd_demo_core::{Console, flow};

esp_bootloader_esp_idf::esp_app_desc!();

const IDLE_TICK_MS: u32 = 1_000;

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let mut delay = Delay::new();

    info!("booting...");

    let board = match Board::init(peripherals) {
        Ok(board) => board,
        Err(e) => {
            error!("board init failed: {:?}", e);
            idle(&mut delay)
        }
    };
    info!("hardware initialized.");

    let mut console = Console::new(EpdPanel::new(board.display));
    console.init();

    let mut host = SdHost::new(board.sd);
    let mut mounter = SdMounter;

    match flow::run(&mut host, &mut mounter, &mut console, &mut delay, &board::DEMO) {
        Ok(()) => info!("demo finished"),
        Err(fault) => error!("demo stopped at {:?}", fault.stage()),
    }

    console.panel_mut().sleep();
    idle(&mut delay)
}

fn idle(delay: &mut Delay) -> ! {
    loop {
        delay.delay_millis(IDLE_TICK_MS);
    }
}
