// SD card round-trip demo for an ESP32 with an SSD1677 e-paper panel

#![no_std]

pub mod board;
pub mod drivers;
