//! Bit-banged volume control
//!
//! Drives a MUSES72323 over plain GPIOs of a Raspberry Pi Pico 2, for boards
//! where the SPI peripherals are already taken. Links the channels and steps
//! the volume down in 3 dB increments until it reaches -60 dB, then jumps
//! back to 0 dB.
//!
//! # Wiring
//!
//! | Signal | Pico 2 Pin | MUSES72323 | Notes                   |
//! |--------|------------|------------|-------------------------|
//! | SCLK   | GP10       | SCLK       | Idles low               |
//! | MOSI   | GP11       | SI         |                         |
//! | CS     | GP13       | LATCH      | Active-low, idles high  |
//! | —      | 3V3 / GND  | ADR0/ADR1  | ADR0 high: chip address 1 |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use muses72323::{ChipAddress, Muses72323, Unconnected};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

/// 3 dB in quarter-dB steps.
const STEP: i16 = 12;
/// Quietest level reached before wrapping (-60 dB).
const FLOOR: i16 = -240;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let sclk = Output::new(p.PIN_10, Level::Low);
    let mosi = Output::new(p.PIN_11, Level::Low);
    let cs = Output::new(p.PIN_13, Level::High);

    let address = unwrap!(ChipAddress::new(1));
    let mut volume = Muses72323::new_software(sclk, mosi, Unconnected, cs, Delay, address);

    volume.begin().await.expect("Failed to initialise MUSES72323");

    if let Err(e) = volume.set_external_clock(false).await {
        error!("Clock select failed: {}", e);
    }
    // Linked: only the left attenuation register is used.
    if let Err(e) = volume.set_link_channels(true).await {
        error!("Channel link failed: {}", e);
    }

    info!("Bit-bang volume example started");

    let mut level: i16 = 0;
    loop {
        match volume.set_volume(level, level).await {
            Ok(()) => info!("Volume: {} quarter-dB", level),
            Err(e) => error!("Set volume failed: {}", e),
        }

        level = if level - STEP < FLOOR { 0 } else { level - STEP };
        Timer::after(Duration::from_millis(500)).await;
    }
}
