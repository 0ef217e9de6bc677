//! Hardware SPI volume sweep
//!
//! Drives a MUSES72323 from the SPI0 peripheral of a Raspberry Pi Pico 2.
//! Selects the internal clock and enables zero-crossing detection, then
//! slowly sweeps both channels from -60 dB up to -20 dB and back, logging
//! each step via defmt. A short mute separates the sweeps.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | MUSES72323 | Notes                       |
//! |-----------|------------|------------|-----------------------------|
//! | SPI0 SCK  | GP18       | SCLK       | Mode 0, 800 kHz             |
//! | SPI0 TX   | GP19       | SI         |                             |
//! | CS        | GP17       | LATCH      | Active-low, idles high      |
//! | —         | GND        | ADR0/ADR1  | Chip address 0              |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Duration, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use {defmt_rtt as _, panic_probe as _};

use muses72323::{ChipAddress, HardwareSpi, Muses72323, SpiSettings};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

/// Quietest point of the sweep (-60 dB).
const SWEEP_BOTTOM: i16 = -240;
/// Loudest point of the sweep (-20 dB).
const SWEEP_TOP: i16 = -80;
/// One step is 1 dB.
const SWEEP_STEP: usize = 4;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // --- SPI0 (GP18 = SCK, GP19 = TX), configured for the chip ---
    let settings = SpiSettings::default();
    let mut config = spi::Config::default();
    config.frequency = settings.frequency_hz();
    config.phase = spi::Phase::CaptureOnFirstTransition;
    config.polarity = spi::Polarity::IdleLow;

    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, config);
    let cs = Output::new(p.PIN_17, Level::High);

    // The device wrapper owns CS and asserts it around each control word.
    let spi = ExclusiveDevice::new(spi, cs, Delay).expect("CS pin init failed");

    // --- Volume chip ---
    let mut volume = Muses72323::new(
        HardwareSpi::with_settings(spi, settings),
        ChipAddress::default(),
    );

    volume.begin().await.expect("Failed to initialise MUSES72323");

    // No external clock on this board.
    if let Err(e) = volume.set_external_clock(false).await {
        error!("Clock select failed: {}", e);
    }
    if let Err(e) = volume.set_zero_crossing(true).await {
        error!("Zero-crossing enable failed: {}", e);
    }

    info!("Volume sweep started");

    loop {
        for level in (SWEEP_BOTTOM..=SWEEP_TOP).step_by(SWEEP_STEP) {
            match volume.set_volume(level, level).await {
                Ok(()) => info!("Volume: {} quarter-dB", level),
                Err(e) => error!("Set volume failed: {}", e),
            }
            Timer::after(Duration::from_millis(100)).await;
        }

        for level in (SWEEP_BOTTOM..=SWEEP_TOP).rev().step_by(SWEEP_STEP) {
            if let Err(e) = volume.set_volume(level, level).await {
                error!("Set volume failed: {}", e);
            }
            Timer::after(Duration::from_millis(100)).await;
        }

        // Short mute between sweeps.
        if let Err(e) = volume.mute().await {
            error!("Mute failed: {}", e);
        }
        Timer::after(Duration::from_millis(1000)).await;
    }
}
