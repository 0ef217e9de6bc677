//! Async driver for the MUSES72323 stereo electronic volume.
//!
//! The MUSES72323 is a two-channel attenuator controlled by 16-bit words on
//! a write-only, SPI-style serial bus. This crate encodes volume, gain and
//! feature settings into those words and clocks them out over either an SPI
//! peripheral or bit-banged GPIOs.
//!
//! # Architecture
//!
//! - **`encoding`** — Pure conversions: quarter-dB volume to attenuation
//!   code, gain to register bits, and control word assembly.
//! - **`driver`** — The [`Transport`] trait with two implementations,
//!   [`HardwareSpi`] and [`SoftwareSpi`], which put identical frames on the
//!   wire.
//! - **[`Muses72323`]** (public) — Validated, high-level API that keeps the
//!   cached gain and states registers.
//!
//! # Quick start
//!
//! ```ignore
//! use muses72323::{ChipAddress, Muses72323};
//!
//! // Any `embedded-hal-async` SPI device, e.g. a bus and chip-select pin
//! // wrapped in `embedded_hal_bus::spi::ExclusiveDevice`
//! let mut volume = Muses72323::new_hardware(spi, ChipAddress::default());
//! volume.begin().await?;
//!
//! volume.set_external_clock(false).await?;
//! volume.set_volume(-80, -80).await?; // -20 dB
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on public types
//!   and trace logging of every control word.

#![cfg_attr(not(test), no_std)]

pub use driver::{HardwareSpi, SoftwareSpi, SpiSettings, Transport, Unconnected};
pub use encoding::{control_word, gain_to_register, volume_to_attenuation, ChipAddress};
pub use error::{BusError, Muses72323Error, Status};
pub use muses72323::Muses72323;
pub use registers::{
    Register, MAX_SPI_FREQUENCY_HZ, TYPICAL_SPI_FREQUENCY_HZ, VOLUME_MAX, VOLUME_MIN,
};

mod driver;
mod encoding;
mod error;
mod muses72323;
pub mod registers;
