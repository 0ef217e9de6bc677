//! Error and status types for the MUSES72323 driver.

use core::fmt;

use embedded_hal::digital;
use embedded_hal::spi;

use crate::registers::{STATUS_OK, STATUS_VALUE_ERROR};

/// Failure reported by a transport while driving the bus.
///
/// HAL-specific error types are reduced to their `embedded-hal` error kind,
/// so both transports share one error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The SPI peripheral failed to shift out a frame.
    Spi(spi::ErrorKind),
    /// A chip-select, clock or data line could not be driven or sampled.
    Pin(digital::ErrorKind),
}

impl BusError {
    pub(crate) fn spi<E: spi::Error>(error: E) -> Self {
        BusError::Spi(error.kind())
    }

    pub(crate) fn pin<E: digital::Error>(error: E) -> Self {
        BusError::Pin(error.kind())
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BusError::Spi(kind) => write!(f, "SPI error: {}", kind),
            BusError::Pin(kind) => write!(f, "GPIO error: {}", kind),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BusError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            BusError::Spi(_kind) => defmt::write!(f, "SPI bus error"),
            BusError::Pin(_kind) => defmt::write!(f, "GPIO pin error"),
        }
    }
}

/// Errors that can occur when driving the MUSES72323.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Muses72323Error {
    /// Underlying bus failure.
    Bus(BusError),

    /// Volume or gain argument outside the accepted range. Nothing was sent.
    ValueOutOfRange,

    /// Chip address outside 0–3.
    InvalidChipAddress,
}

// Allow ergonomic `?` propagation from transport errors.
impl From<BusError> for Muses72323Error {
    fn from(error: BusError) -> Self {
        Muses72323Error::Bus(error)
    }
}

impl fmt::Display for Muses72323Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Muses72323Error::Bus(e) => write!(f, "bus error: {}", e),
            Muses72323Error::ValueOutOfRange => write!(f, "value out of range"),
            Muses72323Error::InvalidChipAddress => {
                write!(f, "invalid chip address (must be 0-3)")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Muses72323Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Muses72323Error::Bus(e) => defmt::write!(f, "Bus error: {}", e),
            Muses72323Error::ValueOutOfRange => defmt::write!(f, "Value out of range"),
            Muses72323Error::InvalidChipAddress => defmt::write!(f, "Invalid chip address"),
        }
    }
}

/// Sticky device status.
///
/// Once a value has been rejected the status stays at
/// [`Status::ValueError`] for the rest of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// No rejected value so far.
    #[default]
    Ok,
    /// A volume or gain argument was rejected at some point.
    ValueError,
}

impl Status {
    /// Numeric status code (`0x00` or `0x83`).
    pub const fn code(self) -> u8 {
        match self {
            Status::Ok => STATUS_OK,
            Status::ValueError => STATUS_VALUE_ERROR,
        }
    }
}
