//! Value-to-bitfield conversions and control word assembly.
//!
//! Everything here is pure arithmetic. Nothing touches the bus.

use crate::error::Muses72323Error;
use crate::registers::{
    Register, ATTENUATION_0DB, ATTENUATION_STEP, BIT_ZERO_CROSSING, CHIP_ADDRESS_MASK,
    VOLUME_MAX, VOLUME_MIN,
};

/// Chip address selected by the ADR0/ADR1 pins.
///
/// Up to four chips can share one bus. The address is stored already placed
/// in the low two bits of the control word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipAddress(u16);

impl ChipAddress {
    /// Build a chip address from the ADR pin strapping (0–3).
    ///
    /// # Errors
    /// [`Muses72323Error::InvalidChipAddress`] if `address > 3`.
    pub fn new(address: u8) -> Result<Self, Muses72323Error> {
        if u16::from(address) > CHIP_ADDRESS_MASK {
            return Err(Muses72323Error::InvalidChipAddress);
        }
        Ok(Self(u16::from(address)))
    }

    /// The address field as it appears in a control word.
    pub const fn bits(self) -> u16 {
        self.0
    }
}

/// Convert a quarter-dB volume into the attenuation register code.
///
/// ```text
/// |    0.00 dB | in: [   0] -> 0b0001_0000_0000_0000 |
/// | -111.75 dB | in: [-447] -> 0b1110_1111_1000_0000 |
/// ```
///
/// Returns `None` when `volume` is outside `-447..=0`.
pub fn volume_to_attenuation(volume: i16) -> Option<u16> {
    if !(VOLUME_MIN..=VOLUME_MAX).contains(&volume) {
        return None;
    }
    let code = i32::from(ATTENUATION_0DB) - i32::from(volume) * ATTENUATION_STEP;
    Some(code as u16)
}

/// Encode a gain value into the gain register.
///
/// The value is written into both gain fields (`<< 12` and `<< 9`) using its
/// 16-bit two's-complement pattern. The zero-crossing bit is always cleared,
/// so every gain write re-enables zero-crossing detection.
pub fn gain_to_register(gain: i16) -> u16 {
    let raw = gain as u16;
    let register = (raw << 12) | (raw << 9);
    write_bit(register, BIT_ZERO_CROSSING, false)
}

/// Assemble a control word from its three fields.
///
/// Callers keep `payload` clear of the select and address bits.
pub fn control_word(register: Register, chip_address: ChipAddress, payload: u16) -> u16 {
    register.select_bits() | chip_address.bits() | payload
}

/// Set or clear a single bit, leaving the others untouched.
pub fn write_bit(value: u16, bit: u8, set: bool) -> u16 {
    if set {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    }
}
