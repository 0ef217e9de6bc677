//! MUSES72323 control word constants.
//!
//! Every write to the chip is a single 16-bit control word:
//!
//! ```text
//!  15                          4   3   2   1   0
//! +-----------------------------+---------+-------+
//! |           payload           | select  | chip  |
//! +-----------------------------+---------+-------+
//! ```
//!
//! The select bits identify the target register, the low two bits carry the
//! chip address set by the ADR pins. The `STATES` select pattern also claims
//! bit 9, which it shares with the clock-source state bit.

// ---------------------------------------------------------------------------
// Register select patterns (chip address bits left clear)
// ---------------------------------------------------------------------------

/// Left-channel attenuation register.
pub const ATTENUATION_L: u16 = 0b0000_0000_0001_0000;

/// Right-channel attenuation register.
pub const ATTENUATION_R: u16 = 0b0000_0000_0001_0100;

/// Gain register. Also carries the zero-crossing and channel-link bits.
pub const GAIN: u16 = 0b0000_0000_0000_1000;

/// States register. Carries the clock-source bit.
pub const STATES: u16 = 0b0000_0010_0000_1100;

/// Mask covering the chip address field.
pub const CHIP_ADDRESS_MASK: u16 = 0b11;

// ---------------------------------------------------------------------------
// State bit positions
// ---------------------------------------------------------------------------

/// Soft-step bit in the states register. Reserved: no operation drives it.
#[allow(dead_code)]
pub const BIT_SOFT_STEP: u8 = 4;

/// Zero-crossing detection bit in the gain register. `0` = enabled.
pub const BIT_ZERO_CROSSING: u8 = 8;

/// Clock-source bit in the states register. `0` = external, `1` = internal.
pub const BIT_EXTERNAL_CLOCK: u8 = 9;

/// Channel-link bit in the gain register. `1` = linked.
pub const BIT_LINK_CHANNELS: u8 = 15;

// ---------------------------------------------------------------------------
// Value ranges
// ---------------------------------------------------------------------------

/// Quietest accepted volume: -111.75 dB in quarter-dB steps.
pub const VOLUME_MIN: i16 = -447;

/// Loudest accepted volume: 0 dB.
pub const VOLUME_MAX: i16 = 0;

/// Attenuation code for 0 dB.
pub const ATTENUATION_0DB: u16 = 0x1000;

/// Attenuation code step per quarter dB.
pub const ATTENUATION_STEP: i32 = 128;

// ---------------------------------------------------------------------------
// Bus timing
// ---------------------------------------------------------------------------

/// Default SPI clock. Leaves margin below the datasheet ceiling.
pub const TYPICAL_SPI_FREQUENCY_HZ: u32 = 800_000;

/// Maximum SPI clock the chip accepts (datasheet page 8).
pub const MAX_SPI_FREQUENCY_HZ: u32 = 1_000_000;

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Status code: no error recorded.
pub const STATUS_OK: u8 = 0x00;

/// Status code: a volume or gain argument was rejected.
pub const STATUS_VALUE_ERROR: u8 = 0x83;

/// Addressable registers of the MUSES72323.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Left-channel attenuation.
    AttenuationLeft,
    /// Right-channel attenuation.
    AttenuationRight,
    /// Gain, zero-crossing and channel link.
    Gain,
    /// Clock source.
    States,
}

impl Register {
    /// The select bit pattern placed in every control word for this register.
    pub const fn select_bits(self) -> u16 {
        match self {
            Register::AttenuationLeft => ATTENUATION_L,
            Register::AttenuationRight => ATTENUATION_R,
            Register::Gain => GAIN,
            Register::States => STATES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Register; 4] = [
        Register::AttenuationLeft,
        Register::AttenuationRight,
        Register::Gain,
        Register::States,
    ];

    #[test]
    fn select_patterns_are_distinct() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.select_bits(), b.select_bits(), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn select_patterns_leave_chip_address_clear() {
        for register in ALL {
            assert_eq!(register.select_bits() & CHIP_ADDRESS_MASK, 0, "{:?}", register);
        }
    }

    #[test]
    fn soft_step_bit_is_reserved() {
        for driven in [BIT_ZERO_CROSSING, BIT_EXTERNAL_CLOCK, BIT_LINK_CHANNELS] {
            assert_ne!(BIT_SOFT_STEP, driven);
        }
        assert_eq!(STATES & (1 << BIT_SOFT_STEP), 0);
    }

    #[test]
    fn spi_defaults_stay_under_ceiling() {
        assert!(TYPICAL_SPI_FREQUENCY_HZ < MAX_SPI_FREQUENCY_HZ);
    }
}
