//! High-level interface for the MUSES72323 electronic volume.
//!
//! [`Muses72323`] turns volume, gain and feature requests into control words
//! and hands them to a [`Transport`]. It keeps a copy of the gain and states
//! registers, because the chip cannot be read back and the feature toggles
//! only change one bit of a register that also carries other live bits.
//! A copy is only updated once the word carrying it has been sent.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;

use crate::driver::{HardwareSpi, SoftwareSpi, Transport};
use crate::encoding::{control_word, gain_to_register, volume_to_attenuation, write_bit, ChipAddress};
use crate::error::{Muses72323Error, Status};
use crate::registers::{Register, BIT_EXTERNAL_CLOCK, BIT_LINK_CHANNELS, BIT_ZERO_CROSSING};

/// Driver for one MUSES72323 chip.
///
/// # Example
///
/// ```no_run
/// use muses72323::{ChipAddress, Muses72323};
///
/// # async fn example(
/// #     spi: impl embedded_hal_async::spi::SpiDevice,
/// # ) -> Result<(), muses72323::Muses72323Error> {
/// let mut volume = Muses72323::new_hardware(spi, ChipAddress::default());
/// volume.begin().await?;
///
/// // -10 dB on both channels
/// volume.set_volume(-40, -40).await?;
/// # Ok(())
/// # }
/// ```
pub struct Muses72323<T> {
    transport: T,
    chip_address: ChipAddress,
    /// Last gain register value sent (also holds zero-crossing and link bits).
    gain: u16,
    /// Last states register value sent (holds the clock-source bit).
    states: u16,
    status: Status,
}

impl<SPI> Muses72323<HardwareSpi<SPI>>
where
    SPI: SpiDevice,
{
    /// Driver on an SPI device that manages chip-select.
    ///
    /// Configure the bus behind `spi` with
    /// [`SpiSettings::default()`](crate::SpiSettings) (800 kHz, mode 0)
    /// before handing it over.
    pub fn new_hardware(spi: SPI, chip_address: ChipAddress) -> Self {
        Self::new(HardwareSpi::new(spi), chip_address)
    }
}

impl<SCLK, MOSI, MISO, CS, D> Muses72323<SoftwareSpi<SCLK, MOSI, MISO, CS, D>>
where
    SCLK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    D: DelayNs,
{
    /// Driver on bit-banged GPIOs, clocked at 800 kHz.
    pub fn new_software(
        sclk: SCLK,
        mosi: MOSI,
        miso: MISO,
        cs: CS,
        delay: D,
        chip_address: ChipAddress,
    ) -> Self {
        Self::new(SoftwareSpi::new(sclk, mosi, miso, cs, delay), chip_address)
    }
}

impl<T> Muses72323<T>
where
    T: Transport,
{
    /// Create a driver on any transport.
    ///
    /// No bus traffic is generated. Call [`begin()`](Self::begin) before the
    /// first write.
    pub fn new(transport: T, chip_address: ChipAddress) -> Self {
        Self {
            transport,
            chip_address,
            gain: 0,
            states: 0,
            status: Status::Ok,
        }
    }

    /// Drive the bus lines to their idle levels.
    pub async fn begin(&mut self) -> Result<(), Muses72323Error> {
        self.transport.init().await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("MUSES72323 ready at chip address {}", self.chip_address.bits());

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Attenuation
    // -----------------------------------------------------------------------

    /// Set both channel attenuations in quarter-dB steps.
    ///
    /// `0` is 0 dB, `-447` is -111.75 dB. Left is written before right.
    ///
    /// # Errors
    /// * [`Muses72323Error::ValueOutOfRange`] if either value is outside
    ///   `-447..=0`. Nothing is sent and the status becomes
    ///   [`Status::ValueError`].
    /// * [`Muses72323Error::Bus`] on communication failure
    pub async fn set_volume(&mut self, left: i16, right: i16) -> Result<(), Muses72323Error> {
        let (Some(left_code), Some(right_code)) =
            (volume_to_attenuation(left), volume_to_attenuation(right))
        else {
            #[cfg(feature = "defmt")]
            defmt::warn!("Volume rejected: left {} right {}", left, right);

            return Err(self.reject());
        };

        self.write_register(Register::AttenuationLeft, left_code).await?;
        self.write_register(Register::AttenuationRight, right_code).await
    }

    /// Mute both channels by writing attenuation code 0.
    pub async fn mute(&mut self) -> Result<(), Muses72323Error> {
        self.write_register(Register::AttenuationLeft, 0).await?;
        self.write_register(Register::AttenuationRight, 0).await
    }

    // -----------------------------------------------------------------------
    // Gain register
    // -----------------------------------------------------------------------

    /// Write the gain register.
    ///
    /// This rewrites the whole register: zero-crossing detection is switched
    /// back on and the cached channel-link bit is replaced by the encoded
    /// gain. Re-apply those settings afterwards if needed.
    ///
    /// # Errors
    /// * [`Muses72323Error::ValueOutOfRange`] if `gain > 0`
    /// * [`Muses72323Error::Bus`] on communication failure
    pub async fn set_gain(&mut self, gain: i16) -> Result<(), Muses72323Error> {
        // TODO: confirm the accepted gain range against the datasheet gain table;
        // only positive values are rejected today.
        if gain > 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("Gain rejected: {}", gain);

            return Err(self.reject());
        }

        let register = gain_to_register(gain);
        self.write_register(Register::Gain, register).await?;
        self.gain = register;
        Ok(())
    }

    /// Enable or disable zero-crossing detection. `0` in the register means on.
    pub async fn set_zero_crossing(&mut self, enabled: bool) -> Result<(), Muses72323Error> {
        let register = write_bit(self.gain, BIT_ZERO_CROSSING, !enabled);
        self.write_register(Register::Gain, register).await?;
        self.gain = register;
        Ok(())
    }

    /// Link the channels so the left attenuation drives both outputs.
    ///
    /// With linked channels only the left attenuation register matters.
    pub async fn set_link_channels(&mut self, enabled: bool) -> Result<(), Muses72323Error> {
        let register = write_bit(self.gain, BIT_LINK_CHANNELS, enabled);
        self.write_register(Register::Gain, register).await?;
        self.gain = register;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // States register
    // -----------------------------------------------------------------------

    /// Select the external clock (`true`) or the internal oscillator.
    ///
    /// Must be `false` when no external clock is connected.
    pub async fn set_external_clock(&mut self, enabled: bool) -> Result<(), Muses72323Error> {
        let register = write_bit(self.states, BIT_EXTERNAL_CLOCK, !enabled);
        self.write_register(Register::States, register).await?;
        self.states = register;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Raw access
    // -----------------------------------------------------------------------

    /// Send `payload` to `register` as-is.
    ///
    /// The cached gain and states registers are not updated, so a later
    /// feature toggle resends the cached value.
    pub async fn write_register(
        &mut self,
        register: Register,
        payload: u16,
    ) -> Result<(), Muses72323Error> {
        let word = control_word(register, self.chip_address, payload);

        #[cfg(feature = "defmt")]
        defmt::trace!("MUSES72323 {} <- {=u16:#x}", register, word);

        self.transport.write_word(word).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// Sticky status: [`Status::ValueError`] once any value was rejected.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Cached gain register.
    pub fn gain_register(&self) -> u16 {
        self.gain
    }

    /// Cached states register.
    pub fn states_register(&self) -> u16 {
        self.states
    }

    /// Chip address this driver writes to.
    pub fn chip_address(&self) -> ChipAddress {
        self.chip_address
    }

    /// Give back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    fn reject(&mut self) -> Muses72323Error {
        self.status = Status::ValueError;
        Muses72323Error::ValueOutOfRange
    }
}
