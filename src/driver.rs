//! Low-level bus transports.
//!
//! A control word leaves the driver as two 8-bit frames, high byte first and
//! MSB first within each byte, bracketed by chip-select low/high. The chip
//! latches the word on the rising edge of chip-select.
//!
//! Two interchangeable [`Transport`] implementations produce the same wire
//! sequence:
//!
//! - [`HardwareSpi`] hands the frames to an `embedded-hal-async` SPI device,
//!   which owns chip-select.
//! - [`SoftwareSpi`] toggles clock and data GPIOs itself.

use core::convert::Infallible;

use embedded_hal::digital::{self, InputPin, OutputPin, PinState};
use embedded_hal::spi::{Mode, MODE_0};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;

use crate::error::BusError;
use crate::registers::{MAX_SPI_FREQUENCY_HZ, TYPICAL_SPI_FREQUENCY_HZ};

/// Delivers 16-bit control words to the chip.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Drive the bus lines to their idle levels.
    async fn init(&mut self) -> Result<(), BusError>;

    /// Send one control word as two frames inside a chip-select window.
    async fn write_word(&mut self, word: u16) -> Result<(), BusError>;
}

// ---------------------------------------------------------------------------
// Bus settings
// ---------------------------------------------------------------------------

/// Clock rate and mode for talking to the MUSES72323.
///
/// The chip samples on the rising edge with the clock idling low (SPI mode 0)
/// and expects MSB-first data. `embedded-hal` leaves peripheral setup to the
/// HAL, so [`HardwareSpi`] only carries these values for the caller; the
/// software transport derives its bit timing from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSettings {
    frequency_hz: u32,
    mode: Mode,
}

impl SpiSettings {
    /// Settings with the given clock rate, clamped to 1 MHz.
    pub fn with_frequency(frequency_hz: u32) -> Self {
        Self {
            frequency_hz: frequency_hz.clamp(1, MAX_SPI_FREQUENCY_HZ),
            mode: MODE_0,
        }
    }

    /// Clock rate in Hz.
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// SPI clock polarity and phase.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Half of one clock period, in nanoseconds.
    pub fn half_period_ns(&self) -> u32 {
        500_000_000 / self.frequency_hz
    }
}

impl Default for SpiSettings {
    fn default() -> Self {
        Self::with_frequency(TYPICAL_SPI_FREQUENCY_HZ)
    }
}

// ---------------------------------------------------------------------------
// Hardware SPI
// ---------------------------------------------------------------------------

/// Transport backed by an `embedded-hal-async` [`SpiDevice`].
///
/// The device owns chip-select: each control word is one transaction, so
/// chip-select is asserted around the two frames and released afterwards
/// even when the transfer fails. Sharing the bus with other peripherals is
/// left to the device implementation.
///
/// The underlying bus must already be configured with [`SpiSettings`]
/// (mode 0, MSB first, at most 1 MHz).
pub struct HardwareSpi<SPI> {
    spi: SPI,
    settings: SpiSettings,
}

impl<SPI> HardwareSpi<SPI>
where
    SPI: SpiDevice,
{
    /// Create a hardware transport with the default 800 kHz settings.
    pub fn new(spi: SPI) -> Self {
        Self::with_settings(spi, SpiSettings::default())
    }

    /// Create a hardware transport with explicit settings.
    pub fn with_settings(spi: SPI, settings: SpiSettings) -> Self {
        Self { spi, settings }
    }

    /// Settings the SPI peripheral is expected to run with.
    pub fn settings(&self) -> SpiSettings {
        self.settings
    }

    /// Give back the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Transport for HardwareSpi<SPI>
where
    SPI: SpiDevice,
{
    async fn init(&mut self) -> Result<(), BusError> {
        // Chip-select idles high between transactions already.
        Ok(())
    }

    async fn write_word(&mut self, word: u16) -> Result<(), BusError> {
        self.spi.write(&word.to_be_bytes()).await.map_err(BusError::spi)
    }
}

// ---------------------------------------------------------------------------
// Software (bit-banged) SPI
// ---------------------------------------------------------------------------

/// Placeholder for an unwired data-in line on a 3-wire bus. Always reads low.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconnected;

impl digital::ErrorType for Unconnected {
    type Error = Infallible;
}

impl InputPin for Unconnected {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Transport that clocks frames out over plain GPIOs.
///
/// Each bit holds the data line for half a clock period before the rising
/// edge and keeps the clock high for another half period, so the bus never
/// runs faster than [`SpiSettings::frequency_hz`].
pub struct SoftwareSpi<SCLK, MOSI, MISO, CS, D> {
    sclk: SCLK,
    mosi: MOSI,
    miso: MISO,
    cs: CS,
    delay: D,
    half_period_ns: u32,
}

impl<SCLK, MOSI, MISO, CS, D> SoftwareSpi<SCLK, MOSI, MISO, CS, D>
where
    SCLK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    D: DelayNs,
{
    /// Create a bit-banged transport clocked at 800 kHz.
    ///
    /// # Arguments
    /// * `sclk` — clock output
    /// * `mosi` — data output to the chip
    /// * `miso` — data input from the chip, or [`Unconnected`]
    /// * `cs` — active-low chip-select
    /// * `delay` — timer used to pace the clock edges
    pub fn new(sclk: SCLK, mosi: MOSI, miso: MISO, cs: CS, delay: D) -> Self {
        Self::with_settings(sclk, mosi, miso, cs, delay, SpiSettings::default())
    }

    /// Create a bit-banged transport paced by `settings`.
    pub fn with_settings(
        sclk: SCLK,
        mosi: MOSI,
        miso: MISO,
        cs: CS,
        delay: D,
        settings: SpiSettings,
    ) -> Self {
        Self {
            sclk,
            mosi,
            miso,
            cs,
            delay,
            half_period_ns: settings.half_period_ns(),
        }
    }

    /// Shift one byte out MSB first, returning the byte sampled on data-in.
    pub async fn transfer_byte(&mut self, value: u8) -> Result<u8, BusError> {
        let mut received = 0u8;

        for bit in (0..8).rev() {
            let mask = 1u8 << bit;

            self.mosi
                .set_state(PinState::from(value & mask != 0))
                .map_err(BusError::pin)?;
            self.delay.delay_ns(self.half_period_ns).await;

            self.sclk.set_high().map_err(BusError::pin)?;
            if self.miso.is_high().map_err(BusError::pin)? {
                received |= mask;
            }
            self.delay.delay_ns(self.half_period_ns).await;

            self.sclk.set_low().map_err(BusError::pin)?;
        }

        Ok(received)
    }

    /// Give back the pins and delay source.
    pub fn release(self) -> (SCLK, MOSI, MISO, CS, D) {
        (self.sclk, self.mosi, self.miso, self.cs, self.delay)
    }

    async fn write_frames(&mut self, frames: &[u8; 2]) -> Result<(), BusError> {
        for &frame in frames {
            // Write-only chip; nothing meaningful comes back.
            let _ = self.transfer_byte(frame).await?;
        }
        Ok(())
    }
}

impl<SCLK, MOSI, MISO, CS, D> Transport for SoftwareSpi<SCLK, MOSI, MISO, CS, D>
where
    SCLK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    D: DelayNs,
{
    async fn init(&mut self) -> Result<(), BusError> {
        self.cs.set_high().map_err(BusError::pin)?;
        self.mosi.set_low().map_err(BusError::pin)?;
        self.sclk.set_low().map_err(BusError::pin)
    }

    async fn write_word(&mut self, word: u16) -> Result<(), BusError> {
        let frames = word.to_be_bytes();

        self.cs.set_low().map_err(BusError::pin)?;
        let sent = self.write_frames(&frames).await;
        let released = self.cs.set_high().map_err(BusError::pin);

        sent.and(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_hal::digital::ErrorKind;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use embedded_hal_mock::eh1::MockError;

    /// Delay source that returns immediately and records requested delays.
    #[derive(Default)]
    struct CountingDelay {
        calls: usize,
        last_ns: u32,
    }

    impl DelayNs for CountingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.last_ns = ns;
        }
    }

    fn cs_frame() -> PinMock {
        PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ])
    }

    /// MOSI and SCLK expectations for one byte, MSB first.
    fn bit_bang_expectations(byte: u8) -> (Vec<PinTransaction>, Vec<PinTransaction>) {
        let mut mosi = Vec::new();
        let mut sclk = Vec::new();
        for bit in (0..8).rev() {
            let state = if byte & (1 << bit) != 0 {
                PinState::High
            } else {
                PinState::Low
            };
            mosi.push(PinTransaction::set(state));
            sclk.push(PinTransaction::set(PinState::High));
            sclk.push(PinTransaction::set(PinState::Low));
        }
        (mosi, sclk)
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    #[test]
    fn default_settings_are_800khz_mode0() {
        let settings = SpiSettings::default();
        assert_eq!(settings.frequency_hz(), 800_000);
        assert_eq!(settings.mode(), MODE_0);
        assert_eq!(settings.half_period_ns(), 625);
    }

    #[test]
    fn frequency_is_clamped_to_chip_maximum() {
        assert_eq!(SpiSettings::with_frequency(8_000_000).frequency_hz(), 1_000_000);
        assert_eq!(SpiSettings::with_frequency(100_000).frequency_hz(), 100_000);
        assert_eq!(SpiSettings::with_frequency(0).frequency_hz(), 1);
    }

    // -----------------------------------------------------------------------
    // Hardware transport
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn hardware_sends_high_byte_first_in_one_transaction() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0xEF, 0x94]),
            SpiTransaction::transaction_end(),
        ]);

        let mut transport = HardwareSpi::new(spi.clone());
        transport.write_word(0xEF94).await.unwrap();

        spi.done();
    }

    #[tokio::test]
    async fn hardware_words_are_separate_transactions() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x10, 0x10]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x10, 0x14]),
            SpiTransaction::transaction_end(),
        ]);

        let mut transport = HardwareSpi::new(spi.clone());
        transport.write_word(0x1010).await.unwrap();
        transport.write_word(0x1014).await.unwrap();

        spi.done();
    }

    #[tokio::test]
    async fn hardware_init_is_silent() {
        let mut spi = SpiMock::new(&[]);

        let mut transport = HardwareSpi::new(spi.clone());
        transport.init().await.unwrap();

        spi.done();
    }

    /// SPI device whose every transaction fails with an overrun.
    struct OverrunSpi;

    impl embedded_hal::spi::ErrorType for OverrunSpi {
        type Error = embedded_hal::spi::ErrorKind;
    }

    impl SpiDevice for OverrunSpi {
        async fn transaction(
            &mut self,
            _operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            Err(embedded_hal::spi::ErrorKind::Overrun)
        }
    }

    #[tokio::test]
    async fn hardware_reports_bus_failure() {
        let mut transport = HardwareSpi::new(OverrunSpi);
        let result = transport.write_word(0x1234).await;
        assert_eq!(result, Err(BusError::Spi(embedded_hal::spi::ErrorKind::Overrun)));
    }

    // -----------------------------------------------------------------------
    // Software transport
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn software_init_drives_idle_levels() {
        let mut sclk = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut mosi = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut cs = PinMock::new(&[PinTransaction::set(PinState::High)]);

        let mut transport = SoftwareSpi::new(
            sclk.clone(),
            mosi.clone(),
            Unconnected,
            cs.clone(),
            CountingDelay::default(),
        );
        transport.init().await.unwrap();

        sclk.done();
        mosi.done();
        cs.done();
    }

    #[tokio::test]
    async fn software_clocks_each_bit_msb_first() {
        let word = 0xA503u16;
        let mut mosi_txns = Vec::new();
        let mut sclk_txns = Vec::new();
        for byte in word.to_be_bytes() {
            let (mosi, sclk) = bit_bang_expectations(byte);
            mosi_txns.extend(mosi);
            sclk_txns.extend(sclk);
        }

        let mut sclk = PinMock::new(&sclk_txns);
        let mut mosi = PinMock::new(&mosi_txns);
        let mut cs = cs_frame();

        let mut transport = SoftwareSpi::new(
            sclk.clone(),
            mosi.clone(),
            Unconnected,
            cs.clone(),
            CountingDelay::default(),
        );
        transport.write_word(word).await.unwrap();

        let (_, _, _, _, delay) = transport.release();
        assert_eq!(delay.calls, 32, "two half periods per bit");
        assert_eq!(delay.last_ns, 625);

        sclk.done();
        mosi.done();
        cs.done();
    }

    #[tokio::test]
    async fn software_samples_miso_on_rising_edge() {
        let (mosi_txns, sclk_txns) = bit_bang_expectations(0x00);
        let miso_bits = [true, false, true, true, false, false, true, false];
        let miso_txns: Vec<_> = miso_bits
            .iter()
            .map(|&high| PinTransaction::get(if high { PinState::High } else { PinState::Low }))
            .collect();

        let mut sclk = PinMock::new(&sclk_txns);
        let mut mosi = PinMock::new(&mosi_txns);
        let mut miso = PinMock::new(&miso_txns);
        let mut cs = PinMock::new(&[]);

        let mut transport = SoftwareSpi::new(
            sclk.clone(),
            mosi.clone(),
            miso.clone(),
            cs.clone(),
            CountingDelay::default(),
        );
        assert_eq!(transport.transfer_byte(0x00).await.unwrap(), 0b1011_0010);

        sclk.done();
        mosi.done();
        miso.done();
        cs.done();
    }

    #[tokio::test]
    async fn software_releases_cs_when_pin_fails() {
        let mut sclk = PinMock::new(&[]);
        let mut mosi = PinMock::new(&[PinTransaction::set(PinState::Low)
            .with_error(MockError::Io(std::io::ErrorKind::Other))]);
        let mut cs = cs_frame();

        let mut transport = SoftwareSpi::new(
            sclk.clone(),
            mosi.clone(),
            Unconnected,
            cs.clone(),
            CountingDelay::default(),
        );
        let result = transport.write_word(0x0010).await;
        assert_eq!(result, Err(BusError::Pin(ErrorKind::Other)));

        sclk.done();
        mosi.done();
        cs.done();
    }

    #[test]
    fn unconnected_reads_low() {
        let mut pin = Unconnected;
        assert_eq!(pin.is_high(), Ok(false));
        assert_eq!(pin.is_low(), Ok(true));
    }
}
