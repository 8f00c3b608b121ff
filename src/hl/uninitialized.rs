use crate::{
    configs::{Config, InitValues},
    hl::DeviceState,
    ll, Error, Ready, Uninitialized, AD9833,
};
use embedded_hal::{blocking::spi, digital::v2::OutputPin};

impl<SPI, CS> AD9833<SPI, CS, Uninitialized> {
    /// Create a new instance of `AD9833`
    ///
    /// Requires the SPI peripheral and the FSYNC pin that are connected to the
    /// AD9833. Assumes the chip is clocked at [`DEFAULT_MCLK_HZ`].
    ///
    /// [`DEFAULT_MCLK_HZ`]: ../constant.DEFAULT_MCLK_HZ.html
    pub fn new(spi: SPI, fsync: CS) -> Self {
        Self::new_with_config(spi, fsync, Config::default())
    }

    /// Create a new instance of `AD9833` with a custom configuration
    pub fn new_with_config(spi: SPI, fsync: CS, config: Config) -> Self {
        AD9833 {
            ll: ll::AD9833::new(spi, fsync),
            config,
            shadow: DeviceState::default(),
            state: Uninitialized,
        }
    }
}

impl<SPI, CS> AD9833<SPI, CS, Uninitialized>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    /// Initialize the AD9833
    ///
    /// Raises FSYNC, then resets the chip and clears all frequency and phase
    /// registers while reset is held. Once done, the chip outputs a sine wave
    /// from FREQ0 and PHASE0, both zero.
    pub fn init(self) -> Result<AD9833<SPI, CS, Ready>, Error<SPI, CS>> {
        self.init_with(InitValues::default())
    }

    /// Initialize the AD9833, loading the given frequencies and phases
    ///
    /// Works like [`init`](AD9833::init), but writes `values` instead of
    /// zeros. All values are checked first; if one is out of range, nothing is
    /// written.
    pub fn init_with(mut self, values: InitValues) -> Result<AD9833<SPI, CS, Ready>, Error<SPI, CS>> {
        self.load_initial_values(&values)?;

        Ok(AD9833 {
            ll: self.ll,
            config: self.config,
            shadow: self.shadow,
            state: Ready,
        })
    }
}
