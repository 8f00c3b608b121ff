use crate::ll;
use core::fmt;
use embedded_hal::{blocking::spi, digital::v2::OutputPin};

/// An error that can occur when controlling the AD9833
pub enum Error<SPI, CS>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    /// Error occured while using the SPI bus or the FSYNC pin
    ///
    /// Some words of the operation may have reached the chip. Its registers
    /// may no longer match the driver's shadow copy.
    Bus(ll::Error<SPI, CS>),

    /// The frequency was negative, above the master clock, or not a number
    ///
    /// Nothing was written.
    FrequencyOutOfRange,

    /// The phase was outside of 0 to 360 degrees, or not a number
    ///
    /// Nothing was written.
    PhaseOutOfRange,
}

impl<SPI, CS> From<ll::Error<SPI, CS>> for Error<SPI, CS>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    fn from(error: ll::Error<SPI, CS>) -> Self {
        Error::Bus(error)
    }
}

// We can't derive this implementation, as `Debug` is only implemented
// conditionally for `ll::Error`.
impl<SPI, CS> fmt::Debug for Error<SPI, CS>
where
    SPI: spi::Write<u8>,
    <SPI as spi::Write<u8>>::Error: fmt::Debug,
    CS: OutputPin,
    <CS as OutputPin>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Bus(error) => write!(f, "Bus({:?})", error),
            Error::FrequencyOutOfRange => write!(f, "FrequencyOutOfRange"),
            Error::PhaseOutOfRange => write!(f, "PhaseOutOfRange"),
        }
    }
}
