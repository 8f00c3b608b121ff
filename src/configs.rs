//! Configuration and selector types
//!
//! This module houses the values that are handed to the high-level driver:
//! which register slot an operation targets, which waveform to output, and how
//! the chip is clocked and initialized.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{ll::Register, DEFAULT_MCLK_HZ};

/// Driver configuration
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Frequency of the clock connected to the MCLK pin, in Hz
    ///
    /// All output frequencies are programmed as a fraction of this clock.
    pub mclk_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mclk_hz: DEFAULT_MCLK_HZ,
        }
    }
}

/// Values written to the frequency and phase registers during initialization
///
/// All values default to zero, which leaves the chip silent at mid-scale.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitValues {
    /// Initial content of FREQ0, in Hz
    pub freq0_hz: f64,
    /// Initial content of PHASE0, in degrees
    pub phase0_deg: f64,
    /// Initial content of FREQ1, in Hz
    pub freq1_hz: f64,
    /// Initial content of PHASE1, in degrees
    pub phase1_deg: f64,
}

/// The shape of the output signal
///
/// The discriminants are stable and can be used to convert from raw values
/// received over some other interface (`Waveform::try_from(3u8)`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Waveform {
    /// Sinusoidal output through the DAC
    Sine = 0,
    /// Triangular output through the DAC
    Triangle = 1,
    /// Square wave at half the programmed frequency
    SquareDiv2 = 2,
    /// Square wave at the programmed frequency
    Square = 3,
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sine
    }
}

/// Selects one of the two frequency register slots
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrequencyRegister {
    /// FREQ0
    Freq0 = 0,
    /// FREQ1
    Freq1 = 1,
}

impl FrequencyRegister {
    /// The register this slot is written through
    pub fn register(self) -> Register {
        match self {
            FrequencyRegister::Freq0 => Register::Freq0,
            FrequencyRegister::Freq1 => Register::Freq1,
        }
    }

    /// The value of the FSELECT bit that makes this slot live
    pub fn select_bit(self) -> bool {
        self == FrequencyRegister::Freq1
    }

    /// The slot made live by the given FSELECT bit value
    pub fn from_select_bit(bit: bool) -> Self {
        if bit {
            FrequencyRegister::Freq1
        } else {
            FrequencyRegister::Freq0
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Default for FrequencyRegister {
    fn default() -> Self {
        FrequencyRegister::Freq0
    }
}

/// Selects one of the two phase register slots
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PhaseRegister {
    /// PHASE0
    Phase0 = 0,
    /// PHASE1
    Phase1 = 1,
}

impl PhaseRegister {
    /// The register this slot is written through
    pub fn register(self) -> Register {
        match self {
            PhaseRegister::Phase0 => Register::Phase0,
            PhaseRegister::Phase1 => Register::Phase1,
        }
    }

    /// The value of the PSELECT bit that makes this slot live
    pub fn select_bit(self) -> bool {
        self == PhaseRegister::Phase1
    }

    /// The slot made live by the given PSELECT bit value
    pub fn from_select_bit(bit: bool) -> Self {
        if bit {
            PhaseRegister::Phase1
        } else {
            PhaseRegister::Phase0
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Default for PhaseRegister {
    fn default() -> Self {
        PhaseRegister::Phase0
    }
}
