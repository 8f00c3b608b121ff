//! High-level interface to the AD9833
//!
//! The entry point to this API is the [AD9833] struct. Please refer to the
//! documentation there for more details.
//!
//! This module implements a high-level interface to the AD9833. This is the
//! recommended way to access the AD9833 using this crate, unless you need the
//! greater flexibility provided by the [register-level interface].
//!
//! The AD9833 can't be read back. The driver keeps a shadow copy of everything
//! it has written ([`DeviceState`]) and derives every new write from it. If a
//! bus error interrupts an operation, the chip may no longer match the shadow.
//! Calling [`AD9833::reset`] brings both back to a known state.
//!
//! [register-level interface]: ../ll/index.html

use core::fmt;

use embedded_hal::{blocking::spi, digital::v2::OutputPin};

use crate::{
    configs::{Config, FrequencyRegister, InitValues, PhaseRegister, Waveform},
    encoding,
    ll::{self, ControlWord, Register},
};

pub use error::*;
pub use state_impls::*;

mod error;
mod ready;
mod state_impls;
mod uninitialized;

/// Entry point to the AD9833 driver API
pub struct AD9833<SPI, CS, State> {
    ll: ll::AD9833<SPI, CS>,
    config: Config,
    shadow: DeviceState,
    state: State,
}

/// The driver's copy of the chip's registers
///
/// The control word only holds the bits that outlive a single operation. B28
/// and HLB describe the shape of one frequency write and are never stored
/// here.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    control: ControlWord,
    freq: [u32; 2],
    phase: [u16; 2],
    waveform: Waveform,
}

impl DeviceState {
    /// The last control word written, without the write-shape bits
    pub fn control(&self) -> ControlWord {
        self.control
    }

    /// The 28-bit value stored in a frequency register
    pub fn frequency(&self, register: FrequencyRegister) -> u32 {
        self.freq[register.index()]
    }

    /// The 12-bit value stored in a phase register
    pub fn phase(&self, register: PhaseRegister) -> u16 {
        self.phase[register.index()]
    }

    /// The waveform currently output
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// The frequency register that drives the output
    pub fn active_frequency_register(&self) -> FrequencyRegister {
        FrequencyRegister::from_select_bit(self.control.fselect())
    }

    /// The phase register that drives the output
    pub fn active_phase_register(&self) -> PhaseRegister {
        PhaseRegister::from_select_bit(self.control.pselect())
    }
}

impl<SPI, CS, State> AD9833<SPI, CS, State> {
    /// The configuration the driver was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The driver's copy of the chip's registers
    pub fn state(&self) -> &DeviceState {
        &self.shadow
    }

    /// Provides direct access to the register-level API
    ///
    /// Be aware that writes through the register-level API are not reflected
    /// in the high-level API's shadow registers. Don't use the register-level
    /// and high-level APIs in tandem, unless you know what you're doing.
    pub fn ll(&mut self) -> &mut ll::AD9833<SPI, CS> {
        &mut self.ll
    }

    /// Return the SPI peripheral and the FSYNC pin
    pub fn release(self) -> (SPI, CS) {
        self.ll.release()
    }
}

impl<SPI, CS, State> AD9833<SPI, CS, State>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    fn frequency_word(&self, freq_hz: f64) -> Result<u32, Error<SPI, CS>> {
        let mclk_hz = self.config.mclk_hz;

        if !freq_hz.is_finite() || freq_hz < 0.0 || freq_hz > mclk_hz as f64 {
            log::warn!(
                target: "ad9833",
                "frequency {} Hz outside 0..={} Hz, ignored",
                freq_hz,
                mclk_hz
            );
            return Err(Error::FrequencyOutOfRange);
        }

        Ok(encoding::frequency_to_register(freq_hz, mclk_hz))
    }

    fn phase_word(&self, phase_deg: f64) -> Result<u16, Error<SPI, CS>> {
        if !phase_deg.is_finite() || phase_deg < 0.0 || phase_deg > 360.0 {
            log::warn!(
                target: "ad9833",
                "phase {} deg outside 0..=360 deg, ignored",
                phase_deg
            );
            return Err(Error::PhaseOutOfRange);
        }

        Ok(encoding::phase_to_register(phase_deg))
    }

    /// Put the chip through reset and load all four value registers
    ///
    /// Every value is checked before the first word goes out. The shadow is
    /// only replaced once the whole sequence has been sent.
    fn load_initial_values(&mut self, values: &InitValues) -> Result<(), Error<SPI, CS>> {
        let freq = [
            self.frequency_word(values.freq0_hz)?,
            self.frequency_word(values.freq1_hz)?,
        ];
        let phase = [
            self.phase_word(values.phase0_deg)?,
            self.phase_word(values.phase1_deg)?,
        ];

        log::debug!(
            target: "ad9833",
            "initializing: FREQ0=0x{:07x} FREQ1=0x{:07x} PHASE0=0x{:03x} PHASE1=0x{:03x}",
            freq[0],
            freq[1],
            phase[0],
            phase[1]
        );

        self.ll.configure_select_line()?;

        {
            let mut session = self.ll.session();

            let mut control = ControlWord::default();
            control.set_reset(true);
            session.write_control(control)?;

            control.set_b28(true);
            for &(register, value) in [(Register::Freq0, freq[0]), (Register::Freq1, freq[1])].iter()
            {
                let (lower, upper) = encoding::split_frequency28(value);

                session.write_control(control)?;
                session.write(register, lower)?;
                session.write(register, upper)?;
            }

            session.write(Register::Phase0, phase[0])?;
            session.write(Register::Phase1, phase[1])?;

            session.write_control(ControlWord::default())?;
        }

        self.shadow = DeviceState {
            control: ControlWord::default(),
            freq,
            phase,
            waveform: Waveform::Sine,
        };

        Ok(())
    }
}

// Can't be derived without putting requirements on `SPI` and `CS`.
impl<SPI, CS, State> fmt::Debug for AD9833<SPI, CS, State>
where
    State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AD9833 {{ state: {:?}, shadow: {:?}, .. }}",
            self.state, self.shadow
        )
    }
}
