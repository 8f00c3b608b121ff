use crate::{
    configs::{FrequencyRegister, InitValues, PhaseRegister, Waveform},
    encoding, Error, Ready, AD9833,
};
use embedded_hal::{blocking::spi, digital::v2::OutputPin};

impl<SPI, CS> AD9833<SPI, CS, Ready>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    /// Reset the chip and clear all frequency and phase registers
    ///
    /// Runs the same sequence as [`init`](AD9833::init). Use this to get the
    /// chip and the driver back in sync after a bus error.
    pub fn reset(&mut self) -> Result<(), Error<SPI, CS>> {
        self.load_initial_values(&InitValues::default())
    }

    /// Program a frequency register
    ///
    /// `freq_hz` must lie between zero and the master clock frequency,
    /// otherwise [`Error::FrequencyOutOfRange`] is returned and nothing is
    /// written. If the register already holds the resulting value, nothing is
    /// written either.
    ///
    /// Only the halves of the 28-bit register that actually change are sent:
    ///
    /// - upper 14 bits unchanged: control word, then the lower half
    /// - lower 14 bits unchanged: control word with HLB, then the upper half
    /// - both changed: control word with B28, then lower and upper half
    ///
    /// This does not change which register drives the output.
    pub fn set_frequency(
        &mut self,
        freq_hz: f64,
        register: FrequencyRegister,
    ) -> Result<(), Error<SPI, CS>> {
        let value = self.frequency_word(freq_hz)?;
        let previous = self.shadow.frequency(register);

        if value == previous {
            log::debug!(target: "ad9833", "{:?} already 0x{:07x}", register, value);
            return Ok(());
        }

        let (lower, upper) = encoding::split_frequency28(value);
        let (previous_lower, previous_upper) = encoding::split_frequency28(previous);

        // B28 and HLB only apply to this write. The shadow keeps them clear.
        let mut control = self.shadow.control;
        let target = register.register();

        {
            let mut session = self.ll.session();

            if upper == previous_upper {
                log::debug!(target: "ad9833", "{:?}: lower half only", register);

                control.set_b28(false).set_hlb(false);
                session.write_control(control)?;
                session.write(target, lower)?;
            } else if lower == previous_lower {
                log::debug!(target: "ad9833", "{:?}: upper half only", register);

                control.set_b28(false).set_hlb(true);
                session.write_control(control)?;
                session.write(target, upper)?;
            } else {
                log::debug!(target: "ad9833", "{:?}: full 28 bits", register);

                control.set_b28(true).set_hlb(false);
                session.write_control(control)?;
                session.write(target, lower)?;
                session.write(target, upper)?;
            }
        }

        self.shadow.freq[register.index()] = value;

        Ok(())
    }

    /// Program the frequency register that currently drives the output
    ///
    /// See [`set_frequency`](AD9833::set_frequency).
    pub fn set_frequency_active(&mut self, freq_hz: f64) -> Result<(), Error<SPI, CS>> {
        let register = self.shadow.active_frequency_register();
        self.set_frequency(freq_hz, register)
    }

    /// Program a phase register
    ///
    /// `phase_deg` must lie between 0 and 360 degrees, otherwise
    /// [`Error::PhaseOutOfRange`] is returned and nothing is written. 360
    /// degrees is programmed as 0. If the register already holds the resulting
    /// value, nothing is written.
    pub fn set_phase(
        &mut self,
        phase_deg: f64,
        register: PhaseRegister,
    ) -> Result<(), Error<SPI, CS>> {
        let value = self.phase_word(phase_deg)?;

        if value == self.shadow.phase(register) {
            log::debug!(target: "ad9833", "{:?} already 0x{:03x}", register, value);
            return Ok(());
        }

        self.ll.session().write(register.register(), value)?;
        self.shadow.phase[register.index()] = value;

        Ok(())
    }

    /// Program the phase register that currently drives the output
    ///
    /// See [`set_phase`](AD9833::set_phase).
    pub fn set_phase_active(&mut self, phase_deg: f64) -> Result<(), Error<SPI, CS>> {
        let register = self.shadow.active_phase_register();
        self.set_phase(phase_deg, register)
    }

    /// Switch the output over to the other frequency register
    pub fn toggle_frequency_select(&mut self) -> Result<(), Error<SPI, CS>> {
        let mut control = self.shadow.control;
        control.set_fselect(!control.fselect());

        self.ll.session().write_control(control)?;
        self.shadow.control = control;

        log::debug!(
            target: "ad9833",
            "output from {:?}",
            self.shadow.active_frequency_register()
        );

        Ok(())
    }

    /// Switch the output over to the other phase register
    pub fn toggle_phase_select(&mut self) -> Result<(), Error<SPI, CS>> {
        let mut control = self.shadow.control;
        control.set_pselect(!control.pselect());

        self.ll.session().write_control(control)?;
        self.shadow.control = control;

        log::debug!(
            target: "ad9833",
            "output from {:?}",
            self.shadow.active_phase_register()
        );

        Ok(())
    }

    /// Make a frequency register drive the output
    ///
    /// Nothing is written if it already does.
    pub fn select_frequency(&mut self, register: FrequencyRegister) -> Result<(), Error<SPI, CS>> {
        if self.shadow.active_frequency_register() == register {
            return Ok(());
        }

        self.toggle_frequency_select()
    }

    /// Make a phase register drive the output
    ///
    /// Nothing is written if it already does.
    pub fn select_phase(&mut self, register: PhaseRegister) -> Result<(), Error<SPI, CS>> {
        if self.shadow.active_phase_register() == register {
            return Ok(());
        }

        self.toggle_phase_select()
    }

    /// Change the output waveform
    ///
    /// Nothing is written if `waveform` is already being output. All control
    /// bits that don't select the waveform keep their values.
    pub fn set_waveform(&mut self, waveform: Waveform) -> Result<(), Error<SPI, CS>> {
        if waveform == self.shadow.waveform {
            log::debug!(target: "ad9833", "already outputting {:?}", waveform);
            return Ok(());
        }

        let mut control = self.shadow.control;
        control.with_waveform(waveform);

        self.ll.session().write_control(control)?;
        self.shadow.control = control;
        self.shadow.waveform = waveform;

        log::debug!(target: "ad9833", "outputting {:?}", waveform);

        Ok(())
    }

    /// The frequency stored in a frequency register, in Hz
    ///
    /// This is the frequency the chip actually produces, which can be slightly
    /// below the requested one.
    pub fn frequency_hz(&self, register: FrequencyRegister) -> f64 {
        encoding::register_to_frequency(self.shadow.frequency(register), self.config.mclk_hz)
    }

    /// The phase stored in a phase register, in degrees
    pub fn phase_deg(&self, register: PhaseRegister) -> f64 {
        encoding::register_to_phase(self.shadow.phase(register))
    }

    /// The waveform currently output
    pub fn waveform(&self) -> Waveform {
        self.shadow.waveform
    }

    /// The frequency register that drives the output
    pub fn active_frequency_register(&self) -> FrequencyRegister {
        self.shadow.active_frequency_register()
    }

    /// The phase register that drives the output
    pub fn active_phase_register(&self) -> PhaseRegister {
        self.shadow.active_phase_register()
    }
}
