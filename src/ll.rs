//! Low-level interface to the AD9833
//!
//! This module implements a register-level interface to the AD9833. Users of
//! this library should typically not need to use this. Please consider using
//! the [high-level interface] instead.
//!
//! The AD9833 has no read path. Every access is a single 16-bit word, shifted
//! in MSB first while FSYNC is held low. The top bits of the word select the
//! target register, the remaining bits carry the payload.
//!
//! **NOTE**: Payloads that are wider than the target register are silently
//! truncated to the register's width.
//!
//! [high-level interface]: ../hl/index.html

use core::fmt;

use embedded_hal::{blocking::spi, digital::v2::OutputPin};

use crate::configs::Waveform;

/// Entry point to the AD9833 driver's low-level API
///
/// Please consider using [hl::AD9833] instead.
///
/// [hl::AD9833]: ../hl/struct.AD9833.html
pub struct AD9833<SPI, CS> {
    spi: SPI,
    fsync: CS,
}

impl<SPI, CS> AD9833<SPI, CS> {
    /// Create a new instance of `AD9833`
    ///
    /// Requires the SPI peripheral and the FSYNC pin that are connected to the
    /// AD9833. No communication takes place.
    pub fn new(spi: SPI, fsync: CS) -> Self {
        AD9833 { spi, fsync }
    }

    /// Return the SPI peripheral and the FSYNC pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.fsync)
    }
}

impl<SPI, CS> AD9833<SPI, CS>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    /// Drive FSYNC high, so the chip ignores the bus until the first frame
    pub fn configure_select_line(&mut self) -> Result<(), Error<SPI, CS>> {
        self.fsync.set_high().map_err(|err| Error::ChipSelect(err))
    }

    /// Start a bus session
    ///
    /// The session holds the bus exclusively until it is dropped. Words written
    /// through it are transmitted back to back, with nothing else in between.
    pub fn session(&mut self) -> Session<'_, SPI, CS> {
        log::trace!(target: "ad9833::bus", "session start");

        Session {
            ll: self,
            frame_open: false,
            words: 0,
        }
    }
}

/// Exclusive access to the bus for the duration of one operation
///
/// Created by [`AD9833::session`].
pub struct Session<'s, SPI, CS>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    ll: &'s mut AD9833<SPI, CS>,
    frame_open: bool,
    words: usize,
}

impl<'s, SPI, CS> Session<'s, SPI, CS>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    /// Write a payload to a register
    pub fn write(&mut self, register: Register, payload: u16) -> Result<(), Error<SPI, CS>> {
        self.write_word(register.word(payload))
    }

    /// Write a control word
    pub fn write_control(&mut self, control: ControlWord) -> Result<(), Error<SPI, CS>> {
        self.write(Register::Control, control.bits())
    }

    /// Transmit a raw 16-bit word, framed by FSYNC
    pub fn write_word(&mut self, word: u16) -> Result<(), Error<SPI, CS>> {
        log::trace!(target: "ad9833::bus", "write 0x{:04x}", word);

        self.frame_open = true;
        self.ll
            .fsync
            .set_low()
            .map_err(|err| Error::ChipSelect(err))?;
        self.ll
            .spi
            .write(&word.to_be_bytes())
            .map_err(|err| Error::Write(err))?;
        self.ll
            .fsync
            .set_high()
            .map_err(|err| Error::ChipSelect(err))?;
        self.frame_open = false;
        self.words += 1;

        Ok(())
    }

    /// The number of words transmitted so far in this session
    pub fn words(&self) -> usize {
        self.words
    }
}

impl<'s, SPI, CS> Drop for Session<'s, SPI, CS>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    fn drop(&mut self) {
        // A failed transfer leaves FSYNC low. Raising it is all we can do
        // here, and there is nobody left to report a second error to.
        if self.frame_open {
            let _ = self.ll.fsync.set_high();
        }

        log::trace!(target: "ad9833::bus", "session end ({} words)", self.words);
    }
}

/// The registers of the AD9833
///
/// Each register is selected by a tag in the most significant bits of the
/// transmitted word.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// The control register (D15..D14 = 00)
    Control,
    /// Frequency register 0 (D15..D14 = 01)
    Freq0,
    /// Frequency register 1 (D15..D14 = 10)
    Freq1,
    /// Phase register 0 (D15..D13 = 110)
    Phase0,
    /// Phase register 1 (D15..D13 = 111)
    Phase1,
}

impl Register {
    /// The address tag, already shifted into place
    pub fn address(self) -> u16 {
        match self {
            Register::Control => 0x0000,
            Register::Freq0 => 0x4000,
            Register::Freq1 => 0x8000,
            Register::Phase0 => 0xC000,
            Register::Phase1 => 0xE000,
        }
    }

    /// The bits of a word that carry this register's payload
    pub fn payload_mask(self) -> u16 {
        match self {
            Register::Control | Register::Freq0 | Register::Freq1 => 0x3FFF,
            Register::Phase0 | Register::Phase1 => 0x0FFF,
        }
    }

    /// Build the word that writes `payload` to this register
    pub fn word(self, payload: u16) -> u16 {
        self.address() | (payload & self.payload_mask())
    }
}

/// Generates the bit accessors of [`ControlWord`]
macro_rules! impl_control_bits {
    (
        $(
            $bit:expr,
            $getter:ident,
            $setter:ident;
            #[$doc:meta]
        )*
    ) => {
        impl ControlWord {
            $(
                #[$doc]
                pub fn $getter(&self) -> bool {
                    self.0 & (1 << $bit) != 0
                }

                #[$doc]
                pub fn $setter(&mut self, value: bool) -> &mut Self {
                    if value {
                        self.0 |= 1 << $bit;
                    } else {
                        self.0 &= !(1 << $bit);
                    }
                    self
                }
            )*
        }
    }
}

/// The content of the control register
///
/// Every bit is accessed through its own getter and setter, so changes are
/// always read-modify-write on the bits the caller names.
#[derive(Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlWord(u16);

impl_control_bits! {
    1, mode, set_mode;
    /// MODE (D1): triangle instead of sine output, when OPBITEN is clear
    3, div2, set_div2;
    /// DIV2 (D3): full-rate square wave when set, half-rate when clear
    5, opbiten, set_opbiten;
    /// OPBITEN (D5): output the DAC data MSB (square wave) instead of the DAC
    6, sleep12, set_sleep12;
    /// SLEEP12 (D6): power down the DAC
    7, sleep1, set_sleep1;
    /// SLEEP1 (D7): disable the internal MCLK
    8, reset, set_reset;
    /// RESET (D8): hold the phase accumulator and output at mid-scale
    10, pselect, set_pselect;
    /// PSELECT (D10): PHASE1 drives the output instead of PHASE0
    11, fselect, set_fselect;
    /// FSELECT (D11): FREQ1 drives the output instead of FREQ0
    12, hlb, set_hlb;
    /// HLB (D12): with B28 clear, frequency writes go to the upper 14 bits
    13, b28, set_b28;
    /// B28 (D13): frequency registers take two consecutive writes, LSBs first
}

impl ControlWord {
    /// The bits that select the output waveform
    const WAVEFORM_BITS: u16 = (1 << 1) | (1 << 3) | (1 << 5);

    /// Create a control word from raw bits
    ///
    /// D15 and D14 are the address tag and are dropped.
    pub fn from_bits(bits: u16) -> Self {
        ControlWord(bits & Register::Control.payload_mask())
    }

    /// The raw bits of this control word
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// The waveform the output bits currently select
    pub fn waveform(&self) -> Waveform {
        match (self.opbiten(), self.div2(), self.mode()) {
            (true, true, _) => Waveform::Square,
            (true, false, _) => Waveform::SquareDiv2,
            (false, _, true) => Waveform::Triangle,
            (false, _, false) => Waveform::Sine,
        }
    }

    /// Replace the output bits with those for `waveform`
    ///
    /// All other bits are left alone.
    pub fn with_waveform(&mut self, waveform: Waveform) -> &mut Self {
        self.0 &= !Self::WAVEFORM_BITS;

        match waveform {
            Waveform::Sine => self,
            Waveform::Triangle => self.set_mode(true),
            Waveform::SquareDiv2 => self.set_opbiten(true),
            Waveform::Square => self.set_opbiten(true).set_div2(true),
        }
    }
}

impl fmt::Debug for ControlWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ControlWord(0x{:04x})", self.0)
    }
}

/// An SPI error that can occur when communicating with the AD9833
pub enum Error<SPI, CS>
where
    SPI: spi::Write<u8>,
    CS: OutputPin,
{
    /// SPI error occured during a write transaction
    Write(<SPI as spi::Write<u8>>::Error),

    /// Error occured while changing the FSYNC signal
    ChipSelect(<CS as OutputPin>::Error),
}

// We can't derive this implementation, as the compiler will complain that the
// associated error type doesn't implement `Debug`.
impl<SPI, CS> fmt::Debug for Error<SPI, CS>
where
    SPI: spi::Write<u8>,
    <SPI as spi::Write<u8>>::Error: fmt::Debug,
    CS: OutputPin,
    <CS as OutputPin>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write(error) => write!(f, "Write({:?})", error),
            Error::ChipSelect(error) => write!(f, "ChipSelect({:?})", error),
        }
    }
}
