//! Driver crate for the AD9833 programmable waveform generator
//!
//! The AD9833 is a direct digital synthesis (DDS) chip from Analog Devices. It
//! generates sine, triangle and square waves, and is programmed through a
//! write-only, 16-bit SPI interface framed by its FSYNC pin.
//!
//! This crate offers two layers:
//!
//! - The [high-level interface], which keeps a shadow copy of the chip's
//!   registers and turns frequency (Hz), phase (degrees) and waveform requests
//!   into the shortest valid sequence of register writes.
//! - The [register-level interface], which frames individual words.
//!
//! Please consider using the high-level interface, unless you know what you
//! are doing.
//!
//! ``` rust,ignore
//! let mut ad9833 = ad9833::AD9833::new(spi, fsync).init()?;
//!
//! ad9833.set_frequency(1_000.0, ad9833::FrequencyRegister::Freq0)?;
//! ad9833.set_phase(90.0, ad9833::PhaseRegister::Phase0)?;
//! ad9833.set_waveform(ad9833::Waveform::Square)?;
//! ```
//!
//! The SPI peripheral needs to be configured with [`SPI_MODE`], MSB first, at a
//! clock no faster than [`MAX_SPI_FREQUENCY_HZ`].
//!
//! [high-level interface]: hl/index.html
//! [register-level interface]: ll/index.html

#![no_std]
#![deny(missing_docs)]

pub mod configs;
pub mod encoding;
pub mod hl;
pub mod ll;

pub use crate::{
    configs::{Config, FrequencyRegister, InitValues, PhaseRegister, Waveform},
    hl::{DeviceState, Error, Ready, Uninitialized, AD9833},
    ll::{ControlWord, Register},
};

/// The master clock frequency most AD9833 breakout boards are fitted with
pub const DEFAULT_MCLK_HZ: u32 = 25_000_000;

/// The fastest serial clock the AD9833 accepts
pub const MAX_SPI_FREQUENCY_HZ: u32 = 40_000_000;

/// The SPI mode the AD9833 expects
///
/// Data is sampled on the falling edge of SCLK, which idles high.
pub const SPI_MODE: embedded_hal::spi::Mode = embedded_hal::spi::MODE_2;
