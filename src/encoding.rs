//! Conversions between physical units and register values
//!
//! The frequency registers hold a 28-bit tuning word. The output frequency is
//! `mclk * word / 2^28`. The phase registers hold a 12-bit offset, where 2^12
//! corresponds to a full turn.
//!
//! None of these functions validate their input. Range checks happen in the
//! [high-level interface](../hl/index.html) before anything is converted.

use crate::ll::Register;

/// 2^28, the full-scale value of a frequency register plus one
pub const FREQ_SCALE: f64 = (1u32 << 28) as f64;

/// The largest value a frequency register can hold
pub const FREQ_MAX: u32 = (1 << 28) - 1;

/// 2^12, the full-scale value of a phase register plus one
pub const PHASE_SCALE: f64 = (1u32 << 12) as f64;

/// The largest value a phase register can hold
pub const PHASE_MAX: u16 = (1 << 12) - 1;

const MASK_14: u32 = 0x3FFF;

/// The address tag of a register
pub fn address_of(register: Register) -> u16 {
    register.address()
}

/// Convert a frequency in Hz into a frequency register value
///
/// The result is truncated, and saturates at [`FREQ_MAX`], which is what
/// `mclk_hz` itself maps to.
pub fn frequency_to_register(freq_hz: f64, mclk_hz: u32) -> u32 {
    let word = freq_hz / mclk_hz as f64 * FREQ_SCALE;

    // `as` saturates negative values to zero.
    let word = word as u32;

    if word > FREQ_MAX {
        FREQ_MAX
    } else {
        word
    }
}

/// Convert a phase in degrees into a phase register value
///
/// The result is truncated and wraps around at a full turn, so 360° is
/// encoded like 0°.
pub fn phase_to_register(phase_deg: f64) -> u16 {
    // Scale degrees directly, so quarter turns encode exactly.
    let word = (phase_deg / 360.0 * PHASE_SCALE) as u32;

    (word & PHASE_MAX as u32) as u16
}

/// Split a frequency register value into its lower and upper 14 bits
pub fn split_frequency28(value: u32) -> (u16, u16) {
    let lower = value & MASK_14;
    let upper = (value >> 14) & MASK_14;

    (lower as u16, upper as u16)
}

/// Convert a frequency register value back into Hz
pub fn register_to_frequency(value: u32, mclk_hz: u32) -> f64 {
    value as f64 * mclk_hz as f64 / FREQ_SCALE
}

/// Convert a phase register value back into degrees
pub fn register_to_phase(value: u16) -> f64 {
    value as f64 * 360.0 / PHASE_SCALE
}
