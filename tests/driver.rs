//! Driver integration tests, verifying the exact words sent for each operation.
//!
//! Every word the AD9833 receives is checked as two SPI bytes, MSB first,
//! framed by a low and a high edge on FSYNC.
//!
//! Run with: cargo test --test driver

use ad9833::{
    ll, Config, Error, FrequencyRegister, InitValues, PhaseRegister, Ready, Waveform, AD9833,
};
use embedded_hal_mock::pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
use embedded_hal_mock::spi::{Mock as SpiMock, Transaction as SpiTransaction};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Words sent by `init()`: reset, both frequency registers cleared in 28-bit
/// mode, both phase registers cleared, reset released.
const INIT_WORDS: [u16; 10] = [
    0x0100, // RESET
    0x2100, // RESET | B28
    0x4000, 0x4000, // FREQ0 lower, upper
    0x2100, // RESET | B28
    0x8000, 0x8000, // FREQ1 lower, upper
    0xC000, // PHASE0
    0xE000, // PHASE1
    0x0000, // release RESET
];

/// SPI and FSYNC expectations for a sequence of framed words.
fn frames(words: &[u16]) -> (Vec<SpiTransaction>, Vec<PinTransaction>) {
    let spi = words
        .iter()
        .map(|word| SpiTransaction::write(word.to_be_bytes().to_vec()))
        .collect();
    let fsync = words
        .iter()
        .flat_map(|_| {
            vec![
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::High),
            ]
        })
        .collect();

    (spi, fsync)
}

/// Expectations for an `init()` followed by `words`.
fn init_then(words: &[u16]) -> (Vec<SpiTransaction>, Vec<PinTransaction>) {
    let mut all = INIT_WORDS.to_vec();
    all.extend_from_slice(words);

    let (spi, mut fsync) = frames(&all);
    // FSYNC is raised once before the first frame.
    fsync.insert(0, PinTransaction::set(PinState::High));

    (spi, fsync)
}

struct Harness {
    spi: SpiMock,
    fsync: PinMock,
}

impl Harness {
    fn new(expected: (Vec<SpiTransaction>, Vec<PinTransaction>)) -> Self {
        Harness {
            spi: SpiMock::new(&expected.0),
            fsync: PinMock::new(&expected.1),
        }
    }

    fn ready(&self) -> AD9833<SpiMock, PinMock, Ready> {
        AD9833::new(self.spi.clone(), self.fsync.clone())
            .init()
            .expect("init failed")
    }

    fn done(mut self) {
        self.spi.done();
        self.fsync.done();
    }
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

#[test]
fn init_resets_and_clears_all_registers() {
    let harness = Harness::new(init_then(&[]));
    let ad9833 = harness.ready();

    let state = ad9833.state();
    assert_eq!(state.control().bits(), 0x0000);
    assert_eq!(state.frequency(FrequencyRegister::Freq0), 0);
    assert_eq!(state.frequency(FrequencyRegister::Freq1), 0);
    assert_eq!(state.phase(PhaseRegister::Phase0), 0);
    assert_eq!(state.phase(PhaseRegister::Phase1), 0);
    assert_eq!(state.waveform(), Waveform::Sine);

    harness.done();
}

#[test]
fn init_with_loads_initial_values() {
    let (spi, mut fsync) = frames(&[
        0x0100, 0x2100, 0x570A, 0x428F, // FREQ0 = 1 MHz
        0x2100, 0x8000, 0x8000, // FREQ1 = 0
        0xC800, // PHASE0 = 180 deg
        0xE000, 0x0000,
    ]);
    fsync.insert(0, PinTransaction::set(PinState::High));
    let harness = Harness::new((spi, fsync));

    let values = InitValues {
        freq0_hz: 1_000_000.0,
        phase0_deg: 180.0,
        ..InitValues::default()
    };
    let ad9833 = AD9833::new(harness.spi.clone(), harness.fsync.clone())
        .init_with(values)
        .expect("init failed");

    assert_eq!(ad9833.state().frequency(FrequencyRegister::Freq0), 10_737_418);
    assert_eq!(ad9833.state().phase(PhaseRegister::Phase0), 2048);

    harness.done();
}

#[test]
fn init_with_rejects_invalid_values_before_touching_the_bus() {
    let harness = Harness::new((vec![], vec![]));

    let values = InitValues {
        phase1_deg: 400.0,
        ..InitValues::default()
    };
    let result = AD9833::new(harness.spi.clone(), harness.fsync.clone()).init_with(values);

    assert!(matches!(result, Err(Error::PhaseOutOfRange)));

    harness.done();
}

#[test]
fn reset_repeats_the_init_sequence() {
    let mut words = vec![0x0028]; // Square
    words.extend_from_slice(&INIT_WORDS);
    let (spi, mut fsync) = init_then(&words);
    // `reset` raises FSYNC before its first frame, too.
    fsync.insert(1 + 2 * (INIT_WORDS.len() + 1), PinTransaction::set(PinState::High));
    let harness = Harness::new((spi, fsync));
    let mut ad9833 = harness.ready();

    ad9833.set_waveform(Waveform::Square).unwrap();
    ad9833.reset().unwrap();

    assert_eq!(ad9833.waveform(), Waveform::Sine);
    assert_eq!(ad9833.state().control().bits(), 0x0000);

    harness.done();
}

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

#[test]
fn frequency_with_unchanged_upper_half_writes_lower_half_only() {
    // 1 kHz = 0x29F1, which fits in the lower 14 bits.
    let harness = Harness::new(init_then(&[0x0000, 0x69F1]));
    let mut ad9833 = harness.ready();

    ad9833.set_frequency(1_000.0, FrequencyRegister::Freq0).unwrap();

    assert_eq!(ad9833.state().frequency(FrequencyRegister::Freq0), 10_737);

    harness.done();
}

#[test]
fn frequency_with_unchanged_lower_half_writes_upper_half_only() {
    // Exactly 0x4000: lower half stays zero, upper half becomes 1.
    let harness = Harness::new(init_then(&[0x1000, 0x8001]));
    let mut ad9833 = harness.ready();

    ad9833
        .set_frequency(1_525.878_906_25, FrequencyRegister::Freq1)
        .unwrap();

    assert_eq!(ad9833.state().frequency(FrequencyRegister::Freq1), 0x4000);
    // HLB is not kept around.
    assert_eq!(ad9833.state().control().bits(), 0x0000);

    harness.done();
}

#[test]
fn frequency_with_both_halves_changed_writes_28_bits() {
    // 1 MHz = 0xA3D70A: lower 0x170A, upper 0x028F.
    let harness = Harness::new(init_then(&[0x2000, 0x570A, 0x428F]));
    let mut ad9833 = harness.ready();

    ad9833
        .set_frequency(1_000_000.0, FrequencyRegister::Freq0)
        .unwrap();

    assert_eq!(ad9833.state().frequency(FrequencyRegister::Freq0), 0xA3D70A);
    assert!(!ad9833.state().control().b28());

    harness.done();
}

#[test]
fn repeated_frequency_is_written_once() {
    let harness = Harness::new(init_then(&[0x0000, 0x69F1]));
    let mut ad9833 = harness.ready();

    ad9833.set_frequency(1_000.0, FrequencyRegister::Freq0).unwrap();
    ad9833.set_frequency(1_000.0, FrequencyRegister::Freq0).unwrap();

    harness.done();
}

#[test]
fn out_of_range_frequency_is_rejected() {
    let harness = Harness::new(init_then(&[]));
    let mut ad9833 = harness.ready();
    let before = *ad9833.state();

    let mclk = Config::default().mclk_hz as f64;
    for &freq in [-1.0, mclk + 1.0, f64::NAN, f64::INFINITY].iter() {
        let result = ad9833.set_frequency(freq, FrequencyRegister::Freq0);
        assert!(matches!(result, Err(Error::FrequencyOutOfRange)));
    }

    assert_eq!(*ad9833.state(), before);

    harness.done();
}

#[test]
fn master_clock_frequency_is_accepted() {
    // 0x0FFFFFFF: both halves 0x3FFF.
    let harness = Harness::new(init_then(&[0x2000, 0x7FFF, 0x7FFF]));
    let mut ad9833 = harness.ready();

    ad9833
        .set_frequency(25_000_000.0, FrequencyRegister::Freq0)
        .unwrap();

    assert_eq!(ad9833.state().frequency(FrequencyRegister::Freq0), 0x0FFF_FFFF);

    harness.done();
}

#[test]
fn frequency_write_keeps_waveform_and_select_bits() {
    let harness = Harness::new(init_then(&[
        0x0028, // Square
        0x0828, // FSELECT
        0x0828, 0xA9F1, // FREQ1 lower half, control unchanged
    ]));
    let mut ad9833 = harness.ready();

    ad9833.set_waveform(Waveform::Square).unwrap();
    ad9833.toggle_frequency_select().unwrap();
    ad9833.set_frequency_active(1_000.0).unwrap();

    assert_eq!(ad9833.state().control().bits(), 0x0828);
    assert_eq!(ad9833.waveform(), Waveform::Square);

    harness.done();
}

#[test]
fn read_back_frequency_in_hz() {
    let harness = Harness::new(init_then(&[0x0000, 0x69F1]));
    let mut ad9833 = harness.ready();

    ad9833.set_frequency(1_000.0, FrequencyRegister::Freq0).unwrap();

    let freq = ad9833.frequency_hz(FrequencyRegister::Freq0);
    assert!(freq > 999.9 && freq <= 1_000.0);
    assert_eq!(ad9833.frequency_hz(FrequencyRegister::Freq1), 0.0);

    harness.done();
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[test]
fn phase_is_a_single_write() {
    let harness = Harness::new(init_then(&[0xC400, 0xE800]));
    let mut ad9833 = harness.ready();

    ad9833.set_phase(90.0, PhaseRegister::Phase0).unwrap();
    ad9833.set_phase(180.0, PhaseRegister::Phase1).unwrap();
    ad9833.set_phase(90.0, PhaseRegister::Phase0).unwrap();

    assert_eq!(ad9833.state().phase(PhaseRegister::Phase0), 1024);
    assert_eq!(ad9833.phase_deg(PhaseRegister::Phase1), 180.0);

    harness.done();
}

#[test]
fn full_turn_is_programmed_as_zero() {
    let harness = Harness::new(init_then(&[0xC400, 0xC000]));
    let mut ad9833 = harness.ready();

    ad9833.set_phase(90.0, PhaseRegister::Phase0).unwrap();
    ad9833.set_phase(360.0, PhaseRegister::Phase0).unwrap();

    assert_eq!(ad9833.state().phase(PhaseRegister::Phase0), 0);

    harness.done();
}

#[test]
fn out_of_range_phase_is_rejected() {
    let harness = Harness::new(init_then(&[]));
    let mut ad9833 = harness.ready();
    let before = *ad9833.state();

    for &phase in [-0.5, 360.5, f64::NAN].iter() {
        let result = ad9833.set_phase(phase, PhaseRegister::Phase1);
        assert!(matches!(result, Err(Error::PhaseOutOfRange)));
    }

    assert_eq!(*ad9833.state(), before);

    harness.done();
}

#[test]
fn active_phase_follows_select_bit() {
    let harness = Harness::new(init_then(&[0x0400, 0xE2AA]));
    let mut ad9833 = harness.ready();

    ad9833.toggle_phase_select().unwrap();
    // 60 deg = 682.67 -> 0x2AA
    ad9833.set_phase_active(60.0).unwrap();

    assert_eq!(ad9833.active_phase_register(), PhaseRegister::Phase1);
    assert_eq!(ad9833.state().phase(PhaseRegister::Phase1), 0x2AA);

    harness.done();
}

// ---------------------------------------------------------------------------
// Register selection
// ---------------------------------------------------------------------------

#[test]
fn toggling_frequency_select_twice_restores_it() {
    let harness = Harness::new(init_then(&[0x0800, 0x0000]));
    let mut ad9833 = harness.ready();

    ad9833.toggle_frequency_select().unwrap();
    assert_eq!(ad9833.active_frequency_register(), FrequencyRegister::Freq1);

    ad9833.toggle_frequency_select().unwrap();
    assert_eq!(ad9833.active_frequency_register(), FrequencyRegister::Freq0);

    harness.done();
}

#[test]
fn selecting_the_live_register_writes_nothing() {
    let harness = Harness::new(init_then(&[0x0400]));
    let mut ad9833 = harness.ready();

    ad9833.select_frequency(FrequencyRegister::Freq0).unwrap();
    ad9833.select_phase(PhaseRegister::Phase1).unwrap();
    ad9833.select_phase(PhaseRegister::Phase1).unwrap();

    assert_eq!(ad9833.active_phase_register(), PhaseRegister::Phase1);

    harness.done();
}

// ---------------------------------------------------------------------------
// Waveform
// ---------------------------------------------------------------------------

#[test]
fn current_waveform_writes_nothing() {
    let harness = Harness::new(init_then(&[]));
    let mut ad9833 = harness.ready();

    ad9833.set_waveform(Waveform::Sine).unwrap();

    harness.done();
}

#[test]
fn each_waveform_is_one_control_write() {
    let harness = Harness::new(init_then(&[0x0002, 0x0020, 0x0028, 0x0000]));
    let mut ad9833 = harness.ready();

    ad9833.set_waveform(Waveform::Triangle).unwrap();
    ad9833.set_waveform(Waveform::SquareDiv2).unwrap();
    ad9833.set_waveform(Waveform::Square).unwrap();
    ad9833.set_waveform(Waveform::Sine).unwrap();

    assert_eq!(ad9833.waveform(), Waveform::Sine);

    harness.done();
}

#[test]
fn waveform_keeps_select_bits() {
    let harness = Harness::new(init_then(&[0x0800, 0x0400 | 0x0800, 0x0C02]));
    let mut ad9833 = harness.ready();

    ad9833.toggle_frequency_select().unwrap();
    ad9833.toggle_phase_select().unwrap();
    ad9833.set_waveform(Waveform::Triangle).unwrap();

    assert_eq!(ad9833.state().control().waveform(), Waveform::Triangle);

    harness.done();
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn frequency_phase_and_waveform() {
    let harness = Harness::new(init_then(&[0x0000, 0x69F1, 0xC400, 0x0028]));
    let mut ad9833 = harness.ready();

    ad9833.set_frequency(1_000.0, FrequencyRegister::Freq0).unwrap();
    ad9833.set_phase(90.0, PhaseRegister::Phase0).unwrap();
    ad9833.set_waveform(Waveform::Square).unwrap();

    let state = ad9833.state();
    assert_eq!(state.frequency(FrequencyRegister::Freq0), 10_737);
    assert_eq!(state.phase(PhaseRegister::Phase0), 1024);
    assert_eq!(state.waveform(), Waveform::Square);
    assert!(state.control().opbiten());
    assert!(state.control().div2());

    harness.done();
}

#[test]
fn custom_master_clock() {
    // 1 kHz at 1 MHz MCLK: 2^28 / 1000 = 268435.456 -> 0x41893
    let harness = Harness::new(init_then(&[0x2000, 0x5893, 0x4010]));
    let config = Config { mclk_hz: 1_000_000 };
    let mut ad9833 =
        AD9833::new_with_config(harness.spi.clone(), harness.fsync.clone(), config)
            .init()
            .unwrap();

    ad9833.set_frequency(1_000.0, FrequencyRegister::Freq0).unwrap();

    let result = ad9833.set_frequency(1_000_001.0, FrequencyRegister::Freq0);
    assert!(matches!(result, Err(Error::FrequencyOutOfRange)));

    harness.done();
}

// ---------------------------------------------------------------------------
// Bus failures
// ---------------------------------------------------------------------------

/// An SPI bus that starts failing after a number of successful writes.
struct FlakySpi {
    writes_left: usize,
}

impl embedded_hal::blocking::spi::Write<u8> for FlakySpi {
    type Error = ();

    fn write(&mut self, _: &[u8]) -> Result<(), ()> {
        if self.writes_left == 0 {
            return Err(());
        }
        self.writes_left -= 1;
        Ok(())
    }
}

/// An FSYNC pin that remembers its level.
struct Pin {
    high: bool,
}

impl embedded_hal::digital::v2::OutputPin for Pin {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

#[test]
fn bus_error_is_reported_and_shadow_left_alone() {
    let spi = FlakySpi {
        writes_left: INIT_WORDS.len() + 1,
    };
    let mut ad9833 = AD9833::new(spi, Pin { high: false }).init().unwrap();

    // The control word goes out, the lower half doesn't.
    let result = ad9833.set_frequency(1_000_000.0, FrequencyRegister::Freq0);
    assert!(matches!(result, Err(Error::Bus(ll::Error::Write(())))));
    assert_eq!(ad9833.state().frequency(FrequencyRegister::Freq0), 0);

    // The aborted frame has been closed again.
    let (_, fsync) = ad9833.release();
    assert!(fsync.high);
}

#[test]
fn bus_error_during_init_is_reported() {
    let spi = FlakySpi { writes_left: 3 };
    let result = AD9833::new(spi, Pin { high: false }).init();

    assert!(matches!(result, Err(Error::Bus(ll::Error::Write(())))));
}

#[test]
fn bus_error_is_debug_formatted() {
    let error: Error<FlakySpi, Pin> = Error::Bus(ll::Error::Write(()));
    assert_eq!(format!("{:?}", error), "Bus(Write(()))");

    let error: Error<FlakySpi, Pin> = Error::FrequencyOutOfRange;
    assert_eq!(format!("{:?}", error), "FrequencyOutOfRange");
}
