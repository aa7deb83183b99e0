#![cfg_attr(not(test), no_std)]

#[cfg(feature = "hardware")]
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "hardware")]
use defmt_rtt as _; // global logger
#[cfg(feature = "hardware")]
use panic_probe as _;

// Logging macros are textually scoped, keep this first.
#[macro_use]
mod fmt;

pub mod acquisition;
pub mod analog;
pub mod chart;
pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod generator;
pub mod hw;
pub mod input;
pub mod led;
pub mod presets;
pub mod slot;
pub mod synth;

#[cfg(test)]
mod testing;

/// Period of the generator tick in microseconds.
pub const TICK_PERIOD_US: u32 = 30;
/// Capacity of the waveform sample table.
pub const TABLE_LEN: usize = 200;
/// Number of stored signal presets.
pub const PRESET_COUNT: usize = 5;

/// Analog supply, full scale of both converters.
pub const SUPPLY_MV: u32 = 3300;
/// Highest 8-bit DAC code.
pub const DAC_FULL_SCALE: u8 = 255;
/// Highest 12-bit ADC code.
pub const ADC_FULL_SCALE: u16 = 4095;
/// Upper bound of a position-mapped analog reading.
pub const POSITION_MAX: u32 = 1000;

/// Period of the acquisition tick in microseconds.
pub const SAMPLE_PERIOD_US: u32 = 250;
/// Time window covered by one capture buffer.
pub const WINDOW_MS: u32 = 50;
/// Samples per capture buffer.
pub const SAMPLE_NUM: usize = (WINDOW_MS * 1000 / SAMPLE_PERIOD_US) as usize;

/// Number of oscilloscope input channels.
pub const CHANNEL_COUNT: usize = 2;

#[cfg(feature = "hardware")]
static COUNT: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "hardware")]
defmt::timestamp!("{=usize}", {
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});
