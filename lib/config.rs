//! Signal configuration and its validation rules.

use core::convert::TryFrom;

use crate::error::ConfigError;
use crate::{DAC_FULL_SCALE, SUPPLY_MV, TABLE_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalKind {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Sine,
        SignalKind::Square,
        SignalKind::Triangle,
        SignalKind::Sawtooth,
    ];

    pub fn next(self) -> Self {
        let index = (u8::from(self) as usize + 1) % Self::ALL.len();
        Self::ALL[index]
    }

    pub fn prev(self) -> Self {
        let index = (u8::from(self) as usize + Self::ALL.len() - 1) % Self::ALL.len();
        Self::ALL[index]
    }

    pub fn name(self) -> &'static str {
        match self {
            SignalKind::Sine => "SINE",
            SignalKind::Square => "SQUARE",
            SignalKind::Triangle => "TRIANGLE",
            SignalKind::Sawtooth => "SAWTOOTH",
        }
    }
}

/// Selector index as shown on the panel.
impl From<SignalKind> for u8 {
    fn from(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Sine => 0,
            SignalKind::Square => 1,
            SignalKind::Triangle => 2,
            SignalKind::Sawtooth => 3,
        }
    }
}

impl TryFrom<u8> for SignalKind {
    type Error = ConfigError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        SignalKind::ALL
            .get(index as usize)
            .copied()
            .ok_or(ConfigError::UnknownSignalKind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalConfig {
    pub kind: SignalKind,
    pub frequency_hz: u32,
    /// Peak to peak
    pub amplitude_mv: u32,
    pub duty_cycle: u8,
}

impl SignalConfig {
    pub const DEFAULT: SignalConfig = SignalConfig {
        kind: SignalKind::Sine,
        frequency_hz: 1000,
        amplitude_mv: 1000,
        duty_cycle: 30,
    };

    /// Checks every field and returns the number of table points one period
    /// takes at the given tick period.
    pub fn validate(&self, tick_period_us: u32) -> Result<usize, ConfigError> {
        let points = check_frequency(self.frequency_hz, tick_period_us)?;
        check_amplitude(self.amplitude_mv)?;
        check_duty_cycle(self.duty_cycle)?;
        Ok(points)
    }

    pub fn amplitude_code(&self) -> u8 {
        amplitude_code(self.amplitude_mv)
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig::DEFAULT
    }
}

/// `round(1_000_000 / (tick_period_us * frequency_hz))`, `None` for a zero
/// frequency or tick period.
pub fn points_per_period(frequency_hz: u32, tick_period_us: u32) -> Option<usize> {
    let divisor = tick_period_us as u64 * frequency_hz as u64;
    if divisor == 0 {
        return None;
    }
    Some(((1_000_000 + divisor / 2) / divisor) as usize)
}

/// Peak to peak millivolts to DAC code, truncating.
pub fn amplitude_code(amplitude_mv: u32) -> u8 {
    (DAC_FULL_SCALE as u32 * amplitude_mv.min(SUPPLY_MV) / SUPPLY_MV) as u8
}

pub(crate) fn check_frequency(frequency_hz: u32, tick_period_us: u32) -> Result<usize, ConfigError> {
    match points_per_period(frequency_hz, tick_period_us) {
        None => Err(ConfigError::TableOverflow),
        Some(points) if points >= TABLE_LEN => Err(ConfigError::TableOverflow),
        Some(0) => Err(ConfigError::FrequencyTooHigh),
        Some(points) => Ok(points),
    }
}

pub(crate) fn check_amplitude(amplitude_mv: u32) -> Result<(), ConfigError> {
    if amplitude_mv > SUPPLY_MV {
        return Err(ConfigError::AmplitudeOutOfRange);
    }
    Ok(())
}

pub(crate) fn check_duty_cycle(duty_cycle: u8) -> Result<(), ConfigError> {
    if duty_cycle > 100 {
        return Err(ConfigError::DutyCycleOutOfRange);
    }
    Ok(())
}
