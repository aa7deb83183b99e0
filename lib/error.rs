use core::convert::Infallible;
use core::fmt;

pub type Result<T, LCDER = Infallible> = core::result::Result<T, Error<LCDER>>;

/// Rejection of a signal configuration or preset request.
///
/// Always returned before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Signal selector outside of the known waveforms
    UnknownSignalKind,
    /// Frequency too low, one period does not fit the sample table
    TableOverflow,
    /// Frequency too high, one period is shorter than a tick
    FrequencyTooHigh,
    /// Peak to peak amplitude above the supply
    AmplitudeOutOfRange,
    /// Duty cycle not within 0..=100 %
    DutyCycleOutOfRange,
    /// No preset with this index
    PresetIndexOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::UnknownSignalKind => "unknown signal kind",
            ConfigError::TableOverflow => "frequency too low for the sample table",
            ConfigError::FrequencyTooHigh => "frequency too high for the tick period",
            ConfigError::AmplitudeOutOfRange => "amplitude higher than supply",
            ConfigError::DutyCycleOutOfRange => "duty cycle outside 0..=100 %",
            ConfigError::PresetIndexOutOfRange => "preset index out of range",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    Timer,
    Dac,
}

#[derive(Debug)]
pub enum Error<LCD> {
    // Rejected configuration
    Config(ConfigError),
    // Engine could not bring up its peripheral
    PeripheralInit(Peripheral),
    // Hw LCD error
    Lcd(LCD),
    // Input queue full
    Queue,
    // Buffer
    BufferWrite,
}

impl<LCD> From<ConfigError> for Error<LCD> {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl<LCD: fmt::Debug> fmt::Display for Error<LCD> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(err) => write!(f, "configuration rejected: {}", err),
            Error::PeripheralInit(peripheral) => {
                write!(f, "{:?} initialization failed", peripheral)
            }
            Error::Lcd(err) => write!(f, "lcd error: {:?}", err),
            Error::Queue => f.write_str("input queue full"),
            Error::BufferWrite => f.write_str("text buffer overflow"),
        }
    }
}
