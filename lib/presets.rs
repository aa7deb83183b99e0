use crate::config::SignalConfig;
use crate::error::ConfigError;
use crate::generator::SignalGenerator;
use crate::hw::{AlarmTimer, DacLine};
use crate::PRESET_COUNT;

/// Stored signal configurations, all slots start at the default config.
pub struct PresetBank<const N: usize = PRESET_COUNT> {
    presets: [SignalConfig; N],
}

impl<const N: usize> PresetBank<N> {
    pub fn new() -> Self {
        PresetBank {
            presets: [SignalConfig::DEFAULT; N],
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    /// Stores `config` without validating it, `load` does that.
    pub fn save(&mut self, config: SignalConfig, index: usize) -> Result<(), ConfigError> {
        let slot = self
            .presets
            .get_mut(index)
            .ok_or(ConfigError::PresetIndexOutOfRange)?;
        *slot = config;
        debug!("preset {=usize} saved", index);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<SignalConfig, ConfigError> {
        self.presets
            .get(index)
            .copied()
            .ok_or(ConfigError::PresetIndexOutOfRange)
    }

    pub fn load<OUT, TIM>(
        &self,
        index: usize,
        generator: &SignalGenerator<OUT, TIM>,
    ) -> Result<SignalConfig, ConfigError>
    where
        OUT: DacLine,
        TIM: AlarmTimer,
    {
        let config = self.get(index)?;
        generator.set_config(config)?;
        debug!("preset {=usize} loaded", index);
        Ok(config)
    }
}

impl<const N: usize> Default for PresetBank<N> {
    fn default() -> Self {
        PresetBank::new()
    }
}
