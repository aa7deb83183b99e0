use core::mem;

use stm32g0xx_hal::analog::dac::{Channel1, DacOut, Disabled, Enabled};

use crate::hw::DacLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacError {
    /// Channel lost during a previous enable
    Unavailable,
}

enum State {
    Disabled(Channel1<Disabled>),
    Enabled(Channel1<Enabled>),
    Lost,
}

/// DAC channel 1 on PA4, 8-bit codes written left aligned into 12 bits.
pub struct DacOutput {
    state: State,
}

impl DacOutput {
    pub fn new(channel: Channel1<Disabled>) -> Self {
        DacOutput {
            state: State::Disabled(channel),
        }
    }
}

impl DacLine for DacOutput {
    type Error = DacError;

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.state = match mem::replace(&mut self.state, State::Lost) {
            State::Disabled(channel) => State::Enabled(channel.enable()),
            State::Enabled(channel) => State::Enabled(channel),
            State::Lost => return Err(DacError::Unavailable),
        };
        Ok(())
    }

    fn output(&mut self, code: u8) {
        if let State::Enabled(channel) = &mut self.state {
            channel.set_value((code as u16) << 4);
        }
    }
}
