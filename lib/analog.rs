use crate::hw::AdcLine;
use crate::{POSITION_MAX, SUPPLY_MV};

/// ADC input with conversions to millivolts and to a 0..=1000 position.
pub struct AnalogChannel<L> {
    line: L,
    reversed: bool,
}

impl<L: AdcLine> AnalogChannel<L> {
    pub fn new(line: L) -> Self {
        AnalogChannel {
            line,
            reversed: false,
        }
    }

    /// Position readings count down from `POSITION_MAX`.
    pub fn reversed(line: L) -> Self {
        AnalogChannel {
            line,
            reversed: true,
        }
    }

    pub fn read_raw(&mut self) -> Result<u16, L::Error> {
        self.line.read_raw()
    }

    pub fn read_millivolts(&mut self) -> Result<u16, L::Error> {
        let raw = self.line.read_raw()?;
        Ok(scale(raw, self.line.full_scale(), SUPPLY_MV) as u16)
    }

    pub fn position(&mut self) -> Result<u16, L::Error> {
        let raw = self.line.read_raw()?;
        let position = scale(raw, self.line.full_scale(), POSITION_MAX);
        if self.reversed {
            Ok((POSITION_MAX - position) as u16)
        } else {
            Ok(position as u16)
        }
    }
}

fn scale(raw: u16, full_scale: u16, max: u32) -> u32 {
    if full_scale == 0 {
        return 0;
    }
    (raw as u32 * max / full_scale as u32).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAdc;

    #[test]
    fn millivolts_span_the_supply() {
        let adc = FakeAdc::scripted(vec![Ok(0), Ok(4095), Ok(2048), Ok(u16::MAX)], 0);
        let mut channel = AnalogChannel::new(adc);
        assert_eq!(channel.read_millivolts(), Ok(0));
        assert_eq!(channel.read_millivolts(), Ok(3300));
        assert_eq!(channel.read_millivolts(), Ok(1650));
        assert_eq!(channel.read_millivolts(), Ok(3300));
    }

    #[test]
    fn position_and_reversed_position() {
        let mut forward = AnalogChannel::new(FakeAdc::constant(1024));
        let mut reversed = AnalogChannel::reversed(FakeAdc::constant(1024));
        assert_eq!(forward.position(), Ok(250));
        assert_eq!(reversed.position(), Ok(750));
    }

    #[test]
    fn read_failure_is_propagated() {
        let mut channel = AnalogChannel::new(FakeAdc::scripted(vec![Err(())], 0));
        assert_eq!(channel.read_millivolts(), Err(()));
        assert_eq!(channel.read_raw(), Ok(0));
    }
}
