use core::cell::RefCell;

use critical_section::Mutex;
use stm32g0xx_hal::analog::adc::{Adc as HalAdc, AdcExt, Precision, SampleTime};
use stm32g0xx_hal::hal::adc::{Channel, OneShot};
use stm32g0xx_hal::nb;
use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32::ADC;

use crate::hw::AdcLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Converter in use by another context
    Busy,
    Conversion,
}

/// Single converter shared by every analog input.
pub struct SharedAdc {
    adc: Mutex<RefCell<HalAdc>>,
}

impl SharedAdc {
    pub fn new(pac_adc: ADC, rcc: &mut Rcc) -> Self {
        let mut adc = pac_adc.constrain(rcc);
        adc.set_sample_time(SampleTime::T_80);
        adc.set_precision(Precision::B_12);
        adc.calibrate();
        SharedAdc {
            adc: Mutex::new(RefCell::new(adc)),
        }
    }

    pub fn pin<PIN>(&self, pin: PIN) -> AdcPin<'_, PIN>
    where
        PIN: Channel<HalAdc, ID = u8>,
    {
        AdcPin { adc: self, pin }
    }
}

pub struct AdcPin<'a, PIN> {
    adc: &'a SharedAdc,
    pin: PIN,
}

impl<'a, PIN> AdcLine for AdcPin<'a, PIN>
where
    PIN: Channel<HalAdc, ID = u8>,
    HalAdc: OneShot<HalAdc, u16, PIN>,
{
    type Error = AdcError;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        let shared = self.adc;
        let pin = &mut self.pin;
        critical_section::with(|cs| {
            let mut adc = shared
                .adc
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| AdcError::Busy)?;
            match adc.read(pin) {
                Ok(raw) => Ok(raw),
                Err(nb::Error::WouldBlock) => Err(AdcError::Busy),
                Err(nb::Error::Other(_)) => Err(AdcError::Conversion),
            }
        })
    }
}
