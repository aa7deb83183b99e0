use embedded_graphics::drawable::Drawable;
use embedded_graphics::pixelcolor::Rgb565;

use crate::ADC_FULL_SCALE;

#[cfg(feature = "hardware")]
mod adc;
#[cfg(feature = "hardware")]
mod dac;
#[cfg(feature = "hardware")]
mod helper;
#[cfg(feature = "hardware")]
mod lcd;
#[cfg(feature = "hardware")]
mod timers;

#[cfg(feature = "hardware")]
pub use adc::{AdcError, AdcPin, SharedAdc};
#[cfg(feature = "hardware")]
pub use dac::{DacError, DacOutput};
#[cfg(feature = "hardware")]
pub use helper::*;
#[cfg(feature = "hardware")]
pub use lcd::IliError;
#[cfg(feature = "hardware")]
pub use timers::{GeneratorTimer, MillisTimer, ScopeTimerA, ScopeTimerB};

/// Periodic timer raising one interrupt per period.
pub trait AlarmTimer {
    fn period_us(&self) -> u32;
    fn start(&mut self);
    fn stop(&mut self);
    /// Acknowledge the pending interrupt.
    fn unpend(&mut self);
}

pub trait AdcLine {
    type Error;
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
    fn full_scale(&self) -> u16 {
        ADC_FULL_SCALE
    }
}

/// 8-bit analog output.
pub trait DacLine {
    type Error;
    fn enable(&mut self) -> Result<(), Self::Error>;
    fn output(&mut self, code: u8);
}

pub trait Lcd {
    type Error;
    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error>;
    fn draw<D: Drawable<Rgb565>>(&mut self, drawable: D) -> Result<(), Self::Error>;
}

/// Timer owned by an engine, remembering whether it was started.
pub struct TickSource<T> {
    timer: T,
    running: bool,
}

impl<T: AlarmTimer> TickSource<T> {
    pub fn new(timer: T) -> Self {
        TickSource {
            timer,
            running: false,
        }
    }

    pub fn period_us(&self) -> u32 {
        self.timer.period_us()
    }

    pub fn start(&mut self) {
        if !self.running {
            self.timer.start();
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.timer.stop();
            self.running = false;
        }
    }

    pub fn unpend(&mut self) {
        self.timer.unpend();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
