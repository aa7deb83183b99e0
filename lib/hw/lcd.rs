use core::convert::Infallible;
use display_interface_parallel_gpio::WriteOnlyDataCommand;
use embedded_graphics::drawable::Drawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::DrawTarget;
use ili9341::{DisplaySize320x480, Error, Ili9341, Orientation};
use stm32g0xx_hal::hal::blocking::delay::DelayMs;
use stm32g0xx_hal::hal::digital::v2::OutputPin;

use crate::hw::Lcd;

#[derive(Debug)]
pub struct IliError(pub Error<Infallible>);

impl From<Error<Infallible>> for IliError {
    fn from(err: Error<Infallible>) -> Self {
        IliError(err)
    }
}

/// Resets the panel and brings it up in landscape, 480x320.
///
/// The read strobe is parked high, the bus is only ever written.
pub fn open<I, R, RD, D>(
    interface: I,
    reset: R,
    mut read_strobe: RD,
    delay: &mut D,
) -> Result<Ili9341<I, R>, IliError>
where
    I: WriteOnlyDataCommand,
    R: OutputPin<Error = Infallible>,
    RD: OutputPin<Error = Infallible>,
    D: DelayMs<u16>,
{
    let _ = read_strobe.set_high();
    let ili = Ili9341::new(
        interface,
        reset,
        delay,
        Orientation::Landscape,
        DisplaySize320x480,
    )?;
    Ok(ili)
}

impl<I, R> Lcd for Ili9341<I, R>
where
    I: WriteOnlyDataCommand,
    R: OutputPin<Error = Infallible>,
{
    type Error = IliError;

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        Ok(DrawTarget::clear(self, color)?)
    }

    fn draw<D: Drawable<Rgb565>>(&mut self, drawable: D) -> Result<(), Self::Error> {
        Ok(drawable.draw(self)?)
    }
}
