//! Host doubles for the hardware traits.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use embedded_graphics::drawable::{Drawable, Pixel};
use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::DrawTarget;
use embedded_hal::digital::v2::OutputPin;

use crate::hw::{AdcLine, AlarmTimer, DacLine, Lcd};

#[derive(Default)]
pub struct TimerProbe {
    pub running: AtomicBool,
    pub starts: AtomicUsize,
    pub unpends: AtomicUsize,
}

#[derive(Clone)]
pub struct FakeTimer {
    period_us: u32,
    pub probe: Arc<TimerProbe>,
}

impl FakeTimer {
    pub fn new(period_us: u32) -> Self {
        FakeTimer {
            period_us,
            probe: Arc::new(TimerProbe::default()),
        }
    }

    pub fn running(&self) -> bool {
        self.probe.running.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.probe.starts.load(Ordering::SeqCst)
    }

    pub fn unpends(&self) -> usize {
        self.probe.unpends.load(Ordering::SeqCst)
    }
}

impl AlarmTimer for FakeTimer {
    fn period_us(&self) -> u32 {
        self.period_us
    }

    fn start(&mut self) {
        self.probe.running.store(true, Ordering::SeqCst);
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.probe.running.store(false, Ordering::SeqCst);
    }

    fn unpend(&mut self) {
        self.probe.unpends.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct FakeDac {
    pub fail_enable: bool,
    pub enabled: Arc<AtomicBool>,
    pub outputs: Arc<Mutex<Vec<u8>>>,
}

impl FakeDac {
    pub fn broken() -> Self {
        FakeDac {
            fail_enable: true,
            ..FakeDac::default()
        }
    }

    pub fn take_outputs(&self) -> Vec<u8> {
        std::mem::take(&mut *self.outputs.lock().unwrap())
    }
}

impl DacLine for FakeDac {
    type Error = ();

    fn enable(&mut self) -> Result<(), Self::Error> {
        if self.fail_enable {
            return Err(());
        }
        self.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn output(&mut self, code: u8) {
        self.outputs.lock().unwrap().push(code);
    }
}

/// Replays scripted conversions, then keeps returning `idle`.
#[derive(Clone)]
pub struct FakeAdc {
    script: Arc<Mutex<VecDeque<Result<u16, ()>>>>,
    idle: u16,
}

impl FakeAdc {
    pub fn constant(raw: u16) -> Self {
        FakeAdc {
            script: Arc::new(Mutex::new(VecDeque::new())),
            idle: raw,
        }
    }

    pub fn scripted<I>(readings: I, idle: u16) -> Self
    where
        I: IntoIterator<Item = Result<u16, ()>>,
    {
        FakeAdc {
            script: Arc::new(Mutex::new(readings.into_iter().collect())),
            idle,
        }
    }
}

impl AdcLine for FakeAdc {
    type Error = ();

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(self.idle))
    }
}

#[derive(Clone, Default)]
pub struct FakePin {
    level: Arc<AtomicBool>,
}

impl FakePin {
    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct Canvas {
    pixels: Vec<Pixel<Rgb565>>,
}

impl DrawTarget<Rgb565> for Canvas {
    type Error = Infallible;

    fn draw_pixel(&mut self, pixel: Pixel<Rgb565>) -> Result<(), Self::Error> {
        self.pixels.push(pixel);
        Ok(())
    }

    fn size(&self) -> Size {
        Size::new(480, 320)
    }
}

/// Records every pixel drawn since the last `clear`.
pub struct FakeLcd {
    canvas: Canvas,
    pub clears: usize,
    pub draws: usize,
}

impl FakeLcd {
    pub fn new() -> Self {
        FakeLcd {
            canvas: Canvas { pixels: Vec::new() },
            clears: 0,
            draws: 0,
        }
    }

    pub fn pixels(&self) -> &[Pixel<Rgb565>] {
        &self.canvas.pixels
    }

    pub fn count_color(&self, color: Rgb565) -> usize {
        self.canvas
            .pixels
            .iter()
            .filter(|Pixel(_, c)| *c == color)
            .count()
    }
}

impl Lcd for FakeLcd {
    type Error = Infallible;

    fn clear(&mut self, _color: Rgb565) -> Result<(), Self::Error> {
        self.canvas.pixels.clear();
        self.clears += 1;
        Ok(())
    }

    fn draw<D: Drawable<Rgb565>>(&mut self, drawable: D) -> Result<(), Self::Error> {
        self.draws += 1;
        drawable.draw(&mut self.canvas)
    }
}
