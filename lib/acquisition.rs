//! Oscilloscope acquisition: one millivolt sample per timer tick, a full
//! buffer is handed to the foreground through a [`LatestSlot`].

use core::cell::RefCell;

use critical_section::Mutex;

use crate::analog::AnalogChannel;
use crate::error::{Error, Peripheral, Result};
use crate::hw::{AdcLine, AlarmTimer, TickSource};
use crate::slot::LatestSlot;
use crate::SAMPLE_NUM;

/// Counters of an acquisition channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionStats {
    pub published: u32,
    /// Buffers overwritten before the foreground took them
    pub dropped: u32,
    pub read_failures: u32,
}

/// Start/stop seam used by the bench to silence the scope while generating.
pub trait CaptureControl {
    fn start(&self);
    fn stop(&self);
    fn is_running(&self) -> bool;
}

struct Capture<const N: usize> {
    buffer: [u16; N],
    cursor: usize,
    read_failures: u32,
}

impl<const N: usize> Capture<N> {
    /// Stores one conversion, returns true once the buffer is full.
    fn record(&mut self, reading: Option<u16>) -> bool {
        let sample = match reading {
            Some(mv) => mv,
            None => {
                self.read_failures = self.read_failures.wrapping_add(1);
                // Hold the previous sample of this buffer
                if self.cursor == 0 {
                    0
                } else {
                    self.buffer[self.cursor - 1]
                }
            }
        };
        self.buffer[self.cursor] = sample;
        self.cursor += 1;
        if self.cursor >= N {
            self.cursor = 0;
            return true;
        }
        false
    }
}

pub struct Acquisition<IN, TIM, const N: usize = SAMPLE_NUM> {
    channel: Mutex<RefCell<AnalogChannel<IN>>>,
    capture: Mutex<RefCell<Capture<N>>>,
    timer: Mutex<RefCell<TickSource<TIM>>>,
    slot: LatestSlot<N>,
}

impl<IN, TIM, const N: usize> Acquisition<IN, TIM, N>
where
    IN: AdcLine,
    TIM: AlarmTimer,
{
    pub fn create(channel: AnalogChannel<IN>, timer: TIM) -> Result<Self> {
        if timer.period_us() == 0 {
            error!("acquisition timer has no period");
            return Err(Error::PeripheralInit(Peripheral::Timer));
        }
        info!(
            "acquisition ready, {=usize} samples every {=u32} us",
            N,
            timer.period_us()
        );
        Ok(Acquisition {
            channel: Mutex::new(RefCell::new(channel)),
            capture: Mutex::new(RefCell::new(Capture {
                buffer: [0; N],
                cursor: 0,
                read_failures: 0,
            })),
            timer: Mutex::new(RefCell::new(TickSource::new(timer))),
            slot: LatestSlot::new(),
        })
    }

    pub fn start(&self) {
        critical_section::with(|cs| self.timer.borrow(cs).borrow_mut().start());
    }

    /// A tick already dispatched may still complete after this returns.
    pub fn stop(&self) {
        critical_section::with(|cs| self.timer.borrow(cs).borrow_mut().stop());
    }

    pub fn is_running(&self) -> bool {
        critical_section::with(|cs| self.timer.borrow(cs).borrow().is_running())
    }

    /// Waits for the next buffer published since the last take. Blocks
    /// forever on a stopped channel.
    pub fn take_latest_buffer(&self, out: &mut [u16; N]) {
        self.slot.take(out);
    }

    pub fn try_take_latest_buffer(&self, out: &mut [u16; N]) -> bool {
        self.slot.try_take(out)
    }

    pub fn stats(&self) -> AcquisitionStats {
        let slot = self.slot.stats();
        let read_failures =
            critical_section::with(|cs| self.capture.borrow(cs).borrow().read_failures);
        AcquisitionStats {
            published: slot.published,
            dropped: slot.dropped,
            read_failures,
        }
    }

    /// Timer interrupt handler.
    ///
    /// The conversion and the buffer update are separate critical sections,
    /// the capture state is free while the ADC converts.
    pub fn on_tick(&self) {
        let reading = critical_section::with(|cs| {
            self.timer.borrow(cs).borrow_mut().unpend();
            self.channel.borrow(cs).borrow_mut().read_millivolts().ok()
        });

        critical_section::with(|cs| {
            let mut capture = self.capture.borrow(cs).borrow_mut();
            if capture.record(reading) && self.slot.publish(&capture.buffer) {
                trace!("acquisition buffer overwritten");
            }
        });
    }
}

impl<IN, TIM, const N: usize> CaptureControl for Acquisition<IN, TIM, N>
where
    IN: AdcLine,
    TIM: AlarmTimer,
{
    fn start(&self) {
        Acquisition::start(self)
    }

    fn stop(&self) {
        Acquisition::stop(self)
    }

    fn is_running(&self) -> bool {
        Acquisition::is_running(self)
    }
}
