//! Generator output wired back into the scope inputs.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use lib::acquisition::Acquisition;
use lib::analog::AnalogChannel;
use lib::config::{SignalConfig, SignalKind};
use lib::control::{Bench, Command, Mode, Panel};
use lib::generator::SignalGenerator;
use lib::hw::{AdcLine, AlarmTimer, DacLine};
use lib::input::{InputEvent, JoystickPosition};
use lib::{SAMPLE_NUM, SAMPLE_PERIOD_US, TICK_PERIOD_US};

/// Analog node between DAC and ADC, as a 12-bit code.
#[derive(Clone, Default)]
struct Wire(Arc<AtomicU16>);

impl DacLine for Wire {
    type Error = Infallible;

    fn enable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn output(&mut self, code: u8) {
        self.0.store((code as u16) << 4 | (code as u16) >> 4, Ordering::SeqCst);
    }
}

impl AdcLine for Wire {
    type Error = Infallible;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

#[derive(Clone)]
struct Timer {
    period_us: u32,
    running: Arc<AtomicBool>,
}

impl Timer {
    fn new(period_us: u32) -> Self {
        Timer {
            period_us,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl AlarmTimer for Timer {
    fn period_us(&self) -> u32 {
        self.period_us
    }

    fn start(&mut self) {
        self.running.store(true, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn unpend(&mut self) {}
}

fn square(frequency_hz: u32) -> SignalConfig {
    SignalConfig {
        kind: SignalKind::Square,
        frequency_hz,
        amplitude_mv: 3300,
        duty_cycle: 50,
    }
}

#[test]
fn scope_sees_generated_square_wave() {
    let wire = Wire::default();
    let generator = SignalGenerator::new(wire.clone(), Timer::new(TICK_PERIOD_US)).unwrap();
    let scope: Acquisition<Wire, Timer> =
        Acquisition::create(AnalogChannel::new(wire), Timer::new(SAMPLE_PERIOD_US)).unwrap();
    generator.set_config(square(3333)).unwrap();

    // One scope sample per generator tick, the period is 10 ticks
    for _ in 0..SAMPLE_NUM {
        generator.on_tick();
        scope.on_tick();
    }

    let mut samples = [0; SAMPLE_NUM];
    assert!(scope.try_take_latest_buffer(&mut samples));
    for (i, &mv) in samples.iter().enumerate() {
        let expected = if i % 10 < 5 { 3300 } else { 0 };
        assert_eq!(mv, expected, "sample {}", i);
    }
}

#[test]
fn take_latest_buffer_waits_for_the_interrupt_side() {
    let wire = Wire::default();
    let generator = SignalGenerator::new(wire.clone(), Timer::new(TICK_PERIOD_US)).unwrap();
    let scope: Acquisition<Wire, Timer> =
        Acquisition::create(AnalogChannel::new(wire), Timer::new(SAMPLE_PERIOD_US)).unwrap();
    generator.set_config(square(3333)).unwrap();

    let mut samples = [0; SAMPLE_NUM];
    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..3 * SAMPLE_NUM {
                generator.on_tick();
                scope.on_tick();
            }
        });
        scope.take_latest_buffer(&mut samples);
    });

    assert!(samples.iter().all(|&mv| mv == 0 || mv == 3300));
    let stats = scope.stats();
    assert_eq!(stats.published, 3);
    assert_eq!(stats.read_failures, 0);
}

#[test]
fn panel_drives_the_bench() {
    let wire = Wire::default();
    let generator = SignalGenerator::new(wire.clone(), Timer::new(TICK_PERIOD_US)).unwrap();
    let a: Acquisition<Wire, Timer> =
        Acquisition::create(AnalogChannel::new(wire.clone()), Timer::new(SAMPLE_PERIOD_US))
            .unwrap();
    let b: Acquisition<Wire, Timer> =
        Acquisition::create(AnalogChannel::new(wire), Timer::new(SAMPLE_PERIOD_US)).unwrap();
    let mut bench = Bench::new(&generator, [&a, &b]);
    let mut panel = Panel::new();

    let mut apply = |event: InputEvent| -> Option<Mode> {
        let command: Command = panel.handle(event, &bench.state())?;
        bench.execute(command).unwrap()
    };

    // Signal -> Square
    assert_eq!(apply(InputEvent::Joystick(JoystickPosition::Up)), None);
    // Frequency 1000 -> 900
    apply(InputEvent::Joystick(JoystickPosition::Right));
    apply(InputEvent::Joystick(JoystickPosition::Down));
    // Output on
    for _ in 0..3 {
        apply(InputEvent::Joystick(JoystickPosition::Right));
    }
    assert_eq!(apply(InputEvent::ButtonPressed), Some(Mode::Generating));

    assert!(generator.is_running());
    assert!(!a.is_running() && !b.is_running());
    let config = generator.config();
    assert_eq!(config.kind, SignalKind::Square);
    assert_eq!(config.frequency_hz, 900);

    assert_eq!(apply(InputEvent::ButtonPressed), Some(Mode::Capturing));
    assert!(a.is_running() && b.is_running());
}
