//! Function generator: one table sample per timer tick to the DAC.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::{check_amplitude, check_duty_cycle, check_frequency, SignalConfig, SignalKind};
use crate::error::{ConfigError, Error, Peripheral, Result};
use crate::hw::{AlarmTimer, DacLine, TickSource};
use crate::synth::{self, SampleTable};
use crate::TABLE_LEN;

struct Emitter<OUT> {
    config: SignalConfig,
    table: SampleTable,
    points: usize,
    cursor: usize,
    output: OUT,
}

impl<OUT: DacLine> Emitter<OUT> {
    fn emit(&mut self) {
        if self.cursor >= self.points {
            self.cursor = 0;
        }
        self.output.output(self.table[self.cursor]);
        self.cursor += 1;
    }

    fn store(&mut self, config: SignalConfig, points: usize, table: &SampleTable) {
        self.config = config;
        self.points = points;
        self.cursor = 0;
        self.table = *table;
    }
}

/// Signal generation engine.
///
/// Config, table, cursor and output are one unit behind the lock, the tick
/// handler never sees a table that does not match the config.
pub struct SignalGenerator<OUT, TIM> {
    state: Mutex<RefCell<Emitter<OUT>>>,
    timer: Mutex<RefCell<TickSource<TIM>>>,
    tick_period_us: u32,
}

impl<OUT, TIM> SignalGenerator<OUT, TIM>
where
    OUT: DacLine,
    TIM: AlarmTimer,
{
    pub fn new(mut output: OUT, timer: TIM) -> Result<Self> {
        output
            .enable()
            .map_err(|_| Error::PeripheralInit(Peripheral::Dac))?;

        let tick_period_us = timer.period_us();
        if tick_period_us == 0 {
            error!("generator timer has no period");
            return Err(Error::PeripheralInit(Peripheral::Timer));
        }

        let config = SignalConfig::DEFAULT;
        let points = config.validate(tick_period_us)?;
        let table = build_table(&config, points);

        info!("generator ready, tick {=u32} us", tick_period_us);
        Ok(SignalGenerator {
            state: Mutex::new(RefCell::new(Emitter {
                config,
                table,
                points,
                cursor: 0,
                output,
            })),
            timer: Mutex::new(RefCell::new(TickSource::new(timer))),
            tick_period_us,
        })
    }

    pub fn set_config(&self, config: SignalConfig) -> core::result::Result<(), ConfigError> {
        let points = config.validate(self.tick_period_us)?;
        self.commit(config, points);
        Ok(())
    }

    pub fn set_frequency(&self, frequency_hz: u32) -> core::result::Result<(), ConfigError> {
        let points = check_frequency(frequency_hz, self.tick_period_us)?;
        self.update(Some(points), |config| config.frequency_hz = frequency_hz);
        Ok(())
    }

    pub fn set_amplitude(&self, amplitude_mv: u32) -> core::result::Result<(), ConfigError> {
        check_amplitude(amplitude_mv)?;
        self.update(None, |config| config.amplitude_mv = amplitude_mv);
        Ok(())
    }

    pub fn set_signal_kind(&self, kind: SignalKind) -> core::result::Result<(), ConfigError> {
        self.update(None, |config| config.kind = kind);
        Ok(())
    }

    pub fn set_duty_cycle(&self, duty_cycle: u8) -> core::result::Result<(), ConfigError> {
        check_duty_cycle(duty_cycle)?;
        self.update(None, |config| config.duty_cycle = duty_cycle);
        Ok(())
    }

    pub fn config(&self) -> SignalConfig {
        self.snapshot().0
    }

    /// Points of the table emitted per period.
    pub fn points(&self) -> usize {
        self.snapshot().1
    }

    pub fn table(&self) -> SampleTable {
        critical_section::with(|cs| self.state.borrow(cs).borrow().table)
    }

    pub fn start(&self) {
        critical_section::with(|cs| self.timer.borrow(cs).borrow_mut().start());
        debug!("generator started");
    }

    pub fn stop(&self) {
        critical_section::with(|cs| self.timer.borrow(cs).borrow_mut().stop());
        debug!("generator stopped");
    }

    pub fn is_running(&self) -> bool {
        critical_section::with(|cs| self.timer.borrow(cs).borrow().is_running())
    }

    /// Timer interrupt handler.
    pub fn on_tick(&self) {
        critical_section::with(|cs| {
            self.timer.borrow(cs).borrow_mut().unpend();
            self.state.borrow(cs).borrow_mut().emit();
        });
    }

    fn snapshot(&self) -> (SignalConfig, usize) {
        critical_section::with(|cs| {
            let state = self.state.borrow(cs).borrow();
            (state.config, state.points)
        })
    }

    fn commit(&self, config: SignalConfig, points: usize) {
        // Synthesis runs outside of the lock, only the copy is guarded
        let table = build_table(&config, points);
        critical_section::with(|cs| {
            self.state.borrow(cs).borrow_mut().store(config, points, &table);
        });
        log_config(&config);
    }

    /// Changes one field on top of the current config.
    ///
    /// The table is built from a snapshot and only stored if nobody changed
    /// the config meanwhile, otherwise the change is replayed on the newer one.
    fn update<F>(&self, points: Option<usize>, apply: F)
    where
        F: Fn(&mut SignalConfig),
    {
        loop {
            let (seen, current_points) = self.snapshot();
            let mut config = seen;
            apply(&mut config);
            let points = points.unwrap_or(current_points);
            let table = build_table(&config, points);

            let stored = critical_section::with(|cs| {
                let mut state = self.state.borrow(cs).borrow_mut();
                if state.config != seen {
                    return false;
                }
                state.store(config, points, &table);
                true
            });
            if stored {
                log_config(&config);
                return;
            }
            trace!("generator config changed concurrently, retrying");
        }
    }
}

fn log_config(config: &SignalConfig) {
    debug!(
        "generator config {}, {=u32} Hz, {=u32} mV, {=u8} %",
        config.kind,
        config.frequency_hz,
        config.amplitude_mv,
        config.duty_cycle
    );
}

fn build_table(config: &SignalConfig, points: usize) -> SampleTable {
    let mut table = [0; TABLE_LEN];
    synth::fill(
        &mut table,
        points,
        config.kind,
        config.amplitude_code(),
        config.duty_cycle,
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDac, FakeTimer};
    use crate::TICK_PERIOD_US;

    fn generator() -> (SignalGenerator<FakeDac, FakeTimer>, FakeDac, FakeTimer) {
        let dac = FakeDac::default();
        let timer = FakeTimer::new(TICK_PERIOD_US);
        let generator = SignalGenerator::new(dac.clone(), timer.clone()).unwrap();
        (generator, dac, timer)
    }

    fn config(kind: SignalKind, frequency_hz: u32, amplitude_mv: u32, duty: u8) -> SignalConfig {
        SignalConfig {
            kind,
            frequency_hz,
            amplitude_mv,
            duty_cycle: duty,
        }
    }

    #[test]
    fn starts_with_default_config() {
        let (generator, dac, timer) = generator();
        assert_eq!(generator.config(), SignalConfig::DEFAULT);
        assert_eq!(generator.points(), 33);
        assert!(dac.enabled.load(std::sync::atomic::Ordering::SeqCst));
        assert!(!generator.is_running());
        assert!(!timer.running());
    }

    #[test]
    fn dac_enable_failure_aborts_creation() {
        let result = SignalGenerator::new(FakeDac::broken(), FakeTimer::new(TICK_PERIOD_US));
        assert!(matches!(
            result,
            Err(Error::PeripheralInit(Peripheral::Dac))
        ));
    }

    #[test]
    fn timer_without_period_aborts_creation() {
        let result = SignalGenerator::new(FakeDac::default(), FakeTimer::new(0));
        assert!(matches!(
            result,
            Err(Error::PeripheralInit(Peripheral::Timer))
        ));
    }

    #[test]
    fn square_wave_output_sequence() {
        let (generator, dac, _) = generator();
        generator
            .set_config(config(SignalKind::Square, 3333, 3300, 50))
            .unwrap();
        assert_eq!(generator.points(), 10);

        for _ in 0..20 {
            generator.on_tick();
        }
        let expected = [255, 255, 255, 255, 255, 0, 0, 0, 0, 0];
        let outputs = dac.take_outputs();
        assert_eq!(&outputs[..10], &expected);
        assert_eq!(&outputs[10..], &expected);
    }

    #[test]
    fn tick_acknowledges_timer() {
        let (generator, _, timer) = generator();
        generator.on_tick();
        generator.on_tick();
        assert_eq!(timer.unpends(), 2);
    }

    #[test]
    fn commit_resets_cursor() {
        let (generator, dac, _) = generator();
        generator
            .set_config(config(SignalKind::Sawtooth, 3333, 3300, 0))
            .unwrap();
        for _ in 0..4 {
            generator.on_tick();
        }
        generator.set_amplitude(3300).unwrap();
        generator.on_tick();
        let outputs = dac.take_outputs();
        assert_eq!(outputs[4], 0);
    }

    #[test]
    fn rejected_config_keeps_previous_state() {
        let (generator, _, _) = generator();
        let before = generator.table();

        assert_eq!(
            generator.set_config(config(SignalKind::Sine, 100, 1000, 30)),
            Err(ConfigError::TableOverflow)
        );
        assert_eq!(
            generator.set_config(config(SignalKind::Sine, 100_000, 1000, 30)),
            Err(ConfigError::FrequencyTooHigh)
        );
        assert_eq!(
            generator.set_config(config(SignalKind::Sine, 1000, 5000, 30)),
            Err(ConfigError::AmplitudeOutOfRange)
        );
        assert_eq!(
            generator.set_config(config(SignalKind::Sine, 1000, 1000, 101)),
            Err(ConfigError::DutyCycleOutOfRange)
        );
        assert_eq!(generator.config(), SignalConfig::DEFAULT);
        assert_eq!(generator.table(), before);
    }

    #[test]
    fn partial_setters_touch_their_field_only() {
        let (generator, _, _) = generator();
        generator.set_frequency(2000).unwrap();
        generator.set_signal_kind(SignalKind::Triangle).unwrap();
        generator.set_duty_cycle(80).unwrap();
        generator.set_amplitude(3300).unwrap();

        let config = generator.config();
        assert_eq!(config.frequency_hz, 2000);
        assert_eq!(config.kind, SignalKind::Triangle);
        assert_eq!(config.duty_cycle, 80);
        assert_eq!(config.amplitude_mv, 3300);
        assert_eq!(generator.points(), 17);

        assert_eq!(generator.set_frequency(10), Err(ConfigError::TableOverflow));
        assert_eq!(
            generator.set_amplitude(3301),
            Err(ConfigError::AmplitudeOutOfRange)
        );
        assert_eq!(
            generator.set_duty_cycle(200),
            Err(ConfigError::DutyCycleOutOfRange)
        );
        assert_eq!(generator.config(), config);
    }

    #[test]
    fn table_matches_synthesizer() {
        let (generator, _, _) = generator();
        let cfg = config(SignalKind::Triangle, 500, 2000, 0);
        generator.set_config(cfg).unwrap();

        let mut expected = [0; TABLE_LEN];
        synth::fill(&mut expected, 67, SignalKind::Triangle, cfg.amplitude_code(), 0);
        assert_eq!(generator.points(), 67);
        assert_eq!(generator.table(), expected);
    }

    #[test]
    fn start_and_stop_drive_the_timer() {
        let (generator, _, timer) = generator();
        generator.start();
        generator.start();
        assert!(generator.is_running());
        assert_eq!(timer.starts(), 1);

        generator.stop();
        assert!(!generator.is_running());
        assert!(!timer.running());
    }

    #[test]
    fn setters_allowed_while_running() {
        let (generator, dac, _) = generator();
        generator.start();
        generator.on_tick();
        generator
            .set_config(config(SignalKind::Square, 3333, 3300, 100))
            .unwrap();
        generator.on_tick();
        assert_eq!(dac.take_outputs().last(), Some(&255));
    }

    #[test]
    fn concurrent_setters_keep_both_changes() {
        for round in 0..200u32 {
            let (generator, _, _) = generator();
            std::thread::scope(|s| {
                s.spawn(|| {
                    for i in 0..50u32 {
                        let frequency = if i % 2 == 0 { 2000 } else { 1000 };
                        generator.set_frequency(frequency).unwrap();
                    }
                });
                s.spawn(|| {
                    for amplitude in 0..=200 {
                        generator.set_amplitude(amplitude).unwrap();
                    }
                });
            });

            let config = generator.config();
            assert_eq!(config.amplitude_mv, 200, "round {}", round);
            assert_eq!(config.frequency_hz, 1000, "round {}", round);
            assert_eq!(generator.points(), 33, "round {}", round);
        }
    }

    fn any_config() -> impl proptest::strategy::Strategy<Value = SignalConfig> {
        use proptest::prelude::*;
        (
            proptest::sample::select(SignalKind::ALL.to_vec()),
            168u32..=66_666,
            0u32..=3300,
            0u8..=100,
        )
            .prop_map(|(kind, frequency_hz, amplitude_mv, duty_cycle)| SignalConfig {
                kind,
                frequency_hz,
                amplitude_mv,
                duty_cycle,
            })
    }

    proptest::proptest! {
        #[test]
        fn same_config_twice_gives_same_table(config in any_config()) {
            let (generator, _, _) = generator();
            generator.set_config(config).unwrap();
            let first = generator.table();
            let points = generator.points();

            generator.set_config(config).unwrap();
            assert_eq!(generator.table(), first);
            assert_eq!(generator.points(), points);
            assert_eq!(generator.config(), config);
        }
    }
}
