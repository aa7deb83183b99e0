#![no_main]
#![no_std]

use lib as _;

use cortex_m::singleton;
use heapless::spsc::Consumer;
use lib::acquisition::Acquisition;
use lib::analog::AnalogChannel;
use lib::control::{Bench, Mode, Panel};
use lib::display::{Display, Status};
use lib::generator::SignalGenerator;
use lib::hw::{
    init_clock, init_lcd, AlarmTimer, DacOutput, Generator, GeneratorTimer, GreenLed, HwJoystick,
    HwLcd, IliError, LcdInterface, MillisTimer, ModeLed, PowerLed, RedLed, ScopeA, ScopeB,
    ScopeTimerA, ScopeTimerB, SharedAdc,
};
use lib::input::{Button, EventQueue, InputEvent, Joystick, EVENT_QUEUE_LEN};
use lib::led::{LedPattern, StatusLed};
use lib::{CHANNEL_COUNT, SAMPLE_NUM, SAMPLE_PERIOD_US, TICK_PERIOD_US};
use rtic::app;
use stm32g0xx_hal::analog::dac::DacExt;
use stm32g0xx_hal::delay::DelayExt;
use stm32g0xx_hal::exti::{Event, ExtiExt};
use stm32g0xx_hal::gpio::{GpioExt, SignalEdge, Speed};
use stm32g0xx_hal::stm32::EXTI;

const MILLIS_PERIOD_US: u32 = 1_000;
const JOYSTICK_PERIOD_MS: u32 = 250;
const FRAME_PERIOD_MS: u32 = 250;

#[app(device = stm32g0xx_hal::stm32, peripherals = true)]
const APP: () = {
    struct Resources {
        generator: Generator,
        scope_a: ScopeA,
        scope_b: ScopeB,
        millis: u32,
        millis_timer: MillisTimer,
        button: Button<'static>,
        events: Consumer<'static, InputEvent, EVENT_QUEUE_LEN>,
        exti: EXTI,
        joystick: HwJoystick,
        display: Display<HwLcd, IliError>,
        mode_led: ModeLed,
        power_led: PowerLed,
    }

    #[init]
    fn init(cx: init::Context) -> init::LateResources {
        let core: rtic::export::Peripherals = cx.core;
        let device: stm32g0xx_hal::stm32::Peripherals = cx.device;

        // Clock
        let mut rcc = init_clock(device.RCC);
        let mut delay = core.SYST.delay(&mut rcc);

        // GPIO
        let gpioa = device.GPIOA.split(&mut rcc);
        let gpiob = device.GPIOB.split(&mut rcc);
        let gpioc = device.GPIOC.split(&mut rcc);

        // Input events
        let queue: &'static mut EventQueue = singleton!(: EventQueue = EventQueue::new()).unwrap();
        let (producer, events) = queue.split();
        let mut exti = device.EXTI;
        gpioc
            .pc13
            .into_pull_up_input()
            .listen(SignalEdge::Falling, &mut exti);

        // LCD
        let interface = LcdInterface::new(
            gpiob.pb0.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb1.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb2.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb3.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb4.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb5.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb6.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb7.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb8.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb9.into_push_pull_output().set_speed(Speed::VeryHigh),
        );
        let lcd = init_lcd(
            interface,
            gpioa.pa9.into_push_pull_output(),
            gpioa.pa10.into_push_pull_output(),
            &mut delay,
        )
        .unwrap();
        let display = Display::new(lcd).unwrap();

        // Function generator
        let dac = device.DAC.constrain(gpioa.pa4, &mut rcc);
        let generator = SignalGenerator::new(
            DacOutput::new(dac),
            GeneratorTimer::new(device.TIM6, TICK_PERIOD_US, &mut rcc),
        )
        .unwrap();

        // Analog inputs
        let adc: &'static SharedAdc =
            singleton!(: SharedAdc = SharedAdc::new(device.ADC, &mut rcc)).unwrap();
        let scope_a = Acquisition::create(
            AnalogChannel::new(adc.pin(gpioa.pa0.into_analog())),
            ScopeTimerA::new(device.TIM7, SAMPLE_PERIOD_US, &mut rcc),
        )
        .unwrap();
        let scope_b = Acquisition::create(
            AnalogChannel::new(adc.pin(gpioa.pa1.into_analog())),
            ScopeTimerB::new(device.TIM14, SAMPLE_PERIOD_US, &mut rcc),
        )
        .unwrap();
        let joystick = Joystick::new(
            adc.pin(gpioa.pa6.into_analog()),
            adc.pin(gpioa.pa7.into_analog()),
        );

        // LEDs
        let mode_led: StatusLed<RedLed> = StatusLed::new(gpioc.pc6.into_push_pull_output());
        let power_led: StatusLed<GreenLed> = StatusLed::new(gpioc.pc7.into_push_pull_output());

        let millis_timer = MillisTimer::new(device.TIM15, MILLIS_PERIOD_US, &mut rcc);

        defmt::info!("init done");
        init::LateResources {
            generator,
            scope_a,
            scope_b,
            millis: 0,
            millis_timer,
            button: Button::new(producer),
            events,
            exti,
            joystick,
            display,
            mode_led,
            power_led,
        }
    }

    #[idle(resources = [&generator, &scope_a, &scope_b, millis, millis_timer, events, joystick, display, mode_led, power_led])]
    fn idle(mut cx: idle::Context) -> ! {
        cx.resources
            .millis_timer
            .lock(|timer: &mut MillisTimer| timer.start());

        let generator: &Generator = cx.resources.generator;
        let scope_a: &ScopeA = cx.resources.scope_a;
        let scope_b: &ScopeB = cx.resources.scope_b;
        let events = cx.resources.events;
        let joystick = cx.resources.joystick;
        let display = cx.resources.display;
        let mode_led = cx.resources.mode_led;
        let power_led = cx.resources.power_led;

        let mut bench = Bench::new(generator, [scope_a, scope_b]);
        let mut panel = Panel::new();
        power_led.run(LedPattern::KeepOn, None, 0);
        mode_led.run(LedPattern::KeepOn, None, 0);

        let mut samples = [0u16; SAMPLE_NUM];
        let mut shown = [false; CHANNEL_COUNT];
        let mut last_poll = 0;
        let mut last_frame = 0;
        loop {
            let now = cx.resources.millis.lock(|millis: &mut u32| *millis);

            if now.wrapping_sub(last_poll) >= JOYSTICK_PERIOD_MS {
                last_poll = now;
                if let Some(event) = joystick.poll() {
                    dispatch(event, &mut panel, &mut bench, mode_led, now);
                }
            }
            while let Some(event) = events.dequeue() {
                dispatch(event, &mut panel, &mut bench, mode_led, now);
            }

            power_led.update(now);
            mode_led.update(now);

            if now.wrapping_sub(last_frame) < FRAME_PERIOD_MS {
                continue;
            }
            last_frame = now;

            let view = bench.view();
            for channel in 0..CHANNEL_COUNT {
                let result = if !bench.is_visible(channel) {
                    if !shown[channel] {
                        continue;
                    }
                    shown[channel] = false;
                    display.hide_trace(channel)
                } else {
                    let taken = match channel {
                        0 => scope_a.try_take_latest_buffer(&mut samples),
                        _ => scope_b.try_take_latest_buffer(&mut samples),
                    };
                    if !taken {
                        continue;
                    }
                    shown[channel] = true;
                    display.draw_trace(channel, &samples, &view)
                };
                if result.is_err() {
                    defmt::error!("trace {=usize} not drawn", channel);
                }
            }

            let status = Status {
                state: bench.state(),
                focus: panel.focus(),
                preset: panel.preset(),
            };
            if display.update_status(&status).is_err() {
                defmt::error!("status not drawn");
            }
        }
    }

    #[task(binds = TIM6_DAC_LPTIM1, priority = 3, resources = [&generator])]
    fn tim6(cx: tim6::Context) {
        let generator: &Generator = cx.resources.generator;
        generator.on_tick();
    }

    #[task(binds = TIM7_LPTIM2, priority = 2, resources = [&scope_a])]
    fn tim7(cx: tim7::Context) {
        let scope: &ScopeA = cx.resources.scope_a;
        scope.on_tick();
    }

    #[task(binds = TIM14, priority = 2, resources = [&scope_b])]
    fn tim14(cx: tim14::Context) {
        let scope: &ScopeB = cx.resources.scope_b;
        scope.on_tick();
    }

    #[task(binds = EXTI4_15, priority = 1, resources = [button, exti])]
    fn exti4_15(cx: exti4_15::Context) {
        let exti: &mut EXTI = cx.resources.exti;
        let button: &mut Button<'static> = cx.resources.button;

        exti.unpend(Event::GPIO13);
        if button.pressed().is_err() {
            defmt::warn!("input queue full, button press dropped");
        }
    }

    #[task(binds = TIM15, priority = 1, resources = [millis, millis_timer])]
    fn tim15(cx: tim15::Context) {
        let timer: &mut MillisTimer = cx.resources.millis_timer;
        let millis: &mut u32 = cx.resources.millis;

        timer.unpend();
        *millis = millis.wrapping_add(1);
    }
};

fn dispatch(
    event: InputEvent,
    panel: &mut Panel,
    bench: &mut Bench<'_, DacOutput, GeneratorTimer>,
    mode_led: &mut ModeLed,
    now: u32,
) {
    let command = match panel.handle(event, &bench.state()) {
        Some(command) => command,
        None => return,
    };
    match bench.execute(command) {
        Ok(Some(Mode::Generating)) => mode_led.run(LedPattern::FastBlink, None, now),
        Ok(Some(Mode::Capturing)) => mode_led.run(LedPattern::KeepOn, None, now),
        Ok(None) => {}
        Err(err) => defmt::warn!("command rejected: {}", err),
    }
}
