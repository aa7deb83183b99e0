use stm32g0xx_hal::hal::timer::CountDown;
use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32::{TIM14, TIM15, TIM6, TIM7};
use stm32g0xx_hal::time::U32Ext;
use stm32g0xx_hal::timer::{Timer, TimerExt};

use crate::hw::AlarmTimer;

macro_rules! alarm_timer {
    ($(#[$doc:meta])* $name:ident, $tim:ty) => {
        $(#[$doc])*
        pub struct $name {
            timer: Timer<$tim>,
            period_us: u32,
        }

        impl $name {
            pub fn new(pac_tim: $tim, period_us: u32, rcc: &mut Rcc) -> Self {
                $name {
                    timer: pac_tim.timer(rcc),
                    period_us,
                }
            }
        }

        impl AlarmTimer for $name {
            fn period_us(&self) -> u32 {
                self.period_us
            }

            fn start(&mut self) {
                self.timer.clear_irq();
                self.timer.listen();
                self.timer.start(self.period_us.us());
            }

            fn stop(&mut self) {
                self.timer.unlisten();
                self.timer.pause();
                self.timer.clear_irq();
            }

            fn unpend(&mut self) {
                self.timer.clear_irq();
            }
        }
    };
}

alarm_timer!(
    /// Function generator tick
    GeneratorTimer,
    TIM6
);
alarm_timer!(
    /// First scope channel sample tick
    ScopeTimerA,
    TIM7
);
alarm_timer!(
    /// Second scope channel sample tick
    ScopeTimerB,
    TIM14
);
alarm_timer!(
    /// Millisecond clock for LEDs and input polling
    MillisTimer,
    TIM15
);
