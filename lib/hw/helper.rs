use cortex_m::peripheral::SYST;
use display_interface_parallel_gpio::PGPIO8BitInterface;
use ili9341::Ili9341;
use stm32g0xx_hal::gpio::gpioa::{PA0, PA1, PA10, PA6, PA7, PA9};
use stm32g0xx_hal::gpio::gpiob::{PB0, PB1, PB2, PB3, PB4, PB5, PB6, PB7, PB8, PB9};
use stm32g0xx_hal::gpio::gpioc::{PC6, PC7};
use stm32g0xx_hal::gpio::{Analog, Output, PushPull};
use stm32g0xx_hal::rcc::{Config, PllConfig, Rcc, RccExt};
use stm32g0xx_hal::stm32::RCC;
use stm32g0xx_hal::timer::delay::Delay;

use crate::acquisition::Acquisition;
use crate::generator::SignalGenerator;
use crate::hw::adc::AdcPin;
use crate::hw::dac::DacOutput;
use crate::hw::lcd::{self, IliError};
use crate::hw::timers::{GeneratorTimer, ScopeTimerA, ScopeTimerB};
use crate::input::Joystick;
use crate::led::StatusLed;

pub fn init_clock(pac_rcc: RCC) -> Rcc {
    // ((16 MHz / 4) * 32) / 2 = 64 MHz
    let pll_config = PllConfig::with_hsi(4, 32, 2);
    pac_rcc.freeze(Config::pll().pll_cfg(pll_config))
}

// LCD 8080 bus: PB0..PB7 data, PB8 data/command, PB9 write strobe
type LcdD0 = PB0<Output<PushPull>>;
type LcdD1 = PB1<Output<PushPull>>;
type LcdD2 = PB2<Output<PushPull>>;
type LcdD3 = PB3<Output<PushPull>>;
type LcdD4 = PB4<Output<PushPull>>;
type LcdD5 = PB5<Output<PushPull>>;
type LcdD6 = PB6<Output<PushPull>>;
type LcdD7 = PB7<Output<PushPull>>;
type LcdDC = PB8<Output<PushPull>>;
type LcdWR = PB9<Output<PushPull>>;

// PA0 - Scope channel 1 input
pub type ScopeInputA = PA0<Analog>;
// PA1 - Scope channel 2 input
pub type ScopeInputB = PA1<Analog>;
// PA4 - DAC_OUT1, generator output (configured by the DAC driver)
// PA6 - Joystick X axis
pub type JoystickX = PA6<Analog>;
// PA7 - Joystick Y axis
pub type JoystickY = PA7<Analog>;
// PC13 - Push button, EXTI line 13

// PA9 - LCD_RST (Reset)
pub type LcdRst = PA9<Output<PushPull>>;
// PA10 - LCD_RD (Read signal)
pub type LcdRD = PA10<Output<PushPull>>;
// PC6 - Red LED, instrument mode
pub type RedLed = PC6<Output<PushPull>>;
// PC7 - Green LED, power
pub type GreenLed = PC7<Output<PushPull>>;

pub type Generator = SignalGenerator<DacOutput, GeneratorTimer>;
pub type ScopeA = Acquisition<AdcPin<'static, ScopeInputA>, ScopeTimerA>;
pub type ScopeB = Acquisition<AdcPin<'static, ScopeInputB>, ScopeTimerB>;
pub type HwJoystick = Joystick<AdcPin<'static, JoystickX>, AdcPin<'static, JoystickY>>;
pub type ModeLed = StatusLed<RedLed>;
pub type PowerLed = StatusLed<GreenLed>;

pub type LcdInterface =
    PGPIO8BitInterface<LcdD0, LcdD1, LcdD2, LcdD3, LcdD4, LcdD5, LcdD6, LcdD7, LcdDC, LcdWR>;
pub type HwLcd = Ili9341<LcdInterface, LcdRst>;

pub fn init_lcd(
    interface: LcdInterface,
    lcd_rst: LcdRst,
    lcd_rd: LcdRD,
    delay: &mut Delay<SYST>,
) -> Result<HwLcd, IliError> {
    lcd::open(interface, lcd_rst, lcd_rd, delay)
}
