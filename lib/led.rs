use embedded_hal::digital::v2::OutputPin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedPattern {
    None,
    KeepOn,
    SlowBlink,
    FastBlink,
}

impl LedPattern {
    /// Half period of a blinking pattern in milliseconds.
    pub fn half_period_ms(self) -> Option<u32> {
        match self {
            LedPattern::SlowBlink => Some(1000),
            LedPattern::FastBlink => Some(100),
            LedPattern::None | LedPattern::KeepOn => None,
        }
    }
}

pub struct StatusLed<P> {
    pin: P,
    pattern: LedPattern,
    started_ms: u32,
    timeout_ms: Option<u32>,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        let mut led = StatusLed {
            pin,
            pattern: LedPattern::None,
            started_ms: 0,
            timeout_ms: None,
            lit: true,
        };
        led.drive(false);
        led
    }

    /// Runs `pattern`, falling back to `None` after `timeout_ms` if given.
    pub fn run(&mut self, pattern: LedPattern, timeout_ms: Option<u32>, now_ms: u32) {
        if self.pattern == pattern && self.timeout_ms.is_none() && timeout_ms.is_none() {
            return;
        }
        self.pattern = pattern;
        self.timeout_ms = timeout_ms;
        self.started_ms = now_ms;
        self.update(now_ms);
    }

    pub fn reset(&mut self, now_ms: u32) {
        self.run(LedPattern::None, None, now_ms);
    }

    pub fn pattern(&self) -> LedPattern {
        self.pattern
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn update(&mut self, now_ms: u32) {
        let elapsed = now_ms.wrapping_sub(self.started_ms);
        if let Some(timeout) = self.timeout_ms {
            if elapsed >= timeout {
                self.pattern = LedPattern::None;
                self.timeout_ms = None;
            }
        }

        let on = match self.pattern {
            LedPattern::None => false,
            LedPattern::KeepOn => true,
            LedPattern::SlowBlink | LedPattern::FastBlink => {
                let half = self.pattern.half_period_ms().unwrap_or(1);
                (elapsed / half) % 2 == 0
            }
        };
        self.drive(on);
    }

    fn drive(&mut self, on: bool) {
        if on == self.lit {
            return;
        }
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            warn!("status led pin write failed");
            return;
        }
        self.lit = on;
    }
}
