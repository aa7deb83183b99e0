use heapless::spsc::{Producer, Queue};

use crate::analog::AnalogChannel;
use crate::error::{Error, Result};
use crate::hw::AdcLine;

const LOW_THRESHOLD: u16 = 400;
const HIGH_THRESHOLD: u16 = 600;

pub const EVENT_QUEUE_LEN: usize = 8;

pub type EventQueue = Queue<InputEvent, EVENT_QUEUE_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoystickPosition {
    Middle,
    Up,
    Down,
    Left,
    Right,
}

impl JoystickPosition {
    /// Decodes axis positions in 0..=1000, the Y axis wins on diagonals.
    pub fn decode(x: u16, y: u16) -> Self {
        if y > HIGH_THRESHOLD {
            JoystickPosition::Down
        } else if y < LOW_THRESHOLD {
            JoystickPosition::Up
        } else if x < LOW_THRESHOLD {
            JoystickPosition::Right
        } else if x > HIGH_THRESHOLD {
            JoystickPosition::Left
        } else {
            JoystickPosition::Middle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    Joystick(JoystickPosition),
    ButtonPressed,
}

pub struct Joystick<X, Y> {
    x: AnalogChannel<X>,
    y: AnalogChannel<Y>,
    last: JoystickPosition,
}

impl<X: AdcLine, Y: AdcLine> Joystick<X, Y> {
    /// Both axes are mounted upside down.
    pub fn new(x: X, y: Y) -> Self {
        Joystick {
            x: AnalogChannel::reversed(x),
            y: AnalogChannel::reversed(y),
            last: JoystickPosition::Middle,
        }
    }

    pub fn position(&mut self) -> JoystickPosition {
        let centre = (LOW_THRESHOLD + HIGH_THRESHOLD) / 2;
        let x = self.x.position().unwrap_or(centre);
        let y = self.y.position().unwrap_or(centre);
        JoystickPosition::decode(x, y)
    }

    /// Reports only a change of position.
    pub fn poll(&mut self) -> Option<InputEvent> {
        let position = self.position();
        if position == self.last {
            return None;
        }
        self.last = position;
        trace!("joystick {}", position);
        Some(InputEvent::Joystick(position))
    }
}

/// Interrupt side of the push button.
pub struct Button<'a> {
    events: Producer<'a, InputEvent, EVENT_QUEUE_LEN>,
}

impl<'a> Button<'a> {
    pub fn new(events: Producer<'a, InputEvent, EVENT_QUEUE_LEN>) -> Self {
        Button { events }
    }

    pub fn pressed(&mut self) -> Result<()> {
        self.events
            .enqueue(InputEvent::ButtonPressed)
            .map_err(|_| Error::Queue)
    }
}
