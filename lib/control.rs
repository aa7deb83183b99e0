//! Front panel navigation and the bench that applies its commands.

use crate::acquisition::CaptureControl;
use crate::chart::ScopeView;
use crate::config::{SignalConfig, SignalKind};
use crate::error::ConfigError;
use crate::generator::SignalGenerator;
use crate::hw::{AlarmTimer, DacLine};
use crate::input::{InputEvent, JoystickPosition};
use crate::presets::PresetBank;
use crate::{CHANNEL_COUNT, PRESET_COUNT, SUPPLY_MV};

const FREQUENCY_STEP_HZ: u32 = 100;
const AMPLITUDE_STEP_MV: u32 = 100;
const DUTY_CYCLE_STEP: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Signal,
    Frequency,
    Amplitude,
    DutyCycle,
    Output,
    Preset,
    SavePreset,
    TimeDiv,
    VoltDiv,
    Channel1,
    Channel2,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Signal,
        Field::Frequency,
        Field::Amplitude,
        Field::DutyCycle,
        Field::Output,
        Field::Preset,
        Field::SavePreset,
        Field::TimeDiv,
        Field::VoltDiv,
        Field::Channel1,
        Field::Channel2,
    ];

    fn index(self) -> usize {
        Field::ALL.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Field::ALL[(self.index() + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    SetSignalKind(SignalKind),
    SetFrequency(u32),
    SetAmplitude(u32),
    SetDutyCycle(u8),
    StartGeneration,
    StopGeneration,
    LoadPreset(usize),
    SavePreset(usize),
    SetView(ScopeView),
    ShowChannel(usize, bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Capturing,
    Generating,
}

/// Snapshot of the instrument the panel edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    pub config: SignalConfig,
    pub mode: Mode,
    pub view: ScopeView,
    pub visible: [bool; CHANNEL_COUNT],
}

pub struct Panel {
    focus: Field,
    preset: usize,
}

impl Panel {
    pub fn new() -> Self {
        Panel {
            focus: Field::Signal,
            preset: 0,
        }
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    /// Preset selected for load and save.
    pub fn preset(&self) -> usize {
        self.preset
    }

    pub fn handle(&mut self, event: InputEvent, state: &PanelState) -> Option<Command> {
        match event {
            InputEvent::Joystick(JoystickPosition::Left) => {
                self.focus = self.focus.prev();
                None
            }
            InputEvent::Joystick(JoystickPosition::Right) => {
                self.focus = self.focus.next();
                None
            }
            InputEvent::Joystick(JoystickPosition::Up) => self.adjust(true, state),
            InputEvent::Joystick(JoystickPosition::Down) => self.adjust(false, state),
            InputEvent::Joystick(JoystickPosition::Middle) => None,
            InputEvent::ButtonPressed => self.activate(state),
        }
    }

    fn adjust(&mut self, up: bool, state: &PanelState) -> Option<Command> {
        let config = &state.config;
        match self.focus {
            Field::Signal => {
                let kind = if up {
                    config.kind.next()
                } else {
                    config.kind.prev()
                };
                Some(Command::SetSignalKind(kind))
            }
            Field::Frequency => {
                let frequency = if up {
                    config.frequency_hz.saturating_add(FREQUENCY_STEP_HZ)
                } else {
                    config.frequency_hz.saturating_sub(FREQUENCY_STEP_HZ)
                };
                Some(Command::SetFrequency(frequency))
            }
            Field::Amplitude => {
                let amplitude = if up {
                    config.amplitude_mv.saturating_add(AMPLITUDE_STEP_MV).min(SUPPLY_MV)
                } else {
                    config.amplitude_mv.saturating_sub(AMPLITUDE_STEP_MV)
                };
                Some(Command::SetAmplitude(amplitude))
            }
            Field::DutyCycle => {
                let duty = if up {
                    config.duty_cycle.saturating_add(DUTY_CYCLE_STEP).min(100)
                } else {
                    config.duty_cycle.saturating_sub(DUTY_CYCLE_STEP)
                };
                Some(Command::SetDutyCycle(duty))
            }
            Field::Preset => {
                self.preset = if up {
                    (self.preset + 1) % PRESET_COUNT
                } else {
                    (self.preset + PRESET_COUNT - 1) % PRESET_COUNT
                };
                None
            }
            Field::TimeDiv => Some(Command::SetView(ScopeView {
                time_div: state.view.time_div.toggle(),
                ..state.view
            })),
            Field::VoltDiv => Some(Command::SetView(ScopeView {
                volt_div: state.view.volt_div.toggle(),
                ..state.view
            })),
            Field::Output | Field::SavePreset | Field::Channel1 | Field::Channel2 => None,
        }
    }

    fn activate(&mut self, state: &PanelState) -> Option<Command> {
        match self.focus {
            Field::Output => match state.mode {
                Mode::Capturing => Some(Command::StartGeneration),
                Mode::Generating => Some(Command::StopGeneration),
            },
            Field::Preset => Some(Command::LoadPreset(self.preset)),
            Field::SavePreset => Some(Command::SavePreset(self.preset)),
            Field::Channel1 => Some(Command::ShowChannel(0, !state.visible[0])),
            Field::Channel2 => Some(Command::ShowChannel(1, !state.visible[1])),
            _ => None,
        }
    }
}

impl Default for Panel {
    fn default() -> Self {
        Panel::new()
    }
}

/// Generator, presets and scope channels of the instrument.
pub struct Bench<'a, OUT, TIM> {
    generator: &'a SignalGenerator<OUT, TIM>,
    channels: [&'a dyn CaptureControl; CHANNEL_COUNT],
    presets: PresetBank,
    mode: Mode,
    view: ScopeView,
    visible: [bool; CHANNEL_COUNT],
}

impl<'a, OUT, TIM> Bench<'a, OUT, TIM>
where
    OUT: DacLine,
    TIM: AlarmTimer,
{
    /// Starts in capture mode with both channels running.
    pub fn new(
        generator: &'a SignalGenerator<OUT, TIM>,
        channels: [&'a dyn CaptureControl; CHANNEL_COUNT],
    ) -> Self {
        generator.stop();
        for channel in channels.iter() {
            channel.start();
        }
        Bench {
            generator,
            channels,
            presets: PresetBank::new(),
            mode: Mode::Capturing,
            view: ScopeView::DEFAULT,
            visible: [true; CHANNEL_COUNT],
        }
    }

    pub fn state(&self) -> PanelState {
        PanelState {
            config: self.generator.config(),
            mode: self.mode,
            view: self.view,
            visible: self.visible,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn view(&self) -> ScopeView {
        self.view
    }

    pub fn is_visible(&self, channel: usize) -> bool {
        self.visible.get(channel).copied().unwrap_or(false)
    }

    pub fn presets(&self) -> &PresetBank {
        &self.presets
    }

    /// Applies `command`, returning the new mode when it changed.
    pub fn execute(&mut self, command: Command) -> Result<Option<Mode>, ConfigError> {
        debug!("bench command {}", command);
        match command {
            Command::SetSignalKind(kind) => self.generator.set_signal_kind(kind)?,
            Command::SetFrequency(frequency) => self.generator.set_frequency(frequency)?,
            Command::SetAmplitude(amplitude) => self.generator.set_amplitude(amplitude)?,
            Command::SetDutyCycle(duty) => self.generator.set_duty_cycle(duty)?,
            Command::LoadPreset(index) => {
                let config = self.presets.load(index, self.generator)?;
                info!("preset {=usize}: {=u32} Hz", index, config.frequency_hz);
            }
            Command::SavePreset(index) => self.presets.save(self.generator.config(), index)?,
            Command::SetView(view) => self.view = view,
            Command::ShowChannel(index, show) => self.show_channel(index, show),
            Command::StartGeneration => return Ok(self.start_generation()),
            Command::StopGeneration => return Ok(self.stop_generation()),
        }
        Ok(None)
    }

    fn start_generation(&mut self) -> Option<Mode> {
        if self.mode == Mode::Generating {
            return None;
        }
        for channel in self.channels.iter() {
            channel.stop();
        }
        self.generator.start();
        self.mode = Mode::Generating;
        info!("generating");
        Some(self.mode)
    }

    fn stop_generation(&mut self) -> Option<Mode> {
        if self.mode == Mode::Capturing {
            return None;
        }
        self.generator.stop();
        for (channel, visible) in self.channels.iter().zip(self.visible.iter()) {
            if *visible {
                channel.start();
            }
        }
        self.mode = Mode::Capturing;
        info!("capturing");
        Some(self.mode)
    }

    fn show_channel(&mut self, index: usize, show: bool) {
        let channel = match self.channels.get(index) {
            Some(channel) => *channel,
            None => {
                warn!("no scope channel {=usize}", index);
                return;
            }
        };
        self.visible[index] = show;
        if self.mode == Mode::Capturing {
            if show {
                channel.start();
            } else {
                channel.stop();
            }
        }
    }
}
