use core::fmt::Write;
use embedded_graphics::fonts::{Font8x16, Text};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::{Point, Primitive};
use embedded_graphics::primitives::{Line, Rectangle};
use embedded_graphics::style::{PrimitiveStyle, PrimitiveStyleBuilder, TextStyle};
use heapless::{String, Vec};

use crate::chart::ScopeView;
use crate::config::SignalConfig;
use crate::control::{Field, Mode, PanelState};
use crate::error::{Error, Result};
use crate::hw::Lcd;
use crate::{CHANNEL_COUNT, SAMPLE_NUM};

type Line16 = String<16>;

/// Everything the status column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub state: PanelState,
    pub focus: Field,
    pub preset: usize,
}

pub struct Display<LCD, LCDER>
where
    LCD: Lcd<Error = LCDER>,
{
    traces: [Vec<Point, SAMPLE_NUM>; CHANNEL_COUNT],
    status: [Line16; Field::ALL.len()],
    focus: Option<Field>,
    lcd: LCD,
}

impl<LCD, LCDER> Display<LCD, LCDER>
where
    LCD: Lcd<Error = LCDER>,
{
    pub fn new(lcd: LCD) -> Result<Self, LCDER> {
        let mut display = Display {
            traces: [Vec::new(), Vec::new()],
            status: Default::default(),
            focus: None,
            lcd,
        };
        display.init()?;
        Ok(display)
    }

    /// Replaces the trace of `channel` with `samples` in millivolts.
    pub fn draw_trace(
        &mut self,
        channel: usize,
        samples: &[u16],
        view: &ScopeView,
    ) -> Result<(), LCDER> {
        self.hide_trace(channel)?;

        let visible = view.visible(samples);
        let last = visible.len().saturating_sub(1).max(1) as i32;
        let mut points: Vec<Point, SAMPLE_NUM> = Vec::new();
        for (i, &mv) in visible.iter().enumerate() {
            let x = Frame::TOP_LEFT.x + i as i32 * (Frame::WIDTH - 1) / last;
            let y = Frame::BOTTOM_RIGHT.y - view.to_screen(mv, Frame::HEIGHT as u16) as i32;
            points
                .push(Point::new(x, y))
                .map_err(|_| Error::BufferWrite)?;
        }

        self.draw_polyline(&points, Color::TRACE[channel % CHANNEL_COUNT])?;
        self.traces[channel % CHANNEL_COUNT] = points;
        Ok(())
    }

    /// Erases the trace of `channel`.
    pub fn hide_trace(&mut self, channel: usize) -> Result<(), LCDER> {
        let old = core::mem::take(&mut self.traces[channel % CHANNEL_COUNT]);
        self.draw_polyline(&old, Color::BACKGROUND)
    }

    pub fn update_status(&mut self, status: &Status) -> Result<(), LCDER> {
        for (row, field) in Field::ALL.iter().copied().enumerate() {
            let text = status_line(field, status)?;
            let focus_changed = self.focus != Some(status.focus)
                && (self.focus == Some(field) || status.focus == field);
            if text == self.status[row] && !focus_changed {
                continue;
            }
            let old = core::mem::take(&mut self.status[row]);
            self.draw_text(&old, row, Color::BACKGROUND)?;
            let color = if field == status.focus {
                Color::FOCUS_TEXT
            } else {
                Color::STATUS_TEXT
            };
            self.draw_text(&text, row, color)?;
            self.status[row] = text;
        }
        self.focus = Some(status.focus);
        Ok(())
    }

    fn draw_polyline(&mut self, points: &[Point], color: Rgb565) -> Result<(), LCDER> {
        let style = PrimitiveStyle::with_stroke(color, 1);
        for pair in points.windows(2) {
            let segment = Line::new(pair[0], pair[1]).into_styled(style);
            self.lcd.draw(&segment).map_err(Error::Lcd)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, row: usize, color: Rgb565) -> Result<(), LCDER> {
        if text.is_empty() {
            return Ok(());
        }
        let position = Point::new(
            StatusColumn::LEFT,
            StatusColumn::TOP + row as i32 * (StatusColumn::TEXT_HEIGHT + StatusColumn::SPACING),
        );
        let label = Text::new(text, position).into_styled(TextStyle::new(Font8x16, color));
        self.lcd.draw(&label).map_err(Error::Lcd)
    }

    fn init(&mut self) -> Result<(), LCDER> {
        self.lcd.clear(Color::BACKGROUND).map_err(Error::Lcd)?;
        self.init_frame()
    }

    fn init_frame(&mut self) -> Result<(), LCDER> {
        let top_left = Point::new(
            Frame::TOP_LEFT.x - Frame::BORDER_WIDTH,
            Frame::TOP_LEFT.y - Frame::BORDER_WIDTH,
        );
        let bottom_right = Point::new(
            Frame::BOTTOM_RIGHT.x + Frame::BORDER_WIDTH,
            Frame::BOTTOM_RIGHT.y + Frame::BORDER_WIDTH,
        );
        let border = Rectangle::new(top_left, bottom_right).into_styled(
            PrimitiveStyleBuilder::new()
                .stroke_width(Frame::BORDER_WIDTH as u32)
                .stroke_color(Color::FRAME_BORDER)
                .fill_color(Color::BACKGROUND)
                .build(),
        );
        self.lcd.draw(&border).map_err(Error::Lcd)
    }
}

fn status_line<LCDER>(field: Field, status: &Status) -> Result<Line16, LCDER> {
    let SignalConfig {
        kind,
        frequency_hz,
        amplitude_mv,
        duty_cycle,
    } = status.state.config;
    let view = status.state.view;
    let mut line = Line16::new();
    let written = match field {
        Field::Signal => write!(line, "{}", kind.name()),
        Field::Frequency => write!(line, "{:>5} Hz", frequency_hz),
        Field::Amplitude => write!(line, "{:>4} mV", amplitude_mv),
        Field::DutyCycle => write!(line, "{:>3} %", duty_cycle),
        Field::Output => match status.state.mode {
            Mode::Generating => write!(line, "OUT ON"),
            Mode::Capturing => write!(line, "OUT OFF"),
        },
        Field::Preset => write!(line, "PRESET {}", status.preset + 1),
        Field::SavePreset => write!(line, "SAVE"),
        Field::TimeDiv => write!(line, "{:>3} ms/div", view.time_div.ms()),
        Field::VoltDiv => write!(line, "{:>3} mV/div", view.volt_div.mv()),
        Field::Channel1 => write!(line, "CH1 {}", on_off(status.state.visible[0])),
        Field::Channel2 => write!(line, "CH2 {}", on_off(status.state.visible[1])),
    };
    written.map_err(|_| Error::BufferWrite)?;
    Ok(line)
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

struct Dimension;

impl Dimension {
    const WIDTH: i32 = 480;
    const HEIGHT: i32 = 320;
}

struct Offset;

impl Offset {
    const BOTTOM: i32 = 10;
    const TOP: i32 = 10;
    const LEFT: i32 = 10;
    const RIGHT: i32 = 130;
}

struct Frame;

impl Frame {
    const BORDER_WIDTH: i32 = 2;

    const TOP_LEFT: Point = Point::new(Offset::LEFT, Offset::TOP);
    const BOTTOM_RIGHT: Point = Point::new(
        Dimension::WIDTH - Offset::RIGHT - 1,
        Dimension::HEIGHT - Offset::BOTTOM - 1,
    );

    const WIDTH: i32 = Dimension::WIDTH - Offset::LEFT - Offset::RIGHT;
    const HEIGHT: i32 = Dimension::HEIGHT - Offset::TOP - Offset::BOTTOM;
}

struct StatusColumn;

impl StatusColumn {
    const TEXT_HEIGHT: i32 = 16;
    const SPACING: i32 = 8;
    const LEFT: i32 = Frame::BOTTOM_RIGHT.x + Frame::BORDER_WIDTH + 10;
    const TOP: i32 = Frame::TOP_LEFT.y + StatusColumn::SPACING;
}

struct Color;

impl Color {
    const BACKGROUND: Rgb565 = Rgb565::BLACK;
    const FRAME_BORDER: Rgb565 = Rgb565::WHITE;
    const TRACE: [Rgb565; CHANNEL_COUNT] = [Rgb565::MAGENTA, Rgb565::CYAN];
    const STATUS_TEXT: Rgb565 = Rgb565::WHITE;
    const FOCUS_TEXT: Rgb565 = Rgb565::YELLOW;
}
