use core::f64::consts::TAU;

use crate::config::SignalKind;
use crate::TABLE_LEN;

pub type SampleTable = [u8; TABLE_LEN];

/// Fills the first `point_count` entries of `table` with one period of the
/// waveform, scaled to `amplitude` DAC codes peak to peak.
///
/// Entries past `point_count` are left untouched. `duty_cycle` only matters
/// for the square wave.
pub fn fill(
    table: &mut SampleTable,
    point_count: usize,
    kind: SignalKind,
    amplitude: u8,
    duty_cycle: u8,
) {
    let n = point_count.min(TABLE_LEN);
    if n == 0 {
        return;
    }

    let amplitude = amplitude as u32;
    let high_points = n as u32 * duty_cycle.min(100) as u32 / 100;

    for (i, slot) in table[..n].iter_mut().enumerate() {
        let i = i as u32;
        let n = n as u32;
        let value = match kind {
            SignalKind::Sine => sine(i, n, amplitude),
            SignalKind::Square => {
                if i < high_points {
                    amplitude
                } else {
                    0
                }
            }
            SignalKind::Triangle => {
                if i > n / 2 {
                    2 * amplitude * (n - i) / n
                } else {
                    2 * amplitude * i / n
                }
            }
            SignalKind::Sawtooth => i * amplitude / n,
        };
        *slot = value.min(amplitude) as u8;
    }
}

fn sine(i: u32, n: u32, amplitude: u32) -> u32 {
    let s = libm::sin(TAU * i as f64 / n as f64);
    ((s + 1.0) * amplitude as f64 / 2.0 + 0.5) as u32
}
