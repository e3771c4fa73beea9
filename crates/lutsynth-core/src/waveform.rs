//! Waveform shapes and the table generators that render them.
//!
//! Generators allocate and run in O([`TABLE_SIZE`]); call them from the
//! control thread only.

use core::fmt;
use core::str::FromStr;

use crate::error::SynthError;
use crate::wavetable::{TABLE_SIZE, Wavetable};

/// Table shapes an oscillator can play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Rising ramp, all harmonics.
    Saw,
    /// Pure fundamental.
    Sine,
    /// Pulse with variable width.
    #[default]
    Square,
    /// Asymmetric triangle; pulse width sets the peak position.
    Triangle,
    /// Two saw ramps per period.
    SuperSaw,
    /// Average of sine and saw.
    SineSaw,
}

impl Waveform {
    /// All shapes, in selector order.
    pub const ALL: [Waveform; 6] = [
        Waveform::Saw,
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::SuperSaw,
        Waveform::SineSaw,
    ];

    /// Lower-case name used in patches and line commands.
    pub const fn name(self) -> &'static str {
        match self {
            Waveform::Saw => "saw",
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::SuperSaw => "supersaw",
            Waveform::SineSaw => "sinesaw",
        }
    }

    /// Position in [`Waveform::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Waveform::Saw => 0,
            Waveform::Sine => 1,
            Waveform::Square => 2,
            Waveform::Triangle => 3,
            Waveform::SuperSaw => 4,
            Waveform::SineSaw => 5,
        }
    }

    /// Inverse of [`Waveform::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether the pulse width parameter changes this shape's table.
    pub const fn uses_pulse_width(self) -> bool {
        matches!(self, Waveform::Square | Waveform::Triangle)
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Waveform {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "sine" | "sin" => Ok(Waveform::Sine),
            "square" | "sqr" | "pulse" => Ok(Waveform::Square),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "supersaw" | "ssaw" => Ok(Waveform::SuperSaw),
            "sinesaw" | "sinsaw" => Ok(Waveform::SineSaw),
            _ => Err(SynthError::UnknownWaveform(s.to_string())),
        }
    }
}

/// One period of `sin(2πi/N)`, computed in double precision.
pub fn fill_sine(table: &mut Wavetable) {
    let n = TABLE_SIZE as f64;
    table.fill_with(|i| libm::sin(core::f64::consts::TAU * i as f64 / n) as f32);
}

/// Rising ramp from -1 at index 0 towards +1, wrapping once per period.
pub fn fill_saw(table: &mut Wavetable) {
    table.fill_with(saw_at);
}

/// +1 for the first `floor(N·pulse_width)` samples, -1 for the rest.
pub fn fill_square(table: &mut Wavetable, pulse_width: f32) {
    let high = (TABLE_SIZE as f32 * pulse_width.clamp(0.0, 1.0)) as usize;
    table.fill_with(|i| if i < high { 1.0 } else { -1.0 });
}

/// Ramp up from -1 to +1 at `N·duty`, then back down to -1 at N.
///
/// `duty = 0` degenerates to a falling ramp and `duty = 1` to a rising one.
pub fn fill_triangle(table: &mut Wavetable, duty: f32) {
    let n = TABLE_SIZE as f32;
    let peak = n * duty.clamp(0.0, 1.0);
    table.fill_with(|i| {
        let x = i as f32;
        if x < peak {
            -1.0 + 2.0 * x / peak
        } else {
            1.0 - 2.0 * (x - peak) / (n - peak)
        }
    });
}

/// Saw read at double speed: two ramps per period.
pub fn fill_super_saw(table: &mut Wavetable) {
    table.fill_with(|i| saw_at((2 * i) % TABLE_SIZE));
}

/// Sample-wise average of sine and saw.
pub fn fill_sine_saw(table: &mut Wavetable) {
    let n = TABLE_SIZE as f64;
    table.fill_with(|i| {
        let sine = libm::sin(core::f64::consts::TAU * i as f64 / n) as f32;
        (sine + saw_at(i)) * 0.5
    });
}

/// Render `waveform` into an existing table.
pub fn fill(table: &mut Wavetable, waveform: Waveform, pulse_width: f32) {
    match waveform {
        Waveform::Saw => fill_saw(table),
        Waveform::Sine => fill_sine(table),
        Waveform::Square => fill_square(table, pulse_width),
        Waveform::Triangle => fill_triangle(table, pulse_width),
        Waveform::SuperSaw => fill_super_saw(table),
        Waveform::SineSaw => fill_sine_saw(table),
    }
}

/// Build a fresh table for `waveform`.
pub fn generate(waveform: Waveform, pulse_width: f32) -> Wavetable {
    let mut table = Wavetable::new();
    fill(&mut table, waveform, pulse_width);
    table
}

#[inline]
fn saw_at(i: usize) -> f32 {
    2.0 * i as f32 / TABLE_SIZE as f32 - 1.0
}
