//! Per-oscillator parameter block.

use crate::waveform::Waveform;
use crate::wavetable::TABLE_SIZE;

/// Default oscillator amplitude.
pub const DEFAULT_AMPLITUDE: f32 = 0.33;

/// Default pulse width / triangle duty.
pub const DEFAULT_PULSE_WIDTH: f32 = 0.5;

/// Largest accepted phase increment, in table steps per sample.
///
/// Half a period per sample is the table-domain Nyquist limit; it also keeps
/// the single-subtraction phase wrap valid.
pub const MAX_PHASE_INCREMENT: f32 = TABLE_SIZE as f32 / 2.0;

/// Everything the renderer needs to play one oscillator.
///
/// Published across threads as one unit, so a reader never sees a waveform
/// from one update paired with an amplitude from another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    /// Output gain in [0, 1].
    pub amplitude: f32,
    /// Left read position in [0, TABLE_SIZE).
    pub left_phase: f32,
    /// Right read position in [0, TABLE_SIZE).
    pub right_phase: f32,
    /// Left table steps per sample.
    pub left_phase_inc: f32,
    /// Right table steps per sample.
    pub right_phase_inc: f32,
    /// Table shape.
    pub waveform: Waveform,
    /// Pulse width or triangle duty in [0, 1].
    pub pulse_width: f32,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_AMPLITUDE,
            left_phase: 0.0,
            right_phase: 0.0,
            left_phase_inc: 1.0,
            right_phase_inc: 1.0,
            waveform: Waveform::default(),
            pulse_width: DEFAULT_PULSE_WIDTH,
        }
    }
}

impl OscillatorParams {
    /// Bring every field into its legal range.
    ///
    /// Non-finite fields take the value from `fallback`; finite ones are
    /// clamped (phases are wrapped instead).
    pub fn sanitized(self, fallback: &OscillatorParams) -> Self {
        let amplitude = finite_or(self.amplitude, fallback.amplitude).clamp(0.0, 1.0);
        let left_phase = wrap_phase(finite_or(self.left_phase, fallback.left_phase));
        let right_phase = wrap_phase(finite_or(self.right_phase, fallback.right_phase));
        let left_phase_inc = finite_or(self.left_phase_inc, fallback.left_phase_inc)
            .clamp(0.0, MAX_PHASE_INCREMENT);
        let right_phase_inc = finite_or(self.right_phase_inc, fallback.right_phase_inc)
            .clamp(0.0, MAX_PHASE_INCREMENT);
        let pulse_width = finite_or(self.pulse_width, fallback.pulse_width).clamp(0.0, 1.0);

        Self {
            amplitude,
            left_phase,
            right_phase,
            left_phase_inc,
            right_phase_inc,
            waveform: self.waveform,
            pulse_width,
        }
    }

    /// Whether `other` renders to the same table as `self`.
    pub fn same_table(&self, other: &OscillatorParams) -> bool {
        self.waveform == other.waveform
            && (!self.waveform.uses_pulse_width() || self.pulse_width == other.pulse_width)
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else if fallback.is_finite() {
        fallback
    } else {
        0.0
    }
}

#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase.rem_euclid(TABLE_SIZE as f32);
    // rem_euclid can round up to exactly TABLE_SIZE for tiny negatives
    if wrapped >= TABLE_SIZE as f32 {
        0.0
    } else {
        wrapped
    }
}
