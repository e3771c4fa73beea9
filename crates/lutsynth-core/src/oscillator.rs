//! Stereo table-lookup oscillator.
//!
//! An [`Oscillator`] pairs a shared [`Wavetable`] with an
//! [`OscillatorParams`] block and reads the table at two independent phases,
//! one per output channel.

use std::sync::Arc;

use crate::params::OscillatorParams;
use crate::waveform::{self, Waveform};
use crate::wavetable::{TABLE_SIZE, Wavetable};

/// A source that renders one stereo frame at a time.
///
/// Implemented by [`Oscillator`] and by [`Modulator`](crate::Modulator),
/// which wraps one.
pub trait Generator {
    /// Produce the next `(left, right)` frame and advance.
    fn render_frame(&mut self) -> (f32, f32);

    /// Replace the parameter block, rebuilding the table if the shape changed.
    ///
    /// May allocate; control thread only.
    fn set_params(&mut self, params: OscillatorParams);

    /// Current parameters, including live phases.
    fn params(&self) -> &OscillatorParams;
}

/// Table-lookup oscillator with independent left and right phases.
///
/// # Example
///
/// ```rust
/// use lutsynth_core::{Generator, Oscillator, Waveform};
///
/// let mut osc = Oscillator::new();
/// osc.set_waveform(Waveform::Saw);
///
/// let (left, right) = osc.render_frame();
/// assert_eq!(left, right);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    params: OscillatorParams,
    table: Arc<Wavetable>,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Oscillator {
    /// Default oscillator: square wave, pulse width 0.5, amplitude 0.33.
    pub fn new() -> Self {
        Self::with_params(OscillatorParams::default())
    }

    /// Oscillator with a freshly generated table for `params`.
    pub fn with_params(params: OscillatorParams) -> Self {
        let params = params.sanitized(&OscillatorParams::default());
        let table = Arc::new(waveform::generate(params.waveform, params.pulse_width));
        Self { params, table }
    }

    /// Assemble from an already generated table. Does not allocate.
    pub fn from_parts(params: OscillatorParams, table: Arc<Wavetable>) -> Self {
        Self { params, table }
    }

    /// Shared table.
    pub fn table(&self) -> &Arc<Wavetable> {
        &self.table
    }

    /// Current shape.
    pub fn waveform(&self) -> Waveform {
        self.params.waveform
    }

    /// Switch shape, regenerating the table.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        if waveform != self.params.waveform {
            self.params.waveform = waveform;
            self.regenerate();
        }
    }

    /// Change pulse width; regenerates only for shapes that use it.
    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        let pulse_width = if pulse_width.is_finite() {
            pulse_width.clamp(0.0, 1.0)
        } else {
            return;
        };
        if pulse_width != self.params.pulse_width {
            self.params.pulse_width = pulse_width;
            if self.params.waveform.uses_pulse_width() {
                self.regenerate();
            }
        }
    }

    /// Set both read positions (wrapped into the table).
    pub fn set_phase(&mut self, left: f32, right: f32) {
        self.params = OscillatorParams {
            left_phase: left,
            right_phase: right,
            ..self.params
        }
        .sanitized(&self.params);
    }

    /// Current `(left, right)` read positions.
    pub fn phases(&self) -> (f32, f32) {
        (self.params.left_phase, self.params.right_phase)
    }

    /// Take a published parameter block and its matching table.
    ///
    /// Running phases are kept unless `reset_phase` is set. Cloning the `Arc`
    /// only bumps a reference count, so this is safe on the audio thread as
    /// long as the caller keeps the previous table alive elsewhere.
    pub fn adopt(&mut self, params: &OscillatorParams, table: &Arc<Wavetable>, reset_phase: bool) {
        let (left_phase, right_phase) = if reset_phase {
            (params.left_phase, params.right_phase)
        } else {
            self.phases()
        };
        self.params = OscillatorParams {
            left_phase,
            right_phase,
            ..*params
        };
        if !Arc::ptr_eq(&self.table, table) {
            self.table = Arc::clone(table);
        }
    }

    /// Advance both phases by their increments without reading the table.
    #[inline]
    pub fn advance_phases(&mut self) {
        advance(&mut self.params.left_phase, self.params.left_phase_inc);
        advance(&mut self.params.right_phase, self.params.right_phase_inc);
    }

    fn regenerate(&mut self) {
        self.table = Arc::new(waveform::generate(
            self.params.waveform,
            self.params.pulse_width,
        ));
    }
}

impl Generator for Oscillator {
    #[inline]
    fn render_frame(&mut self) -> (f32, f32) {
        let amp = self.params.amplitude;
        let left = amp * self.table.sample_at(self.params.left_phase);
        let right = amp * self.table.sample_at(self.params.right_phase);
        self.advance_phases();
        (left, right)
    }

    fn set_params(&mut self, params: OscillatorParams) {
        let params = params.sanitized(&self.params);
        let rebuild = !params.same_table(&self.params);
        self.params = params;
        if rebuild {
            self.regenerate();
        }
    }

    fn params(&self) -> &OscillatorParams {
        &self.params
    }
}

#[inline]
fn advance(phase: &mut f32, inc: f32) {
    *phase += inc;
    if *phase >= TABLE_SIZE as f32 {
        *phase -= TABLE_SIZE as f32;
    }
}
