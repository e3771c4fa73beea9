//! Control-thread facade over the parameter channel.
//!
//! [`SynthController`] keeps the logical value of every user-facing setting,
//! turns each change into exactly one publish on the [`ParameterChannel`]
//! and owns the modulators, which it ticks from [`SynthController::poll`].

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::{ParameterChannel, Snapshot};
use crate::engine::OSCILLATOR_COUNT;
use crate::error::{Result, SynthError};
use crate::modulator::{DEFAULT_TICK_RATE_HZ, Modulator};
use crate::notes::{NOTE_COUNT, note_increment};
use crate::params::OscillatorParams;
use crate::waveform::Waveform;
use crate::wavetable::TABLE_SIZE;

/// Smallest phase increment accepted by [`SynthController::set_phase_increment`].
pub const MIN_TUNING_INCREMENT: f32 = 0.01;

/// Largest phase increment accepted by [`SynthController::set_phase_increment`].
pub const MAX_TUNING_INCREMENT: f32 = 20.0;

/// Which side(s) of an oscillator a pitch change applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StereoChannel {
    /// Left only.
    Left,
    /// Right only.
    Right,
    /// Both sides.
    #[default]
    Both,
}

impl StereoChannel {
    const fn left(self) -> bool {
        matches!(self, StereoChannel::Left | StereoChannel::Both)
    }

    const fn right(self) -> bool {
        matches!(self, StereoChannel::Right | StereoChannel::Both)
    }
}

impl fmt::Display for StereoChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StereoChannel::Left => "left",
            StereoChannel::Right => "right",
            StereoChannel::Both => "both",
        })
    }
}

impl FromStr for StereoChannel {
    type Err = SynthError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(StereoChannel::Left),
            "r" | "right" => Ok(StereoChannel::Right),
            "lr" | "both" => Ok(StereoChannel::Both),
            _ => Err(SynthError::UnknownChannel(s.to_string())),
        }
    }
}

/// One user action, as issued by any front end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Change an oscillator's shape.
    SetWaveform {
        /// Slot index.
        oscillator: usize,
        /// New shape.
        waveform: Waveform,
    },
    /// Tune to a note from the increment table.
    SetNote {
        /// Slot index.
        oscillator: usize,
        /// Side(s) to retune.
        channel: StereoChannel,
        /// Index into the note table.
        note: usize,
    },
    /// Fine-tune the raw phase increment.
    SetPhaseIncrement {
        /// Slot index.
        oscillator: usize,
        /// Side(s) to retune.
        channel: StereoChannel,
        /// Table steps per sample.
        increment: f32,
    },
    /// Change an oscillator's level.
    SetAmplitude {
        /// Slot index.
        oscillator: usize,
        /// Level in [0, 1].
        amplitude: f32,
    },
    /// Change pulse width / triangle duty.
    SetPulseWidth {
        /// Slot index.
        oscillator: usize,
        /// Width in [0, 1].
        pulse_width: f32,
    },
    /// Change the master level.
    SetMasterAmplitude(f32),
    /// Turn a slot's modulator on or off.
    EnableModulator {
        /// Slot index.
        oscillator: usize,
        /// New state.
        enabled: bool,
    },
    /// Change a modulator's rate.
    SetModulatorRate {
        /// Slot index.
        oscillator: usize,
        /// Table steps per tick.
        rate: f32,
    },
    /// Change a modulator's depth.
    SetModulatorDepth {
        /// Slot index.
        oscillator: usize,
        /// Depth in [-1, 1].
        depth: f32,
    },
    /// Change a modulator's shape.
    SetModulatorWaveform {
        /// Slot index.
        oscillator: usize,
        /// New shape.
        waveform: Waveform,
    },
    /// Restart every modulator from phase 0.
    SyncModulators,
    /// Restart an oscillator from phase 0.
    ResetPhase {
        /// Slot index.
        oscillator: usize,
    },
}

/// Control-side owner of the synth's logical state.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use lutsynth_core::{ParameterChannel, StereoChannel, SynthController, Waveform};
///
/// let channel = Arc::new(ParameterChannel::new());
/// let mut controller: SynthController = SynthController::new(Arc::clone(&channel));
///
/// controller.set_waveform(0, Waveform::Saw).unwrap();
/// controller.set_note(0, StereoChannel::Both, 12).unwrap();
///
/// let params = channel.current_params(0).unwrap();
/// assert_eq!(params.waveform, Waveform::Saw);
/// assert_eq!(params.left_phase_inc, 2.0);
/// ```
#[derive(Debug)]
pub struct SynthController<const N: usize = OSCILLATOR_COUNT> {
    channel: Arc<ParameterChannel<N>>,
    params: [OscillatorParams; N],
    modulators: [Modulator; N],
    notes: [(Option<usize>, Option<usize>); N],
}

impl<const N: usize> SynthController<N> {
    /// Controller seeded from the channel's current state, modulators at 600 Hz.
    pub fn new(channel: Arc<ParameterChannel<N>>) -> Self {
        Self::with_tick_rate(channel, DEFAULT_TICK_RATE_HZ)
    }

    /// Controller with a custom modulator cadence.
    pub fn with_tick_rate(channel: Arc<ParameterChannel<N>>, tick_rate_hz: f64) -> Self {
        let params = core::array::from_fn(|i| channel.current_params(i).unwrap_or_default());
        Self {
            channel,
            params,
            modulators: core::array::from_fn(|_| Modulator::with_tick_rate(tick_rate_hz)),
            notes: [(None, None); N],
        }
    }

    /// Shared channel.
    pub fn channel(&self) -> &Arc<ParameterChannel<N>> {
        &self.channel
    }

    /// Logical parameters for slot `id`.
    pub fn params(&self, id: usize) -> Result<&OscillatorParams> {
        self.params.get(id).ok_or(SynthError::UnknownOscillator { id, count: N })
    }

    /// Modulator for slot `id`.
    pub fn modulator(&self, id: usize) -> Result<&Modulator> {
        self.modulators
            .get(id)
            .ok_or(SynthError::UnknownOscillator { id, count: N })
    }

    /// Last note selected on slot `id` as `(left, right)`.
    ///
    /// A side reads `None` after a raw increment change.
    pub fn note(&self, id: usize) -> Result<(Option<usize>, Option<usize>)> {
        self.notes
            .get(id)
            .copied()
            .ok_or(SynthError::UnknownOscillator { id, count: N })
    }

    /// Current master amplitude.
    pub fn master_amplitude(&self) -> f32 {
        self.channel.master_amplitude()
    }

    /// Select a table shape.
    pub fn set_waveform(&mut self, id: usize, waveform: Waveform) -> Result<()> {
        tracing::debug!(oscillator = id, %waveform, "set waveform");
        self.update(id, |p| p.waveform = waveform)
    }

    /// Tune one or both sides to note `note` of the increment table.
    pub fn set_note(&mut self, id: usize, channel: StereoChannel, note: usize) -> Result<()> {
        let increment = note_increment(note).ok_or(SynthError::NoteOutOfRange {
            index: note,
            count: NOTE_COUNT,
        })?;
        tracing::debug!(oscillator = id, %channel, note, increment, "set note");
        self.retune(id, channel, increment)?;
        let notes = &mut self.notes[id];
        if channel.left() {
            notes.0 = Some(note);
        }
        if channel.right() {
            notes.1 = Some(note);
        }
        Ok(())
    }

    /// Set the raw phase increment, clamped to [0.01, 20].
    pub fn set_phase_increment(
        &mut self,
        id: usize,
        channel: StereoChannel,
        increment: f32,
    ) -> Result<()> {
        let increment = if increment.is_finite() {
            increment.clamp(MIN_TUNING_INCREMENT, MAX_TUNING_INCREMENT)
        } else {
            let p = self.params(id)?;
            if channel.left() { p.left_phase_inc } else { p.right_phase_inc }
        };
        tracing::debug!(oscillator = id, %channel, increment, "set phase increment");
        self.retune(id, channel, increment)?;
        let notes = &mut self.notes[id];
        if channel.left() {
            notes.0 = None;
        }
        if channel.right() {
            notes.1 = None;
        }
        Ok(())
    }

    /// Set an oscillator's level, clamped to [0, 1].
    pub fn set_amplitude(&mut self, id: usize, amplitude: f32) -> Result<()> {
        tracing::debug!(oscillator = id, amplitude, "set amplitude");
        self.update(id, |p| p.amplitude = amplitude)
    }

    /// Set pulse width / triangle duty, clamped to [0, 1].
    pub fn set_pulse_width(&mut self, id: usize, pulse_width: f32) -> Result<()> {
        tracing::debug!(oscillator = id, pulse_width, "set pulse width");
        self.update(id, |p| p.pulse_width = pulse_width)
    }

    /// Set the master level, clamped to [0, 1].
    pub fn set_master_amplitude(&mut self, amplitude: f32) {
        tracing::debug!(amplitude, "set master amplitude");
        self.channel.set_master_amplitude(amplitude);
    }

    /// Turn a slot's modulator on or off. Disabling restores unity gain.
    pub fn enable_modulator(&mut self, id: usize, enabled: bool) -> Result<()> {
        tracing::debug!(oscillator = id, enabled, "modulator toggled");
        self.modulator_mut(id)?.set_enabled(enabled);
        self.publish_gain(id)
    }

    /// Set a modulator's rate, clamped to [0, 15] table steps per tick.
    pub fn set_modulator_rate(&mut self, id: usize, rate: f32) -> Result<()> {
        tracing::debug!(oscillator = id, rate, "set modulator rate");
        self.modulator_mut(id)?.set_rate(rate);
        self.publish_gain(id)
    }

    /// Set a modulator's depth, clamped to [-1, 1]. The slot's gain follows
    /// immediately.
    pub fn set_modulator_depth(&mut self, id: usize, depth: f32) -> Result<()> {
        tracing::debug!(oscillator = id, depth, "set modulator depth");
        self.modulator_mut(id)?.set_depth(depth);
        self.publish_gain(id)
    }

    /// Change a modulator's shape.
    pub fn set_modulator_waveform(&mut self, id: usize, waveform: Waveform) -> Result<()> {
        tracing::debug!(oscillator = id, %waveform, "set modulator waveform");
        self.modulator_mut(id)?.set_waveform(waveform);
        self.publish_gain(id)
    }

    /// Change a modulator's pulse width / duty.
    pub fn set_modulator_pulse_width(&mut self, id: usize, pulse_width: f32) -> Result<()> {
        self.modulator_mut(id)?.set_pulse_width(pulse_width);
        self.publish_gain(id)
    }

    /// Restart every modulator from phase 0 on the same tick.
    pub fn sync_modulators(&mut self) {
        tracing::debug!("modulators synced");
        for (id, modulator) in self.modulators.iter_mut().enumerate() {
            modulator.sync();
            // id < N by construction
            let _ = self.channel.set_modulation_gain(id, modulator.gain());
        }
    }

    /// Make the renderer restart slot `id` from phase 0.
    pub fn reset_phase(&mut self, id: usize) -> Result<()> {
        let params = self.params_mut(id)?;
        params.left_phase = 0.0;
        params.right_phase = 0.0;
        let params = *params;
        tracing::debug!(oscillator = id, "phase reset");
        self.channel.publish_reset(id, params).map(|_| ())
    }

    /// Tick due modulators and hand their gains to the renderer.
    ///
    /// `now` is a monotonic time since some fixed start. Also frees snapshots
    /// the renderer has released. Returns the number of modulator ticks run.
    pub fn poll(&mut self, now: Duration) -> usize {
        let mut ticks = 0;
        for (id, modulator) in self.modulators.iter_mut().enumerate() {
            let ran = modulator.poll(now);
            if ran > 0 {
                // id < N by construction
                let _ = self.channel.set_modulation_gain(id, modulator.gain());
            }
            ticks += ran;
        }
        self.channel.reclaim();
        ticks
    }

    /// Apply one [`Intent`].
    pub fn apply(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::SetWaveform {
                oscillator,
                waveform,
            } => self.set_waveform(oscillator, waveform),
            Intent::SetNote {
                oscillator,
                channel,
                note,
            } => self.set_note(oscillator, channel, note),
            Intent::SetPhaseIncrement {
                oscillator,
                channel,
                increment,
            } => self.set_phase_increment(oscillator, channel, increment),
            Intent::SetAmplitude {
                oscillator,
                amplitude,
            } => self.set_amplitude(oscillator, amplitude),
            Intent::SetPulseWidth {
                oscillator,
                pulse_width,
            } => self.set_pulse_width(oscillator, pulse_width),
            Intent::SetMasterAmplitude(amplitude) => {
                self.set_master_amplitude(amplitude);
                Ok(())
            }
            Intent::EnableModulator {
                oscillator,
                enabled,
            } => self.enable_modulator(oscillator, enabled),
            Intent::SetModulatorRate { oscillator, rate } => {
                self.set_modulator_rate(oscillator, rate)
            }
            Intent::SetModulatorDepth { oscillator, depth } => {
                self.set_modulator_depth(oscillator, depth)
            }
            Intent::SetModulatorWaveform {
                oscillator,
                waveform,
            } => self.set_modulator_waveform(oscillator, waveform),
            Intent::SyncModulators => {
                self.sync_modulators();
                Ok(())
            }
            Intent::ResetPhase { oscillator } => self.reset_phase(oscillator),
        }
    }

    /// Combined shape of all published slots; see [`preview_mix`].
    pub fn preview(&self, channel: StereoChannel, out: &mut [f32]) {
        preview_mix(&self.channel.snapshots(), channel, out);
    }

    fn retune(&mut self, id: usize, channel: StereoChannel, increment: f32) -> Result<()> {
        self.update(id, |p| {
            if channel.left() {
                p.left_phase_inc = increment;
            }
            if channel.right() {
                p.right_phase_inc = increment;
            }
        })
    }

    /// Edit the logical block for `id` and publish it once.
    fn update(&mut self, id: usize, edit: impl FnOnce(&mut OscillatorParams)) -> Result<()> {
        let current = *self.params_mut(id)?;
        let mut next = current;
        edit(&mut next);
        let next = next.sanitized(&current);
        self.params[id] = next;
        self.channel.publish(id, next).map(|_| ())
    }

    fn params_mut(&mut self, id: usize) -> Result<&mut OscillatorParams> {
        self.params
            .get_mut(id)
            .ok_or(SynthError::UnknownOscillator { id, count: N })
    }

    /// Hand the modulator's current gain for `id` to the renderer.
    fn publish_gain(&self, id: usize) -> Result<()> {
        let gain = self.modulator(id)?.gain();
        self.channel.set_modulation_gain(id, gain)
    }

    fn modulator_mut(&mut self, id: usize) -> Result<&mut Modulator> {
        self.modulators
            .get_mut(id)
            .ok_or(SynthError::UnknownOscillator { id, count: N })
    }
}

/// Sum of every slot's table as it would sound over one table length.
///
/// `out[i] = Σ amp_k · table_k(i · inc_k)` using the left or right
/// increment; [`StereoChannel::Both`] averages the two sides. Intended for
/// waveform displays; runs on the control thread.
pub fn preview_mix(snapshots: &[Arc<Snapshot>], channel: StereoChannel, out: &mut [f32]) {
    for (i, sample) in out.iter_mut().enumerate() {
        let x = (i % TABLE_SIZE) as f32;
        *sample = snapshots
            .iter()
            .map(|snap| {
                let p = &snap.params;
                let left = snap.table.sample_at(x * p.left_phase_inc);
                let right = snap.table.sample_at(x * p.right_phase_inc);
                let value = match channel {
                    StereoChannel::Left => left,
                    StereoChannel::Right => right,
                    StereoChannel::Both => 0.5 * (left + right),
                };
                p.amplitude * value
            })
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavetable::Wavetable;

    fn controller() -> (Arc<ParameterChannel>, SynthController) {
        let channel = Arc::new(ParameterChannel::new());
        let controller = SynthController::new(Arc::clone(&channel));
        (channel, controller)
    }

    #[test]
    fn test_each_setter_publishes_once() {
        let (channel, mut c) = controller();
        c.set_waveform(0, Waveform::Sine).unwrap();
        assert_eq!(channel.current(0).unwrap().generation, 1);
        c.set_amplitude(0, 0.5).unwrap();
        assert_eq!(channel.current(0).unwrap().generation, 2);
        c.set_pulse_width(0, 0.2).unwrap();
        assert_eq!(channel.current(0).unwrap().generation, 3);
        c.set_note(0, StereoChannel::Both, 5).unwrap();
        assert_eq!(channel.current(0).unwrap().generation, 4);
        c.set_phase_increment(0, StereoChannel::Left, 3.0).unwrap();
        assert_eq!(channel.current(0).unwrap().generation, 5);
        assert_eq!(channel.current(1).unwrap().generation, 0);
    }

    #[test]
    fn test_set_note_per_channel() {
        let (channel, mut c) = controller();
        c.set_note(1, StereoChannel::Right, 24).unwrap();
        let p = channel.current_params(1).unwrap();
        assert_eq!(p.left_phase_inc, 1.0);
        assert_eq!(p.right_phase_inc, 4.0);
        assert_eq!(c.note(1).unwrap(), (None, Some(24)));

        assert_eq!(
            c.set_note(1, StereoChannel::Both, NOTE_COUNT),
            Err(SynthError::NoteOutOfRange {
                index: NOTE_COUNT,
                count: NOTE_COUNT
            })
        );
        assert_eq!(channel.current(1).unwrap().generation, 1);
    }

    #[test]
    fn test_phase_increment_clamped_and_clears_note() {
        let (channel, mut c) = controller();
        c.set_note(2, StereoChannel::Both, 12).unwrap();
        c.set_phase_increment(2, StereoChannel::Both, 500.0).unwrap();
        let p = channel.current_params(2).unwrap();
        assert_eq!(p.left_phase_inc, MAX_TUNING_INCREMENT);
        assert_eq!(p.right_phase_inc, MAX_TUNING_INCREMENT);
        assert_eq!(c.note(2).unwrap(), (None, None));

        c.set_phase_increment(2, StereoChannel::Left, 0.0).unwrap();
        assert_eq!(channel.current_params(2).unwrap().left_phase_inc, MIN_TUNING_INCREMENT);
    }

    #[test]
    fn test_amplitude_clamped() {
        let (channel, mut c) = controller();
        c.set_amplitude(0, 1.7).unwrap();
        assert_eq!(channel.current_params(0).unwrap().amplitude, 1.0);
        c.set_amplitude(0, f32::NAN).unwrap();
        assert_eq!(channel.current_params(0).unwrap().amplitude, 1.0);
    }

    #[test]
    fn test_unknown_oscillator() {
        let (_, mut c) = controller();
        let err = SynthError::UnknownOscillator { id: 3, count: 3 };
        assert_eq!(c.set_waveform(3, Waveform::Saw), Err(err.clone()));
        assert_eq!(c.enable_modulator(3, true), Err(err.clone()));
        assert_eq!(c.set_modulator_rate(3, 1.0), Err(err));
    }

    #[test]
    fn test_master_amplitude() {
        let (channel, mut c) = controller();
        assert_eq!(c.master_amplitude(), 0.1);
        c.set_master_amplitude(0.6);
        assert_eq!(channel.master_amplitude(), 0.6);
    }

    #[test]
    fn test_modulator_gain_reaches_channel() {
        let (channel, mut c) = controller();
        c.set_modulator_waveform(0, Waveform::Square).unwrap();
        c.set_modulator_depth(0, 0.5).unwrap();
        c.enable_modulator(0, true).unwrap();

        assert_eq!(c.poll(Duration::ZERO), 3);
        assert_eq!(channel.modulation_gain(0), Some(1.25));
        assert_eq!(channel.modulation_gain(1), Some(1.0));

        c.enable_modulator(0, false).unwrap();
        assert_eq!(channel.modulation_gain(0), Some(1.0));
    }

    #[test]
    fn test_modulator_setters_publish_without_poll() {
        let (channel, mut c) = controller();
        c.set_modulator_waveform(0, Waveform::Square).unwrap();
        c.enable_modulator(0, true).unwrap();
        c.poll(Duration::ZERO);
        assert_eq!(channel.modulation_gain(0), Some(1.5));

        c.set_modulator_depth(0, 0.0).unwrap();
        assert_eq!(channel.modulation_gain(0), Some(1.0));

        c.set_modulator_depth(0, -0.5).unwrap();
        assert_eq!(channel.modulation_gain(0), Some(0.75));

        // Rate and shape changes publish the current gain as well.
        channel.set_modulation_gain(0, 2.0).unwrap();
        c.set_modulator_rate(0, 3.0).unwrap();
        assert_eq!(channel.modulation_gain(0), Some(0.75));

        channel.set_modulation_gain(0, 2.0).unwrap();
        c.set_modulator_waveform(0, Waveform::Saw).unwrap();
        assert_eq!(channel.modulation_gain(0), Some(0.75));

        channel.set_modulation_gain(0, 2.0).unwrap();
        c.sync_modulators();
        assert_eq!(channel.modulation_gain(0), Some(0.75));
        assert_eq!(channel.modulation_gain(1), Some(1.0));
    }

    #[test]
    fn test_sync_modulators() {
        let (_, mut c) = controller();
        for id in 0..3 {
            c.enable_modulator(id, true).unwrap();
            c.set_modulator_rate(id, id as f32 + 1.0).unwrap();
        }
        for i in 0..10 {
            c.poll(Duration::from_millis(i * 2));
        }
        c.sync_modulators();
        for id in 0..3 {
            assert_eq!(c.modulator(id).unwrap().oscillator().phases(), (0.0, 0.0));
        }
    }

    #[test]
    fn test_reset_phase_bumps_epoch() {
        let (channel, mut c) = controller();
        c.reset_phase(1).unwrap();
        let snap = channel.current(1).unwrap();
        assert_eq!(snap.phase_epoch, 1);
        assert_eq!((snap.params.left_phase, snap.params.right_phase), (0.0, 0.0));
    }

    #[test]
    fn test_apply_routes_intents() {
        let (channel, mut c) = controller();
        c.apply(Intent::SetWaveform {
            oscillator: 2,
            waveform: Waveform::Triangle,
        })
        .unwrap();
        c.apply(Intent::SetMasterAmplitude(0.3)).unwrap();
        c.apply(Intent::SetModulatorDepth {
            oscillator: 2,
            depth: -0.25,
        })
        .unwrap();
        c.apply(Intent::SyncModulators).unwrap();

        assert_eq!(channel.current_params(2).unwrap().waveform, Waveform::Triangle);
        assert_eq!(channel.master_amplitude(), 0.3);
        assert_eq!(c.modulator(2).unwrap().depth(), -0.25);
        assert!(
            c.apply(Intent::SetNote {
                oscillator: 0,
                channel: StereoChannel::Both,
                note: 99
            })
            .is_err()
        );
    }

    #[test]
    fn test_stereo_channel_parse() {
        assert_eq!("L".parse::<StereoChannel>(), Ok(StereoChannel::Left));
        assert_eq!("right".parse::<StereoChannel>(), Ok(StereoChannel::Right));
        assert_eq!("both".parse::<StereoChannel>(), Ok(StereoChannel::Both));
        assert!("mid".parse::<StereoChannel>().is_err());
    }

    #[test]
    fn test_preview_mix_sums_slots() {
        let ramp = Arc::new(Wavetable::from_fn(|i| i as f32 / TABLE_SIZE as f32));
        let snap = |amplitude: f32, inc: f32| {
            Arc::new(Snapshot {
                params: OscillatorParams {
                    amplitude,
                    left_phase_inc: inc,
                    right_phase_inc: inc,
                    ..OscillatorParams::default()
                },
                table: Arc::clone(&ramp),
                generation: 0,
                phase_epoch: 0,
            })
        };
        let snapshots = [snap(0.5, 1.0), snap(0.25, 2.0)];
        let mut out = vec![0.0; TABLE_SIZE];
        preview_mix(&snapshots, StereoChannel::Left, &mut out);

        for i in [0usize, 1, 100, 300] {
            let expected = 0.5 * ramp[i] + 0.25 * ramp[(2 * i) % TABLE_SIZE];
            assert!(
                (out[i] - expected).abs() < 1e-6,
                "preview[{}] = {}, expected {}",
                i,
                out[i],
                expected
            );
        }
    }

    #[test]
    fn test_controller_preview_uses_published_state() {
        let (_, mut c) = controller();
        for id in 0..3 {
            c.set_waveform(id, Waveform::Saw).unwrap();
            c.set_amplitude(id, 1.0 / 3.0).unwrap();
        }
        let mut out = [0.0f32; 4];
        c.preview(StereoChannel::Both, &mut out);
        assert!((out[0] + 1.0).abs() < 1e-6);
    }
}
