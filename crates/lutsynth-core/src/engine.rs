//! Audio-thread mixer for a fixed bank of oscillators.
//!
//! [`SynthEngine::render`] is the render callback body: it picks up any newly
//! published snapshots, then mixes every slot into an interleaved stereo
//! buffer. It does not lock, allocate, free or log.

use std::sync::Arc;

use arc_swap::Guard;

use crate::channel::{ParameterChannel, Snapshot};
use crate::oscillator::{Generator, Oscillator};

/// Number of oscillator slots in the default engine.
pub const OSCILLATOR_COUNT: usize = 3;

/// Output channels per frame.
pub const CHANNELS: usize = 2;

/// What the audio driver should do after a render callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFlow {
    /// Keep calling.
    Continue,
    /// Stop the stream after this buffer.
    Stop,
}

#[derive(Debug)]
struct EngineSlot {
    oscillator: Oscillator,
    snapshot: Arc<Snapshot>,
    gain: f32,
}

/// Renderer half of the synth.
///
/// Owns the live oscillators (and thus the running phases). Parameter
/// changes arrive through the shared [`ParameterChannel`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use lutsynth_core::{CallbackFlow, ParameterChannel, SynthEngine};
///
/// let channel = Arc::new(ParameterChannel::new());
/// let mut engine: SynthEngine = SynthEngine::new(Arc::clone(&channel));
///
/// let mut buffer = [0.0f32; 2 * 64];
/// assert_eq!(engine.render(&mut buffer, 64), CallbackFlow::Continue);
/// ```
#[derive(Debug)]
pub struct SynthEngine<const N: usize = OSCILLATOR_COUNT> {
    channel: Arc<ParameterChannel<N>>,
    slots: [EngineSlot; N],
    master: f32,
}

impl<const N: usize> SynthEngine<N> {
    /// Build an engine playing the channel's current snapshots.
    ///
    /// Call on the control thread before handing the engine to the driver.
    pub fn new(channel: Arc<ParameterChannel<N>>) -> Self {
        let slots = core::array::from_fn(|i| {
            let snapshot = Guard::into_inner(channel.slots()[i].load());
            EngineSlot {
                oscillator: Oscillator::from_parts(snapshot.params, Arc::clone(&snapshot.table)),
                snapshot,
                gain: 1.0,
            }
        });
        let master = channel.master_amplitude();
        Self {
            channel,
            slots,
            master,
        }
    }

    /// Shared parameter channel.
    pub fn channel(&self) -> &Arc<ParameterChannel<N>> {
        &self.channel
    }

    /// Live oscillator in slot `id`.
    pub fn oscillator(&self, id: usize) -> Option<&Oscillator> {
        self.slots.get(id).map(|slot| &slot.oscillator)
    }

    /// Render `frame_count` interleaved stereo frames into `output`.
    ///
    /// `output` should hold `2 * frame_count` samples; only whole frames that
    /// fit are rendered and any remaining samples are zeroed.
    pub fn render(&mut self, output: &mut [f32], frame_count: usize) -> CallbackFlow {
        self.refresh();

        let frames = frame_count.min(output.len() / CHANNELS);
        let (body, rest) = output.split_at_mut(frames * CHANNELS);
        for frame in body.chunks_exact_mut(CHANNELS) {
            let (left, right) = self.mix_frame();
            frame[0] = left;
            frame[1] = right;
        }
        rest.fill(0.0);

        CallbackFlow::Continue
    }

    /// Pull snapshots and render one frame.
    pub fn render_frame(&mut self) -> (f32, f32) {
        self.refresh();
        self.mix_frame()
    }

    /// Take any snapshot published since the last refresh and re-read the
    /// scalar gains.
    fn refresh(&mut self) {
        for (shared, slot) in self.channel.slots().iter().zip(self.slots.iter_mut()) {
            let latest = shared.load();
            if latest.generation != slot.snapshot.generation {
                let reset = latest.phase_epoch != slot.snapshot.phase_epoch;
                slot.oscillator.adopt(&latest.params, &latest.table, reset);
                // The previous snapshot is still parked in the channel's
                // retire list, so this drop only decrements.
                slot.snapshot = Guard::into_inner(latest);
            }
            slot.gain = shared.modulation_gain();
        }
        self.master = self.channel.master_amplitude();
    }

    #[inline]
    fn mix_frame(&mut self) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        for slot in &mut self.slots {
            let (l, r) = slot.oscillator.render_frame();
            left += slot.gain * l;
            right += slot.gain * r;
        }
        (self.master * left, self.master * right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::OscillatorParams;
    use crate::waveform::{self, Waveform};

    fn saw(amplitude: f32) -> OscillatorParams {
        OscillatorParams {
            amplitude,
            waveform: Waveform::Saw,
            ..OscillatorParams::default()
        }
    }

    #[test]
    fn test_three_saws_sum_to_saw() {
        let channel = Arc::new(ParameterChannel::with_params([saw(1.0 / 3.0); 3]));
        channel.set_master_amplitude(1.0);
        let mut engine: SynthEngine = SynthEngine::new(channel);
        let table = waveform::generate(Waveform::Saw, 0.5);

        let mut buffer = [0.0f32; 8];
        engine.render(&mut buffer, 4);
        for frame in 0..4 {
            assert!(
                (buffer[2 * frame] - table[frame]).abs() < 1e-6,
                "frame {}: {} vs {}",
                frame,
                buffer[2 * frame],
                table[frame]
            );
            assert_eq!(buffer[2 * frame], buffer[2 * frame + 1]);
        }
    }

    #[test]
    fn test_master_scales_mix() {
        let channel = Arc::new(ParameterChannel::with_params([saw(1.0)]));
        channel.set_master_amplitude(0.25);
        let mut engine = SynthEngine::new(channel);
        let (l, r) = engine.render_frame();
        assert_eq!((l, r), (-0.25, -0.25));
    }

    #[test]
    fn test_short_buffer_zeroes_tail() {
        let channel = Arc::new(ParameterChannel::with_params([saw(1.0)]));
        channel.set_master_amplitude(1.0);
        let mut engine = SynthEngine::new(channel);

        let mut buffer = [9.0f32; 7];
        engine.render(&mut buffer, 16);
        assert_eq!(buffer[0], -1.0);
        assert_eq!(buffer[6], 0.0);
        assert_eq!(engine.oscillator(0).unwrap().phases(), (3.0, 3.0));
    }

    #[test]
    fn test_publish_keeps_phase_and_reset_applies_it() {
        let channel = Arc::new(ParameterChannel::with_params([saw(1.0)]));
        let mut engine = SynthEngine::new(Arc::clone(&channel));
        let mut buffer = [0.0f32; 20];
        engine.render(&mut buffer, 10);
        assert_eq!(engine.oscillator(0).unwrap().phases(), (10.0, 10.0));

        channel.publish(0, saw(0.5)).unwrap();
        engine.render(&mut buffer, 1);
        let osc = engine.oscillator(0).unwrap();
        assert_eq!(osc.params().amplitude, 0.5);
        assert_eq!(osc.phases(), (11.0, 11.0));

        channel.publish_reset(0, saw(0.5)).unwrap();
        engine.render(&mut buffer, 1);
        assert_eq!(engine.oscillator(0).unwrap().phases(), (1.0, 1.0));
    }

    #[test]
    fn test_reset_survives_a_later_publish() {
        let channel = Arc::new(ParameterChannel::with_params([saw(1.0)]));
        let mut engine = SynthEngine::new(Arc::clone(&channel));
        let mut buffer = [0.0f32; 10];
        engine.render(&mut buffer, 5);

        channel.publish_reset(0, saw(1.0)).unwrap();
        channel.publish(0, saw(0.8)).unwrap();
        engine.render(&mut buffer, 1);
        assert_eq!(engine.oscillator(0).unwrap().phases(), (1.0, 1.0));
    }

    #[test]
    fn test_modulation_gain_applies_per_slot() {
        let channel = Arc::new(ParameterChannel::with_params([saw(1.0), saw(1.0)]));
        channel.set_master_amplitude(1.0);
        channel.set_modulation_gain(1, 0.5).unwrap();
        let mut engine = SynthEngine::new(channel);
        let (l, _) = engine.render_frame();
        assert_eq!(l, -1.5);
    }

    #[test]
    fn test_render_never_frees_on_audio_side() {
        let channel = Arc::new(ParameterChannel::with_params([saw(1.0)]));
        let mut engine = SynthEngine::new(Arc::clone(&channel));
        let mut buffer = [0.0f32; 4];

        channel
            .publish(
                0,
                OscillatorParams {
                    waveform: Waveform::Sine,
                    ..saw(1.0)
                },
            )
            .unwrap();
        engine.render(&mut buffer, 2);
        // The engine let go of the old snapshot; only the control side frees it.
        assert_eq!(channel.reclaim(), 0);
        assert_eq!(engine.oscillator(0).unwrap().params().waveform, Waveform::Sine);
    }
}
