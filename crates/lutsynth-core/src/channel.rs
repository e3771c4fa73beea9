//! Lock-free parameter hand-off from the control thread to the renderer.
//!
//! Each oscillator slot holds an [`ArcSwap`] of an immutable [`Snapshot`]:
//! the control thread builds a new snapshot (parameters plus the table they
//! select) and swaps it in; the audio thread loads whichever snapshot is
//! current. Readers never block and never see a half-written block.
//!
//! Scalars that change at control rate independently of the snapshot (master
//! amplitude and each slot's modulation gain) live in [`AtomicParam`]s.
//!
//! Swapped-out snapshots are parked in a retire list on the control side and
//! freed there once the renderer has let go of them, so the audio thread
//! never runs a deallocation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arc_swap::{ArcSwap, Guard};
use parking_lot::Mutex;

use crate::engine::OSCILLATOR_COUNT;
use crate::error::{Result, SynthError};
use crate::params::OscillatorParams;
use crate::waveform;
use crate::wavetable::Wavetable;

/// Default master amplitude.
pub const DEFAULT_MASTER_AMPLITUDE: f32 = 0.1;

/// A thread-safe atomic parameter using bit-cast f32.
///
/// Control thread writes, audio thread reads. No locks, no allocations.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    min: f32,
    max: f32,
    default: f32,
}

impl AtomicParam {
    /// Create a new atomic parameter with range and default.
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            value: AtomicU32::new(default.to_bits()),
            min,
            max,
            default,
        }
    }

    /// Set the parameter value, clamped to range. Non-finite values are ignored.
    #[inline]
    pub fn set(&self, v: f32) {
        if !v.is_finite() {
            return;
        }
        let clamped = v.clamp(self.min, self.max);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Get the parameter value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Get the minimum value.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Get the maximum value.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Get the default value.
    pub fn default(&self) -> f32 {
        self.default
    }

    /// Reset to default value.
    pub fn reset(&self) {
        self.set(self.default);
    }
}

/// Immutable published state of one oscillator slot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Parameters, already sanitized.
    pub params: OscillatorParams,
    /// Table matching `params.waveform` and `params.pulse_width`.
    pub table: Arc<Wavetable>,
    /// Bumped on every publish to this slot.
    pub generation: u64,
    /// Bumped on every publish that asks the renderer to take the phases in
    /// `params` instead of keeping its own.
    pub phase_epoch: u64,
}

impl Snapshot {
    fn initial(params: OscillatorParams) -> Self {
        let params = params.sanitized(&OscillatorParams::default());
        let table = Arc::new(waveform::generate(params.waveform, params.pulse_width));
        Self {
            params,
            table,
            generation: 0,
            phase_epoch: 0,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Slot {
    state: ArcSwap<Snapshot>,
    modulation_gain: AtomicParam,
}

impl Slot {
    fn new(params: OscillatorParams) -> Self {
        Self {
            state: ArcSwap::from_pointee(Snapshot::initial(params)),
            modulation_gain: AtomicParam::new(1.0, 0.0, 2.0),
        }
    }

    /// Wait-free load for the audio thread.
    #[inline]
    pub(crate) fn load(&self) -> Guard<Arc<Snapshot>> {
        self.state.load()
    }

    #[inline]
    pub(crate) fn modulation_gain(&self) -> f32 {
        self.modulation_gain.get()
    }
}

/// Cross-thread parameter store for a fixed bank of `N` oscillators.
///
/// # Example
///
/// ```rust
/// use lutsynth_core::{OscillatorParams, ParameterChannel, Waveform};
///
/// let channel: ParameterChannel = ParameterChannel::new();
/// let params = OscillatorParams { waveform: Waveform::Saw, ..OscillatorParams::default() };
/// channel.publish(0, params).unwrap();
///
/// let snapshot = channel.current(0).unwrap();
/// assert_eq!(snapshot.params.waveform, Waveform::Saw);
/// assert_eq!(snapshot.table[0], -1.0);
/// ```
#[derive(Debug)]
pub struct ParameterChannel<const N: usize = OSCILLATOR_COUNT> {
    slots: [Slot; N],
    master: AtomicParam,
    retired: Mutex<Vec<Arc<Snapshot>>>,
}

impl<const N: usize> Default for ParameterChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ParameterChannel<N> {
    /// Every slot at [`OscillatorParams::default`], master at 0.1.
    pub fn new() -> Self {
        Self::with_params([OscillatorParams::default(); N])
    }

    /// Start from explicit per-slot parameters.
    pub fn with_params(params: [OscillatorParams; N]) -> Self {
        Self {
            slots: params.map(Slot::new),
            master: AtomicParam::new(DEFAULT_MASTER_AMPLITUDE, 0.0, 1.0),
            retired: Mutex::new(Vec::new()),
        }
    }

    /// Number of oscillator slots.
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the channel has no slots.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Publish new parameters for slot `id`, keeping the renderer's phases.
    ///
    /// Values are sanitized against the previously published block. A new
    /// table is generated only if the shape or a relevant pulse width
    /// changed. Returns the new generation.
    pub fn publish(&self, id: usize, params: OscillatorParams) -> Result<u64> {
        self.publish_inner(id, params, false)
    }

    /// Publish and make the renderer jump to the phases in `params`.
    pub fn publish_reset(&self, id: usize, params: OscillatorParams) -> Result<u64> {
        self.publish_inner(id, params, true)
    }

    fn publish_inner(&self, id: usize, params: OscillatorParams, reset: bool) -> Result<u64> {
        let slot = self.slot(id)?;
        // Serializes publishers; the audio thread never touches this lock.
        let mut retired = self.retired.lock();

        let previous = slot.state.load_full();
        let params = params.sanitized(&previous.params);
        let table = if params.same_table(&previous.params) {
            Arc::clone(&previous.table)
        } else {
            Arc::new(waveform::generate(params.waveform, params.pulse_width))
        };
        let generation = previous.generation + 1;
        let phase_epoch = previous.phase_epoch + u64::from(reset);
        drop(previous);

        let old = slot.state.swap(Arc::new(Snapshot {
            params,
            table,
            generation,
            phase_epoch,
        }));
        retired.push(old);
        retired.retain(|s| Arc::strong_count(s) > 1);

        tracing::trace!(
            oscillator = id,
            generation,
            reset,
            parked = retired.len(),
            "published snapshot"
        );
        Ok(generation)
    }

    /// Latest snapshot for slot `id`.
    pub fn current(&self, id: usize) -> Option<Arc<Snapshot>> {
        self.slots.get(id).map(|slot| slot.state.load_full())
    }

    /// Latest parameters for slot `id`.
    pub fn current_params(&self, id: usize) -> Option<OscillatorParams> {
        self.slots.get(id).map(|slot| slot.state.load().params)
    }

    /// Snapshots of every slot, in slot order.
    pub fn snapshots(&self) -> [Arc<Snapshot>; N] {
        core::array::from_fn(|i| self.slots[i].state.load_full())
    }

    /// Free retired snapshots the renderer no longer references.
    ///
    /// Returns how many are still parked.
    pub fn reclaim(&self) -> usize {
        let mut retired = self.retired.lock();
        retired.retain(|s| Arc::strong_count(s) > 1);
        retired.len()
    }

    /// Store the modulation gain for slot `id` (clamped to [0, 2]).
    pub fn set_modulation_gain(&self, id: usize, gain: f32) -> Result<()> {
        self.slot(id)?.modulation_gain.set(gain);
        Ok(())
    }

    /// Current modulation gain for slot `id`.
    pub fn modulation_gain(&self, id: usize) -> Option<f32> {
        self.slots.get(id).map(Slot::modulation_gain)
    }

    /// Store the master amplitude (clamped to [0, 1]).
    pub fn set_master_amplitude(&self, amplitude: f32) {
        self.master.set(amplitude);
    }

    /// Current master amplitude.
    #[inline]
    pub fn master_amplitude(&self) -> f32 {
        self.master.get()
    }

    pub(crate) fn slots(&self) -> &[Slot; N] {
        &self.slots
    }

    fn slot(&self, id: usize) -> Result<&Slot> {
        self.slots
            .get(id)
            .ok_or(SynthError::UnknownOscillator { id, count: N })
    }
}
