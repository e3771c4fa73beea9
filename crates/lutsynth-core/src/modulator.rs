//! Low-frequency modulator ticked from the control thread.
//!
//! A [`Modulator`] wraps an [`Oscillator`] and advances it on a fixed
//! wall-clock cadence (600 ticks per second by default) instead of at the
//! audio rate. Each tick produces one value in `[-depth, depth]`, records it
//! in a short history ring for display and updates the gain that the engine
//! applies to the oscillator slot the modulator belongs to.
//!
//! ```rust
//! use lutsynth_core::Modulator;
//! use std::time::Duration;
//!
//! let mut lfo = Modulator::new();
//! lfo.set_enabled(true);
//! lfo.set_depth(0.5);
//!
//! // First poll anchors the clock and runs one tick.
//! assert_eq!(lfo.poll(Duration::ZERO), 1);
//! // 11 ms later, six more ticks are due at 600 Hz.
//! assert_eq!(lfo.poll(Duration::from_millis(11)), 6);
//! assert!((0.75..=1.25).contains(&lfo.gain()));
//! ```

use std::time::Duration;

use crate::oscillator::{Generator, Oscillator};
use crate::params::OscillatorParams;
use crate::waveform::Waveform;

/// Values kept in the display ring.
pub const HISTORY_LEN: usize = 90;

/// Default tick cadence in Hz.
pub const DEFAULT_TICK_RATE_HZ: f64 = 600.0;

/// Largest modulator rate, in table steps per tick.
pub const MAX_RATE: f32 = 15.0;

/// Upper bound on ticks run by a single [`Modulator::poll`].
///
/// A control thread that stalls for longer than this skips ahead rather
/// than replaying the backlog in a burst.
pub const MAX_CATCH_UP_TICKS: usize = 600;

/// Control-rate oscillator used as a per-slot gain modulator.
#[derive(Debug, Clone)]
pub struct Modulator {
    osc: Oscillator,
    history: [f32; HISTORY_LEN],
    cursor: usize,
    next_due: Option<Duration>,
    interval: Duration,
    depth: f32,
    enabled: bool,
    raw: f32,
    value: f32,
}

impl Default for Modulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Modulator {
    /// Disabled sine modulator, rate 1.0, depth 1.0, ticking at 600 Hz.
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE_HZ)
    }

    /// Same as [`Modulator::new`] with a custom cadence.
    ///
    /// Rates that are not positive and finite, or whose interval does not
    /// fit a non-zero [`Duration`], fall back to the default.
    pub fn with_tick_rate(tick_rate_hz: f64) -> Self {
        let interval = Some(tick_rate_hz)
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .and_then(|hz| Duration::try_from_secs_f64(1.0 / hz).ok())
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(1.0 / DEFAULT_TICK_RATE_HZ));
        let osc = Oscillator::with_params(OscillatorParams {
            amplitude: 1.0,
            waveform: Waveform::Sine,
            ..OscillatorParams::default()
        });
        Self {
            osc,
            history: [0.0; HISTORY_LEN],
            cursor: 0,
            next_due: None,
            interval,
            depth: 1.0,
            enabled: false,
            raw: 0.0,
            value: 0.0,
        }
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run every tick that has come due by `now`.
    ///
    /// `now` is any monotonic time base (typically `Instant::elapsed` of a
    /// start instant). The first call anchors the schedule at `now`. Returns
    /// the number of ticks run.
    pub fn poll(&mut self, now: Duration) -> usize {
        let mut due = *self.next_due.get_or_insert(now);
        let mut ticks = 0;
        while due <= now {
            if ticks == MAX_CATCH_UP_TICKS {
                due = now + self.interval;
                break;
            }
            self.tick();
            due += self.interval;
            ticks += 1;
        }
        self.next_due = Some(due);
        ticks
    }

    /// Run one tick immediately and return the new value.
    pub fn tick(&mut self) -> f32 {
        let (value, _) = self.render_frame();
        self.history[self.cursor] = value;
        self.cursor = (self.cursor + 1) % HISTORY_LEN;
        if !self.enabled {
            self.osc.set_phase(0.0, 0.0);
        }
        value
    }

    /// Most recent tick value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Gain for the modulated slot: `1 + value/2` when enabled, else 1.
    pub fn gain(&self) -> f32 {
        if self.enabled {
            1.0 + 0.5 * self.value
        } else {
            1.0
        }
    }

    /// Whether the modulator affects its slot.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn modulation on or off.
    ///
    /// While disabled the phase is held at 0, so re-enabling always starts
    /// from the top of the cycle.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Modulation depth in [-1, 1].
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Set modulation depth, clamped to [-1, 1].
    ///
    /// The latest value is rescaled at once, so [`Modulator::gain`] follows
    /// the new depth without waiting for the next tick.
    pub fn set_depth(&mut self, depth: f32) {
        if depth.is_finite() {
            self.depth = depth.clamp(-1.0, 1.0);
            self.value = self.depth * self.raw;
        }
    }

    /// Rate in table steps per tick.
    pub fn rate(&self) -> f32 {
        self.osc.params().left_phase_inc
    }

    /// Set rate, clamped to [0, 15] table steps per tick.
    pub fn set_rate(&mut self, rate: f32) {
        if !rate.is_finite() {
            return;
        }
        let rate = rate.clamp(0.0, MAX_RATE);
        self.osc.set_params(OscillatorParams {
            left_phase_inc: rate,
            right_phase_inc: rate,
            ..*self.osc.params()
        });
    }

    /// Modulation shape.
    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    /// Change the modulation shape.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.osc.set_waveform(waveform);
    }

    /// Pulse width / duty for the modulation shape.
    pub fn pulse_width(&self) -> f32 {
        self.osc.params().pulse_width
    }

    /// Change pulse width / duty for the modulation shape.
    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.osc.set_pulse_width(pulse_width);
    }

    /// Reset phase to the start of the cycle.
    pub fn sync(&mut self) {
        self.osc.set_phase(0.0, 0.0);
    }

    /// Underlying oscillator.
    pub fn oscillator(&self) -> &Oscillator {
        &self.osc
    }

    /// Raw history ring; see [`Modulator::history_ordered`] for time order.
    pub fn history(&self) -> &[f32; HISTORY_LEN] {
        &self.history
    }

    /// Ring slot the next tick writes to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// History from oldest to newest.
    pub fn history_ordered(&self) -> impl Iterator<Item = f32> + '_ {
        self.history[self.cursor..]
            .iter()
            .chain(&self.history[..self.cursor])
            .copied()
    }
}

impl Generator for Modulator {
    /// Depth-scaled frame. Does not touch the history ring or the schedule.
    fn render_frame(&mut self) -> (f32, f32) {
        let (left, right) = self.osc.render_frame();
        self.raw = left;
        self.value = self.depth * left;
        (self.value, self.depth * right)
    }

    fn set_params(&mut self, params: OscillatorParams) {
        self.osc.set_params(params);
    }

    fn params(&self) -> &OscillatorParams {
        self.osc.params()
    }
}
