//! Lutsynth Core - real-time lookup-table synthesis engine
//!
//! A fixed bank of stereo wavetable oscillators, each with a control-rate
//! modulator, mixed to interleaved stereo by an audio-thread engine while an
//! unsynchronized control thread changes their parameters.
//!
//! # Core Components
//!
//! ## Tables
//!
//! - [`Wavetable`] - one period of [`TABLE_SIZE`] samples with linear
//!   interpolation ([`sample_at`])
//! - [`Waveform`] and the [`waveform`] generators (saw, sine, square,
//!   triangle, supersaw, sine-saw)
//!
//! ## Sources
//!
//! - [`Oscillator`] - table plus [`OscillatorParams`], independent left and
//!   right phases
//! - [`Modulator`] - oscillator ticked at 600 Hz from the control thread,
//!   producing a per-slot gain
//! - [`Generator`] - the render/parameter capability both share
//!
//! ## Threads
//!
//! - [`SynthEngine`] - audio-thread mixer; call [`SynthEngine::render`] from
//!   the device callback
//! - [`ParameterChannel`] - lock-free snapshot publication between threads
//! - [`SynthController`] - control-thread facade: one publish per user intent
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lutsynth_core::{
//!     ParameterChannel, StereoChannel, SynthController, SynthEngine, Waveform,
//! };
//!
//! let channel = Arc::new(ParameterChannel::new());
//! let mut controller: SynthController = SynthController::new(Arc::clone(&channel));
//! let mut engine: SynthEngine = SynthEngine::new(Arc::clone(&channel));
//!
//! // Control thread
//! controller.set_waveform(0, Waveform::Saw).unwrap();
//! controller.set_note(0, StereoChannel::Both, 24).unwrap();
//! controller.enable_modulator(0, true).unwrap();
//! controller.poll(Duration::ZERO);
//!
//! // Audio thread
//! let mut buffer = vec![0.0f32; 2 * 256];
//! engine.render(&mut buffer, 256);
//! assert!(buffer.iter().all(|s| s.abs() <= 1.0));
//! ```

pub mod channel;
pub mod controller;
pub mod engine;
pub mod error;
pub mod modulator;
pub mod notes;
pub mod oscillator;
pub mod params;
pub mod waveform;
pub mod wavetable;

pub use channel::{AtomicParam, DEFAULT_MASTER_AMPLITUDE, ParameterChannel, Snapshot};
pub use controller::{Intent, StereoChannel, SynthController, preview_mix};
pub use engine::{CHANNELS, CallbackFlow, OSCILLATOR_COUNT, SynthEngine};
pub use error::{Result, SynthError};
pub use modulator::{HISTORY_LEN, Modulator};
pub use notes::{NOTE_COUNT, NOTE_NAMES, note_increment, note_name};
pub use oscillator::{Generator, Oscillator};
pub use params::{MAX_PHASE_INCREMENT, OscillatorParams};
pub use waveform::Waveform;
pub use wavetable::{TABLE_SIZE, Wavetable, sample_at};
