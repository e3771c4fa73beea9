//! Pluggable audio backend abstraction.
//!
//! This module defines the [`AudioBackend`] trait, which decouples the synth
//! engine from any specific platform audio API. The default implementation
//! wraps [cpal](https://crates.io/crates/cpal); tests drive the same trait
//! with a manual backend that calls the render callback directly.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──► start ──► stop ──► start ──► ... ──► close
//!   │                                            ▲
//!   └────────────────────────────────────────────┘
//! ```
//!
//! `open` fails fast: if the device cannot be opened with the requested
//! configuration an error is returned and the render callback is dropped
//! without ever being called.

use std::fmt;

use lutsynth_core::{CHANNELS, CallbackFlow};

use crate::Result;

/// Configuration for opening an output stream.
///
/// Output is always interleaved stereo `f32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Optional device name or index (uses system default if `None`).
    pub device_name: Option<String>,
}

impl StreamConfig {
    /// Interleaved channels per frame.
    pub const CHANNELS: u16 = CHANNELS as u16;
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 512,
            device_name: None,
        }
    }
}

/// Opaque identifier for a stream opened on a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamHandle(u64);

impl StreamHandle {
    /// Wrap a backend-assigned id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Backend-assigned id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Render callback signature.
///
/// Called on the real-time audio thread with an interleaved stereo buffer
/// (`[L0, R0, L1, R1, ...]`) and its length in frames. Must not allocate,
/// lock or perform I/O. Returning [`CallbackFlow::Stop`] ends the stream;
/// the backend outputs silence from then on.
pub type RenderCallback = Box<dyn FnMut(&mut [f32], usize) -> CallbackFlow + Send>;

/// Error callback signature.
///
/// Called when the backend reports a streaming problem (underrun, device
/// loss). Receives a human-readable message.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Audio output device abstraction.
///
/// Object-safe so a front end can select a backend at runtime via
/// `Box<dyn AudioBackend>`.
pub trait AudioBackend {
    /// Human-readable name of this backend (e.g. "cpal", "manual").
    fn name(&self) -> &str;

    /// Open an output stream. The stream starts paused.
    fn open(
        &mut self,
        config: &StreamConfig,
        render: RenderCallback,
        on_error: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Begin or resume calling the render callback.
    fn start(&mut self, handle: StreamHandle) -> Result<()>;

    /// Pause callbacks. The stream can be started again.
    fn stop(&mut self, handle: StreamHandle) -> Result<()>;

    /// Release the stream and drop its callbacks.
    fn close(&mut self, handle: StreamHandle) -> Result<()>;

    /// Whether the render callback has returned [`CallbackFlow::Stop`].
    fn is_finished(&self, handle: StreamHandle) -> Result<bool>;
}
