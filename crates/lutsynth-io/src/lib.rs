//! Audio device layer for lutsynth.
//!
//! This crate provides:
//!
//! - **Backend abstraction**: [`AudioBackend`] with `open` / `start` / `stop` /
//!   `close`, driving a boxed render callback
//! - **cpal backend**: [`CpalBackend`], the default device implementation
//! - **Device discovery**: [`list_output_devices`] and [`default_output_device`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lutsynth_core::{ParameterChannel, SynthEngine};
//! use lutsynth_io::{AudioBackend, CpalBackend, StreamConfig};
//!
//! let channel = Arc::new(ParameterChannel::new());
//! let mut engine: SynthEngine = SynthEngine::new(Arc::clone(&channel));
//!
//! let mut backend = CpalBackend::new();
//! let handle = backend.open(
//!     &StreamConfig::default(),
//!     Box::new(move |buffer, frames| engine.render(buffer, frames)),
//!     Box::new(|err| tracing::warn!(%err, "stream error")),
//! )?;
//! backend.start(handle)?;
//! ```

pub mod backend;
pub mod cpal_backend;
mod devices;

pub use backend::{AudioBackend, ErrorCallback, RenderCallback, StreamConfig, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use devices::{AudioDevice, default_output_device, list_output_devices};
pub use lutsynth_core::CallbackFlow;

/// Error types for audio device operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The requested stream configuration cannot be used.
    #[error("Unsupported stream configuration: {0}")]
    UnsupportedConfig(String),

    /// The stream handle does not belong to this backend or was closed.
    #[error("Unknown stream handle: {0}")]
    UnknownStream(StreamHandle),
}

/// Convenience result type for audio device operations.
pub type Result<T> = std::result::Result<T, Error>;
