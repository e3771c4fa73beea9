//! cpal-based audio backend implementation.
//!
//! [`CpalBackend`] is the default [`AudioBackend`], wrapping
//! [cpal](https://crates.io/crates/cpal) for cross-platform output on ALSA
//! (Linux), CoreAudio (macOS), WASAPI (Windows) and friends.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lutsynth_io::{AudioBackend, CallbackFlow, CpalBackend, StreamConfig};
//!
//! let mut backend = CpalBackend::new();
//! let handle = backend.open(
//!     &StreamConfig::default(),
//!     Box::new(|buffer: &mut [f32], _frames| {
//!         buffer.fill(0.0);
//!         CallbackFlow::Continue
//!     }),
//!     Box::new(|err| eprintln!("Audio error: {}", err)),
//! )?;
//! backend.start(handle)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use lutsynth_core::CHANNELS;

use crate::backend::{AudioBackend, ErrorCallback, RenderCallback, StreamConfig, StreamHandle};
use crate::devices::{device_name, find_output_device};
use crate::{CallbackFlow, Error, Result};

struct OpenStream {
    stream: cpal::Stream,
    finished: Arc<AtomicBool>,
}

/// cpal-based audio backend.
///
/// Holds a cpal [`Host`] and every stream it has opened, keyed by
/// [`StreamHandle`]. Streams live until [`AudioBackend::close`] or until the
/// backend is dropped.
pub struct CpalBackend {
    host: Host,
    streams: HashMap<StreamHandle, OpenStream>,
    next_id: u64,
}

impl CpalBackend {
    /// Create a new cpal backend using the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self {
            host,
            streams: HashMap::new(),
            next_id: 1,
        }
    }

    /// Number of open streams.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    fn find_device(&self, name: Option<&str>) -> Result<cpal::Device> {
        match name {
            Some(search) => find_output_device(&self.host, search),
            None => self.host.default_output_device().ok_or(Error::NoDevice),
        }
    }

    fn get(&self, handle: StreamHandle) -> Result<&OpenStream> {
        self.streams
            .get(&handle)
            .ok_or(Error::UnknownStream(handle))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalBackend")
            .field("host", &self.host.id().name())
            .field("streams", &self.streams.len())
            .finish()
    }
}

/// Reject configurations no device can honour before touching the host.
fn validate(config: &StreamConfig) -> Result<()> {
    if config.sample_rate == 0 {
        return Err(Error::UnsupportedConfig("sample rate must be non-zero".into()));
    }
    if config.buffer_size == 0 {
        return Err(Error::UnsupportedConfig("buffer size must be non-zero".into()));
    }
    Ok(())
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn open(
        &mut self,
        config: &StreamConfig,
        mut render: RenderCallback,
        mut on_error: ErrorCallback,
    ) -> Result<StreamHandle> {
        validate(config)?;
        let device = self.find_device(config.device_name.as_deref())?;
        let device_label = device_name(&device).unwrap_or_else(|_| "<unnamed>".to_string());

        let stream_config = cpal::StreamConfig {
            channels: StreamConfig::CHANNELS,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if flag.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }
                    let frames = data.len() / CHANNELS;
                    if render(data, frames) == CallbackFlow::Stop {
                        flag.store(true, Ordering::Release);
                    }
                },
                move |err| {
                    on_error(&err.to_string());
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        // Some hosts start streams on creation; keep the paused contract.
        if let Err(e) = stream.pause() {
            tracing::debug!(error = %e, "host cannot pause a fresh stream");
        }

        let handle = StreamHandle::new(self.next_id);
        self.next_id += 1;
        self.streams.insert(handle, OpenStream { stream, finished });
        tracing::info!(
            %handle,
            device = %device_label,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream opened"
        );
        Ok(handle)
    }

    fn start(&mut self, handle: StreamHandle) -> Result<()> {
        self.get(handle)?
            .stream
            .play()
            .map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(%handle, "output stream started");
        Ok(())
    }

    fn stop(&mut self, handle: StreamHandle) -> Result<()> {
        self.get(handle)?
            .stream
            .pause()
            .map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(%handle, "output stream stopped");
        Ok(())
    }

    fn close(&mut self, handle: StreamHandle) -> Result<()> {
        let open = self
            .streams
            .remove(&handle)
            .ok_or(Error::UnknownStream(handle))?;
        drop(open);
        tracing::info!(%handle, "output stream closed");
        Ok(())
    }

    fn is_finished(&self, handle: StreamHandle) -> Result<bool> {
        Ok(self.get(handle)?.finished.load(Ordering::Acquire))
    }
}
