//! Integration tests for the backend contract.
//!
//! A manual backend stands in for the device: it stores the callbacks from
//! `open` and invokes the render callback on demand, the way a driver thread
//! would.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use lutsynth_core::{
    OscillatorParams, ParameterChannel, StereoChannel, SynthController, SynthEngine, Waveform,
};
use lutsynth_io::{
    AudioBackend, CallbackFlow, Error, ErrorCallback, RenderCallback, Result, StreamConfig,
    StreamHandle,
};

struct ManualStream {
    render: RenderCallback,
    on_error: ErrorCallback,
    buffer_size: usize,
    running: bool,
    finished: bool,
}

/// Backend that renders only when asked.
#[derive(Default)]
struct ManualBackend {
    streams: HashMap<StreamHandle, ManualStream>,
    next_id: u64,
    fail_open: bool,
}

impl ManualBackend {
    fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Run one device period. Returns `None` while stopped or finished.
    fn pump(&mut self, handle: StreamHandle) -> Option<Vec<f32>> {
        let stream = self.streams.get_mut(&handle)?;
        if !stream.running || stream.finished {
            return None;
        }
        let mut buffer = vec![0.0; stream.buffer_size * StreamConfig::CHANNELS as usize];
        if (stream.render)(&mut buffer, stream.buffer_size) == CallbackFlow::Stop {
            stream.finished = true;
        }
        Some(buffer)
    }

    fn report_underrun(&mut self, handle: StreamHandle) {
        if let Some(stream) = self.streams.get_mut(&handle) {
            (stream.on_error)("output underrun");
        }
    }
}

impl AudioBackend for ManualBackend {
    fn name(&self) -> &str {
        "manual"
    }

    fn open(
        &mut self,
        config: &StreamConfig,
        render: RenderCallback,
        on_error: ErrorCallback,
    ) -> Result<StreamHandle> {
        if self.fail_open {
            return Err(Error::NoDevice);
        }
        self.next_id += 1;
        let handle = StreamHandle::new(self.next_id);
        self.streams.insert(
            handle,
            ManualStream {
                render,
                on_error,
                buffer_size: config.buffer_size as usize,
                running: false,
                finished: false,
            },
        );
        Ok(handle)
    }

    fn start(&mut self, handle: StreamHandle) -> Result<()> {
        let stream = self
            .streams
            .get_mut(&handle)
            .ok_or(Error::UnknownStream(handle))?;
        stream.running = true;
        Ok(())
    }

    fn stop(&mut self, handle: StreamHandle) -> Result<()> {
        let stream = self
            .streams
            .get_mut(&handle)
            .ok_or(Error::UnknownStream(handle))?;
        stream.running = false;
        Ok(())
    }

    fn close(&mut self, handle: StreamHandle) -> Result<()> {
        self.streams
            .remove(&handle)
            .map(|_| ())
            .ok_or(Error::UnknownStream(handle))
    }

    fn is_finished(&self, handle: StreamHandle) -> Result<bool> {
        self.streams
            .get(&handle)
            .map(|s| s.finished)
            .ok_or(Error::UnknownStream(handle))
    }
}

fn small_config() -> StreamConfig {
    StreamConfig {
        buffer_size: 64,
        ..StreamConfig::default()
    }
}

fn engine_callback(channel: &Arc<ParameterChannel>) -> RenderCallback {
    let mut engine: SynthEngine = SynthEngine::new(Arc::clone(channel));
    Box::new(move |buffer: &mut [f32], frames: usize| engine.render(buffer, frames))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn opened_stream_is_paused_until_started() {
    let channel = Arc::new(ParameterChannel::new());
    let mut backend = ManualBackend::default();
    let handle = backend
        .open(&small_config(), engine_callback(&channel), Box::new(|_| {}))
        .unwrap();

    assert!(backend.pump(handle).is_none());
    backend.start(handle).unwrap();
    let buffer = backend.pump(handle).unwrap();
    assert_eq!(buffer.len(), 128);

    backend.stop(handle).unwrap();
    assert!(backend.pump(handle).is_none());
    backend.start(handle).unwrap();
    assert!(backend.pump(handle).is_some());

    backend.close(handle).unwrap();
    assert!(matches!(backend.start(handle), Err(Error::UnknownStream(_))));
}

#[test]
fn open_failure_never_calls_render() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut backend = ManualBackend::failing();

    let result = backend.open(
        &small_config(),
        Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
            CallbackFlow::Continue
        }),
        Box::new(|_| {}),
    );

    assert!(matches!(result, Err(Error::NoDevice)));
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn stop_flow_finishes_stream() {
    let mut remaining = 3;
    let mut backend = ManualBackend::default();
    let handle = backend
        .open(
            &small_config(),
            Box::new(move |buffer: &mut [f32], _| {
                buffer.fill(0.0);
                remaining -= 1;
                if remaining == 0 {
                    CallbackFlow::Stop
                } else {
                    CallbackFlow::Continue
                }
            }),
            Box::new(|_| {}),
        )
        .unwrap();
    backend.start(handle).unwrap();

    let mut periods = 0;
    while backend.pump(handle).is_some() {
        periods += 1;
    }
    assert_eq!(periods, 3);
    assert!(backend.is_finished(handle).unwrap());
}

#[test]
fn error_callback_receives_underruns() {
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&errors);
    let channel = Arc::new(ParameterChannel::new());
    let mut backend = ManualBackend::default();
    let handle = backend
        .open(
            &small_config(),
            engine_callback(&channel),
            Box::new(move |msg: &str| {
                assert!(msg.contains("underrun"));
                seen.fetch_add(1, Ordering::Relaxed);
            }),
        )
        .unwrap();
    backend.start(handle).unwrap();

    backend.report_underrun(handle);
    backend.report_underrun(handle);
    assert_eq!(errors.load(Ordering::Relaxed), 2);
    // Underruns are not fatal.
    assert!(backend.pump(handle).is_some());
    assert!(!backend.is_finished(handle).unwrap());
}

// ---------------------------------------------------------------------------
// Engine through the backend
// ---------------------------------------------------------------------------

#[test]
fn engine_output_follows_control_changes() {
    let saw = OscillatorParams {
        amplitude: 1.0 / 3.0,
        waveform: Waveform::Saw,
        ..OscillatorParams::default()
    };
    let channel = Arc::new(ParameterChannel::with_params([saw; 3]));
    channel.set_master_amplitude(1.0);
    let mut backend = ManualBackend::default();
    let handle = backend
        .open(&small_config(), engine_callback(&channel), Box::new(|_| {}))
        .unwrap();
    backend.start(handle).unwrap();

    let first = backend.pump(handle).unwrap();
    assert!((first[0] + 1.0).abs() < 1e-6, "first sample {}", first[0]);

    let mut controller: SynthController = SynthController::new(Arc::clone(&channel));
    controller.set_master_amplitude(0.0);
    let silent = backend.pump(handle).unwrap();
    assert!(silent.iter().all(|&s| s == 0.0));

    controller.set_master_amplitude(0.5);
    controller.set_note(0, StereoChannel::Right, 12).unwrap();
    let next = backend.pump(handle).unwrap();
    assert!(next.iter().any(|&s| s != 0.0));
    assert!(next.iter().all(|s| s.abs() <= 0.5 + 1e-6));
}

#[test]
fn render_runs_on_driver_thread() {
    let channel = Arc::new(ParameterChannel::new());
    let mut backend = ManualBackend::default();
    let handle = backend
        .open(&small_config(), engine_callback(&channel), Box::new(|_| {}))
        .unwrap();
    backend.start(handle).unwrap();

    let driver = thread::spawn(move || {
        let mut frames = 0;
        for _ in 0..200 {
            if let Some(buffer) = backend.pump(handle) {
                assert!(buffer.iter().all(|s| s.is_finite()));
                frames += buffer.len() / 2;
            }
        }
        frames
    });

    let mut controller: SynthController = SynthController::new(Arc::clone(&channel));
    for i in 0..500 {
        controller
            .set_waveform(i % 3, Waveform::ALL[i % Waveform::ALL.len()])
            .unwrap();
    }

    assert_eq!(driver.join().unwrap(), 200 * 64);
}
