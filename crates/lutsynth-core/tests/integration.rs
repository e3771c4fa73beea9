//! Integration tests for lutsynth-core.
//!
//! Tests cover end-to-end rendering, cross-thread parameter publication,
//! modulator behaviour as seen by the engine, and the controller driving a
//! live engine.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use lutsynth_core::waveform;
use lutsynth_core::{
    CallbackFlow, Generator, Modulator, OscillatorParams, ParameterChannel, StereoChannel,
    SynthController, SynthEngine, TABLE_SIZE, Waveform,
};

// ---------------------------------------------------------------------------
// 1. End-to-end rendering
// ---------------------------------------------------------------------------

#[test]
fn three_saws_at_one_third_reproduce_saw() {
    let saw = OscillatorParams {
        amplitude: 1.0 / 3.0,
        waveform: Waveform::Saw,
        ..OscillatorParams::default()
    };
    let channel = Arc::new(ParameterChannel::with_params([saw; 3]));
    channel.set_master_amplitude(1.0);
    let mut engine: SynthEngine = SynthEngine::new(channel);

    let mut buffer = vec![0.0f32; 2 * 512];
    assert_eq!(engine.render(&mut buffer, 512), CallbackFlow::Continue);

    let table = waveform::generate(Waveform::Saw, 0.5);
    assert!((buffer[0] - table[0]).abs() < 1e-6);
    assert!((buffer[0] + 1.0).abs() < 1e-6);
    for frame in 0..512 {
        assert!(
            (buffer[2 * frame] - table[frame]).abs() < 1e-5,
            "frame {} drifted: {} vs {}",
            frame,
            buffer[2 * frame],
            table[frame]
        );
    }
}

#[test]
fn default_engine_is_quiet_square() {
    let channel = Arc::new(ParameterChannel::new());
    let mut engine: SynthEngine = SynthEngine::new(channel);
    let mut buffer = vec![0.0f32; 2 * TABLE_SIZE];
    engine.render(&mut buffer, TABLE_SIZE);

    let expected = 0.1 * 3.0 * 0.33;
    assert!((buffer[0] - expected).abs() < 1e-6);
    assert!((buffer[2 * (TABLE_SIZE - 1)] + expected).abs() < 1e-6);
    assert!(buffer.iter().all(|s| s.abs() <= expected + 1e-6));
}

#[test]
fn controller_changes_reach_running_engine() {
    let channel = Arc::new(ParameterChannel::new());
    let mut controller: SynthController = SynthController::new(Arc::clone(&channel));
    let mut engine: SynthEngine = SynthEngine::new(Arc::clone(&channel));
    let mut buffer = vec![0.0f32; 64];

    engine.render(&mut buffer, 32);
    controller.set_waveform(1, Waveform::Sine).unwrap();
    controller.set_note(1, StereoChannel::Left, 12).unwrap();
    engine.render(&mut buffer, 32);

    let osc = engine.oscillator(1).unwrap();
    assert_eq!(osc.waveform(), Waveform::Sine);
    assert_eq!(osc.params().left_phase_inc, 2.0);
    assert_eq!(osc.params().right_phase_inc, 1.0);
    // Running phase survived both publishes.
    assert_eq!(osc.phases(), (96.0, 64.0));
}

// ---------------------------------------------------------------------------
// 2. Cross-thread publication
// ---------------------------------------------------------------------------

#[test]
fn concurrent_reads_see_only_published_values_in_order() {
    const PUBLISHES: u32 = 10_000;
    const READS: usize = 10_000;

    let channel: Arc<ParameterChannel> = Arc::new(ParameterChannel::with_params([
        OscillatorParams {
            amplitude: 0.0,
            ..OscillatorParams::default()
        };
        3
    ]));
    let published: HashSet<u32> = (0..=PUBLISHES)
        .map(|k| (k as f32 / PUBLISHES as f32).to_bits())
        .collect();

    let writer = {
        let channel = Arc::clone(&channel);
        thread::spawn(move || {
            for k in 1..=PUBLISHES {
                let params = OscillatorParams {
                    amplitude: k as f32 / PUBLISHES as f32,
                    ..OscillatorParams::default()
                };
                channel.publish(0, params).unwrap();
            }
        })
    };

    let mut last = 0.0f32;
    let mut last_generation = 0;
    for _ in 0..READS {
        let snapshot = channel.current(0).unwrap();
        let amp = snapshot.params.amplitude;
        assert!(
            published.contains(&amp.to_bits()),
            "observed unpublished amplitude {}",
            amp
        );
        assert!(amp >= last, "amplitude went backwards: {} -> {}", last, amp);
        assert!(snapshot.generation >= last_generation);
        // Table always matches the shape it was published with.
        assert_eq!(snapshot.table[0], 1.0);
        last = amp;
        last_generation = snapshot.generation;
    }

    writer.join().unwrap();
    assert_eq!(channel.current_params(0).unwrap().amplitude, 1.0);
    assert_eq!(channel.reclaim(), 0);
}

#[test]
fn engine_renders_while_controller_publishes() {
    let channel = Arc::new(ParameterChannel::new());
    channel.set_master_amplitude(1.0);
    let done = Arc::new(AtomicBool::new(false));

    let audio = {
        let channel = Arc::clone(&channel);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut engine: SynthEngine = SynthEngine::new(channel);
            let mut buffer = vec![0.0f32; 2 * 128];
            let mut peak = 0.0f32;
            while !done.load(Ordering::Acquire) {
                engine.render(&mut buffer, 128);
                for &s in &buffer {
                    assert!(s.is_finite());
                    peak = peak.max(s.abs());
                }
            }
            peak
        })
    };

    let mut controller: SynthController = SynthController::new(Arc::clone(&channel));
    let shapes = Waveform::ALL;
    for i in 0..2_000usize {
        let id = i % 3;
        controller.set_waveform(id, shapes[i % shapes.len()]).unwrap();
        controller.set_pulse_width(id, (i % 100) as f32 / 100.0).unwrap();
        controller.set_amplitude(id, 0.33).unwrap();
        controller.enable_modulator(id, i % 2 == 0).unwrap();
        controller.poll(Duration::from_micros(i as u64 * 500));
    }
    done.store(true, Ordering::Release);

    let peak = audio.join().unwrap();
    // Three slots at 0.33, modulation gain at most 1.5.
    assert!(peak <= 3.0 * 0.33 * 1.5 + 1e-5, "peak {} exceeds bound", peak);
}

// ---------------------------------------------------------------------------
// 3. Modulators
// ---------------------------------------------------------------------------

#[test]
fn disabled_modulator_holds_phase_at_zero() {
    let mut lfo = Modulator::new();
    lfo.set_rate(3.0);
    lfo.set_enabled(true);
    for _ in 0..20 {
        lfo.tick();
    }
    lfo.set_enabled(false);
    lfo.tick();
    assert_eq!(lfo.params().left_phase, 0.0);
    assert_eq!(lfo.gain(), 1.0);
}

#[test]
fn reenabled_modulator_matches_fresh_one() {
    let mut used = Modulator::new();
    used.set_rate(2.5);
    used.set_enabled(true);
    for _ in 0..50 {
        used.tick();
    }
    used.set_enabled(false);
    used.tick();
    used.set_enabled(true);

    let mut fresh = Modulator::new();
    fresh.set_rate(2.5);
    fresh.set_enabled(true);

    let a: Vec<f32> = (0..100).map(|_| used.tick()).collect();
    let b: Vec<f32> = (0..100).map(|_| fresh.tick()).collect();
    assert_eq!(a, b);
}

#[test]
fn modulation_changes_engine_output_level() {
    let saw = OscillatorParams {
        amplitude: 1.0,
        waveform: Waveform::Saw,
        ..OscillatorParams::default()
    };
    let channel = Arc::new(ParameterChannel::with_params([saw]));
    channel.set_master_amplitude(1.0);
    let mut controller = SynthController::new(Arc::clone(&channel));
    let mut engine = SynthEngine::new(Arc::clone(&channel));

    controller.set_modulator_waveform(0, Waveform::Square).unwrap();
    controller.set_modulator_depth(0, -1.0).unwrap();
    controller.enable_modulator(0, true).unwrap();
    controller.poll(Duration::ZERO);

    // Square LFO at phase 0 reads +1, so gain = 1 + 0.5 * (-1) = 0.5.
    let (left, right) = engine.render_frame();
    assert_eq!((left, right), (-0.5, -0.5));

    controller.enable_modulator(0, false).unwrap();
    let (left, _) = engine.render_frame();
    let table = waveform::generate(Waveform::Saw, 0.5);
    assert_eq!(left, table[1]);
}

#[test]
fn modulator_cadence_is_wall_clock() {
    let mut controller: SynthController<1> =
        SynthController::with_tick_rate(Arc::new(ParameterChannel::new()), 100.0);
    controller.enable_modulator(0, true).unwrap();
    assert_eq!(controller.poll(Duration::from_secs(1)), 1);
    assert_eq!(controller.poll(Duration::from_millis(1_500)), 50);
    assert_eq!(controller.modulator(0).unwrap().cursor(), 51 % 90);
}
