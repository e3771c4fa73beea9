//! Real-time playback with a line-command control loop.
//!
//! The audio thread runs [`SynthEngine::render`] inside the device callback.
//! This thread owns the [`SynthController`]: it applies commands read from
//! stdin and ticks the modulators on a fixed timer.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use crossbeam_channel::{Receiver, select};
use lutsynth_config::{EngineSettings, Patch, resolve_patch};
use lutsynth_core::{ParameterChannel, SynthController, SynthEngine};
use lutsynth_io::{AudioBackend, CpalBackend, StreamConfig};

use crate::command::{HELP, LineCommand, parse_line};

/// Control loop wake-up period. Modulators catch up on missed ticks, so this
/// only bounds jitter.
const CONTROL_PERIOD: Duration = Duration::from_millis(1);

#[derive(Args)]
pub struct PlayArgs {
    /// Patch to start from (factory name, user patch name or path)
    #[arg(short, long)]
    patch: Option<String>,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    device: Option<String>,

    /// Sample rate in Hz (overrides the patch)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Buffer size in frames (overrides the patch)
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Stop after this many seconds
    #[arg(long)]
    seconds: Option<f64>,

    /// Do not read commands from stdin
    #[arg(long)]
    no_input: bool,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let mut patch = match &args.patch {
        Some(name) => resolve_patch(name)?,
        None => Patch::default(),
    };
    if let Some(sample_rate) = args.sample_rate {
        patch.engine.sample_rate = sample_rate;
    }
    if let Some(buffer_size) = args.buffer_size {
        patch.engine.buffer_size = buffer_size;
    }
    patch.validate()?;
    let settings = patch.engine;
    let limit = args.seconds.map(play_limit).transpose()?;

    let channel = Arc::new(ParameterChannel::new());
    let mut controller: SynthController =
        SynthController::with_tick_rate(Arc::clone(&channel), settings.modulator_rate_hz);
    patch.apply(&mut controller)?;
    let mut engine: SynthEngine = SynthEngine::new(Arc::clone(&channel));

    println!("Playing patch '{}'", patch.name);
    println!("  Output: {}", args.device.as_deref().unwrap_or("default"));
    println!("  Sample rate: {} Hz", settings.sample_rate);
    println!("  Buffer size: {} frames", settings.buffer_size);
    println!("  Modulator rate: {} Hz", settings.modulator_rate_hz);
    if !args.no_input {
        println!("\nType 'help' for commands, 'quit' or Ctrl+C to stop.\n");
    } else {
        println!("\nPress Ctrl+C to stop...\n");
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let stream_errors = Arc::new(AtomicUsize::new(0));
    let error_count = Arc::clone(&stream_errors);

    let mut backend = CpalBackend::new();
    let config = StreamConfig {
        sample_rate: settings.sample_rate,
        buffer_size: settings.buffer_size,
        device_name: args.device.clone(),
    };
    let handle = backend.open(
        &config,
        Box::new(move |buffer: &mut [f32], frames: usize| engine.render(buffer, frames)),
        Box::new(move |err: &str| {
            error_count.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %err, "output stream error");
        }),
    )?;
    backend.start(handle)?;

    let lines = if args.no_input {
        crossbeam_channel::never()
    } else {
        spawn_stdin_reader()
    };
    let session = Session {
        controller,
        settings,
        running: &running,
        limit,
    };
    session.run(lines, || backend.is_finished(handle).unwrap_or(true));

    backend.stop(handle)?;
    backend.close(handle)?;

    let errors = stream_errors.load(Ordering::Relaxed);
    if errors > 0 {
        println!("{errors} stream error(s) reported (see log)");
    }
    println!("Done!");
    Ok(())
}

/// Convert `--seconds` into a playback limit.
fn play_limit(seconds: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| {
            anyhow::anyhow!("invalid --seconds value {seconds}: expected a positive duration")
        })
}

/// Read stdin lines on a helper thread. The channel disconnects at EOF.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map_or_else(
            |e| {
                tracing::warn!(error = %e, "cannot spawn stdin reader, commands disabled");
                crossbeam_channel::never()
            },
            |_| rx,
        )
}

struct Session<'a> {
    controller: SynthController,
    settings: EngineSettings,
    running: &'a AtomicBool,
    limit: Option<Duration>,
}

impl Session<'_> {
    /// Run until quit, Ctrl+C, the time limit, or `finished()` reports the
    /// stream has ended.
    fn run(mut self, mut lines: Receiver<String>, finished: impl Fn() -> bool) {
        let start = Instant::now();
        let ticker = crossbeam_channel::tick(CONTROL_PERIOD);

        while self.running.load(Ordering::SeqCst) {
            let mut stdin_closed = false;
            let mut quit = false;
            select! {
                recv(lines) -> line => match line {
                    Ok(line) => quit = self.handle_line(&line),
                    Err(_) => stdin_closed = true,
                },
                recv(ticker) -> _ => {
                    self.controller.poll(start.elapsed());
                    quit = self.limit.is_some_and(|limit| start.elapsed() >= limit) || finished();
                }
            }
            if quit {
                break;
            }
            // Keep playing without commands.
            if stdin_closed {
                lines = crossbeam_channel::never();
            }
        }
    }

    /// Apply one line. Returns `true` to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match parse_line(line) {
            Ok(None) => {}
            Ok(Some(LineCommand::Quit)) => return true,
            Ok(Some(LineCommand::Intent(intent))) => {
                if let Err(e) = self.controller.apply(intent) {
                    println!("error: {e}");
                }
            }
            Ok(Some(LineCommand::Save(path))) => {
                if let Err(e) = self.save(&path) {
                    println!("error: {e}");
                }
            }
            Ok(Some(LineCommand::Status)) => self.print_status(),
            Ok(Some(LineCommand::Help)) => println!("{HELP}"),
            Err(e) => println!("error: {e}"),
        }
        false
    }

    fn save(&self, path: &Path) -> anyhow::Result<()> {
        let name = lutsynth_config::paths::patch_name_from_path(path)
            .unwrap_or_else(|| "Untitled".to_string());
        let mut patch = Patch::capture(name, &self.controller)?;
        patch.engine = self.settings;
        patch.save(path)?;
        println!("saved {}", path.display());
        Ok(())
    }

    fn print_status(&self) {
        println!("master {:.3}", self.controller.master_amplitude());
        for id in 0..lutsynth_core::OSCILLATOR_COUNT {
            let (Ok(p), Ok(m), Ok((left, right))) = (
                self.controller.params(id),
                self.controller.modulator(id),
                self.controller.note(id),
            ) else {
                continue;
            };
            let tuning = |note: Option<usize>, inc: f32| match note {
                Some(n) => format!(
                    "{} ({})",
                    lutsynth_core::note_name(n).unwrap_or("-"),
                    n
                ),
                None => format!("inc {inc:.3}"),
            };
            println!(
                "osc {id}: {:<8} amp {:.2} pw {:.2} L {} R {} | lfo {} {} rate {:.2} depth {:.2}",
                p.waveform,
                p.amplitude,
                p.pulse_width,
                tuning(left, p.left_phase_inc),
                tuning(right, p.right_phase_inc),
                if m.is_enabled() { "on " } else { "off" },
                m.waveform(),
                m.rate(),
                m.depth(),
            );
        }
    }
}
