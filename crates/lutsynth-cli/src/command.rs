//! Line commands read from stdin while playing.
//!
//! One line is one user action. Synth actions map onto [`Intent`]s; the rest
//! (`save`, `status`, `help`, `quit`) are handled by the control loop.

use std::path::PathBuf;
use std::str::FromStr;

use lutsynth_core::notes::note_index;
use lutsynth_core::{Intent, StereoChannel, SynthError, Waveform};
use thiserror::Error;

/// Help text printed by `help`.
pub const HELP: &str = "\
Commands (oscillators are numbered from 0):
  wave <osc> <shape>            saw, sine, square, triangle, supersaw, sinesaw
  note <osc> [l|r|both] <note>  note index 0-71 or name (A0..B5)
  inc <osc> [l|r|both] <value>  raw phase increment, 0.01-20
  amp <osc> <level>             oscillator level, 0-1
  pw <osc> <width>              pulse width / triangle duty, 0-1
  master <level>                master level, 0-1
  lfo <osc> on|off              enable or disable the modulator
  rate <osc> <steps>            modulator rate, 0-15 table steps per tick
  depth <osc> <depth>           modulator depth, -1 to 1
  lfowave <osc> <shape>         modulator shape
  reset <osc>                   restart an oscillator from phase 0
  sync                          restart every modulator together
  save <file>                   write the current state as a patch
  status                        print the current state
  help                          show this text
  quit                          stop playback";

/// A parsed line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineCommand {
    /// Forward to the controller.
    Intent(Intent),
    /// Capture the current state to a patch file.
    Save(PathBuf),
    /// Print the current state.
    Status,
    /// Print [`HELP`].
    Help,
    /// Leave the control loop.
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    /// First word is not a command.
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    /// Wrong number of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// Argument is not a number.
    #[error("'{0}' is not a number")]
    Number(String),

    /// Argument is not a known note.
    #[error("unknown note '{0}'")]
    Note(String),

    /// Argument is not `on` or `off`.
    #[error("expected on or off, got '{0}'")]
    Switch(String),

    /// Waveform or channel name rejected by the core.
    #[error(transparent)]
    Synth(#[from] SynthError),
}

/// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<LineCommand>, CommandError> {
    let line = line.split('#').next().unwrap_or_default();
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (head.to_ascii_lowercase().as_str(), args) {
        ("wave" | "waveform", [osc, shape]) => LineCommand::Intent(Intent::SetWaveform {
            oscillator: index(osc)?,
            waveform: Waveform::from_str(shape)?,
        }),
        ("wave" | "waveform", _) => return Err(CommandError::Usage("wave <osc> <shape>")),

        ("note", [osc, note]) => note_intent(osc, "both", note)?,
        ("note", [osc, channel, note]) => note_intent(osc, channel, note)?,
        ("note", _) => return Err(CommandError::Usage("note <osc> [l|r|both] <note>")),

        ("inc", [osc, value]) => inc_intent(osc, "both", value)?,
        ("inc", [osc, channel, value]) => inc_intent(osc, channel, value)?,
        ("inc", _) => return Err(CommandError::Usage("inc <osc> [l|r|both] <value>")),

        ("amp", [osc, level]) => LineCommand::Intent(Intent::SetAmplitude {
            oscillator: index(osc)?,
            amplitude: number(level)?,
        }),
        ("amp", _) => return Err(CommandError::Usage("amp <osc> <level>")),

        ("pw", [osc, width]) => LineCommand::Intent(Intent::SetPulseWidth {
            oscillator: index(osc)?,
            pulse_width: number(width)?,
        }),
        ("pw", _) => return Err(CommandError::Usage("pw <osc> <width>")),

        ("master", [level]) => LineCommand::Intent(Intent::SetMasterAmplitude(number(level)?)),
        ("master", _) => return Err(CommandError::Usage("master <level>")),

        ("lfo", [osc, state]) => LineCommand::Intent(Intent::EnableModulator {
            oscillator: index(osc)?,
            enabled: switch(state)?,
        }),
        ("lfo", _) => return Err(CommandError::Usage("lfo <osc> on|off")),

        ("rate", [osc, rate]) => LineCommand::Intent(Intent::SetModulatorRate {
            oscillator: index(osc)?,
            rate: number(rate)?,
        }),
        ("rate", _) => return Err(CommandError::Usage("rate <osc> <steps>")),

        ("depth", [osc, depth]) => LineCommand::Intent(Intent::SetModulatorDepth {
            oscillator: index(osc)?,
            depth: number(depth)?,
        }),
        ("depth", _) => return Err(CommandError::Usage("depth <osc> <depth>")),

        ("lfowave", [osc, shape]) => LineCommand::Intent(Intent::SetModulatorWaveform {
            oscillator: index(osc)?,
            waveform: Waveform::from_str(shape)?,
        }),
        ("lfowave", _) => return Err(CommandError::Usage("lfowave <osc> <shape>")),

        ("reset", [osc]) => LineCommand::Intent(Intent::ResetPhase {
            oscillator: index(osc)?,
        }),
        ("reset", _) => return Err(CommandError::Usage("reset <osc>")),

        ("sync", []) => LineCommand::Intent(Intent::SyncModulators),
        ("save", [path]) => LineCommand::Save(PathBuf::from(path)),
        ("save", _) => return Err(CommandError::Usage("save <file>")),
        ("status", []) => LineCommand::Status,
        ("help" | "?", _) => LineCommand::Help,
        ("quit" | "exit" | "q", []) => LineCommand::Quit,
        _ => return Err(CommandError::Unknown(head.to_string())),
    };
    Ok(Some(command))
}

fn note_intent(osc: &str, channel: &str, note: &str) -> Result<LineCommand, CommandError> {
    let note = match note.parse::<usize>() {
        Ok(i) => i,
        Err(_) => note_index(note).ok_or_else(|| CommandError::Note(note.to_string()))?,
    };
    Ok(LineCommand::Intent(Intent::SetNote {
        oscillator: index(osc)?,
        channel: StereoChannel::from_str(channel)?,
        note,
    }))
}

fn inc_intent(osc: &str, channel: &str, value: &str) -> Result<LineCommand, CommandError> {
    Ok(LineCommand::Intent(Intent::SetPhaseIncrement {
        oscillator: index(osc)?,
        channel: StereoChannel::from_str(channel)?,
        increment: number(value)?,
    }))
}

fn index(word: &str) -> Result<usize, CommandError> {
    word.parse()
        .map_err(|_| CommandError::Number(word.to_string()))
}

fn number(word: &str) -> Result<f32, CommandError> {
    word.parse()
        .map_err(|_| CommandError::Number(word.to_string()))
}

fn switch(word: &str) -> Result<bool, CommandError> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(CommandError::Switch(word.to_string())),
    }
}
