//! Patch validation.
//!
//! The controller clamps whatever it is given, so a patch with wild values
//! would still play. Validation exists to tell the user *before* that happens:
//! every problem in a patch is collected and reported at once.
//!
//! # Example
//!
//! ```rust
//! use lutsynth_config::{Patch, validate_patch};
//!
//! let mut patch = Patch::default();
//! assert!(validate_patch(&patch).is_ok());
//!
//! patch.master_amplitude = 4.0;
//! assert!(validate_patch(&patch).is_err());
//! ```

use core::str::FromStr;

use lutsynth_core::controller::{MAX_TUNING_INCREMENT, MIN_TUNING_INCREMENT};
use lutsynth_core::modulator::MAX_RATE;
use lutsynth_core::{NOTE_COUNT, OSCILLATOR_COUNT, Waveform};
use thiserror::Error;

use crate::patch::{EngineSettings, ModulatorPatch, OscillatorPatch, Patch};

/// Lowest sample rate a patch may request.
pub const MIN_SAMPLE_RATE: u32 = 8_000;
/// Highest sample rate a patch may request.
pub const MAX_SAMPLE_RATE: u32 = 192_000;
/// Buffer size bounds in frames.
pub const BUFFER_SIZE_RANGE: (u32, u32) = (16, 8192);
/// Modulator cadence bounds in Hz.
pub const MODULATOR_RATE_RANGE: (f64, f64) = (1.0, 2000.0);

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown waveform name.
    #[error("{field}: unknown waveform '{name}'")]
    UnknownWaveform {
        /// Dotted path of the field, e.g. `oscillators[1].waveform`.
        field: String,
        /// The name as written.
        name: String,
    },

    /// Parameter value out of range.
    #[error("{field}: value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field.
        field: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Note index outside the increment table.
    #[error("{field}: note {note} out of range (table has {count} notes)")]
    NoteOutOfRange {
        /// Dotted path of the field.
        field: String,
        /// Requested note index.
        note: usize,
        /// Number of notes available.
        count: usize,
    },

    /// More oscillator entries than engine slots.
    #[error("patch has {count} oscillators, engine has {max}")]
    TooManyOscillators {
        /// Entries in the patch.
        count: usize,
        /// Slots in the engine.
        max: usize,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check a patch against the default engine size.
///
/// Returns the single error, or [`ValidationError::Multiple`] when more than
/// one field is wrong.
pub fn validate_patch(patch: &Patch) -> ValidationResult<()> {
    validate_patch_for(patch, OSCILLATOR_COUNT)
}

/// Check a patch for an engine with `slots` oscillators.
pub fn validate_patch_for(patch: &Patch, slots: usize) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if patch.oscillators.len() > slots {
        errors.push(ValidationError::TooManyOscillators {
            count: patch.oscillators.len(),
            max: slots,
        });
    }
    check_range(
        &mut errors,
        "master_amplitude",
        f64::from(patch.master_amplitude),
        0.0,
        1.0,
    );
    check_engine(&mut errors, &patch.engine);
    for (i, osc) in patch.oscillators.iter().enumerate() {
        check_oscillator(&mut errors, &format!("oscillators[{i}]"), osc);
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Parse a waveform name, mapping failure to a validation error for `field`.
pub fn parse_waveform(field: &str, name: &str) -> ValidationResult<Waveform> {
    Waveform::from_str(name).map_err(|_| ValidationError::UnknownWaveform {
        field: field.to_string(),
        name: name.to_string(),
    })
}

fn check_engine(errors: &mut Vec<ValidationError>, engine: &EngineSettings) {
    check_range(
        errors,
        "engine.sample_rate",
        f64::from(engine.sample_rate),
        f64::from(MIN_SAMPLE_RATE),
        f64::from(MAX_SAMPLE_RATE),
    );
    check_range(
        errors,
        "engine.buffer_size",
        f64::from(engine.buffer_size),
        f64::from(BUFFER_SIZE_RANGE.0),
        f64::from(BUFFER_SIZE_RANGE.1),
    );
    check_range(
        errors,
        "engine.modulator_rate_hz",
        engine.modulator_rate_hz,
        MODULATOR_RATE_RANGE.0,
        MODULATOR_RATE_RANGE.1,
    );
}

fn check_oscillator(errors: &mut Vec<ValidationError>, prefix: &str, osc: &OscillatorPatch) {
    if let Err(e) = parse_waveform(&format!("{prefix}.waveform"), &osc.waveform) {
        errors.push(e);
    }
    check_unit(errors, &format!("{prefix}.amplitude"), osc.amplitude);
    check_unit(errors, &format!("{prefix}.pulse_width"), osc.pulse_width);
    for (side, increment, note) in [
        ("left", osc.left_increment, osc.left_note),
        ("right", osc.right_increment, osc.right_note),
    ] {
        match note {
            // A note overrides the increment, which may then exceed the fine-tuning range.
            Some(note) if note >= NOTE_COUNT => errors.push(ValidationError::NoteOutOfRange {
                field: format!("{prefix}.{side}_note"),
                note,
                count: NOTE_COUNT,
            }),
            Some(_) => {}
            None => check_range(
                errors,
                &format!("{prefix}.{side}_increment"),
                f64::from(increment),
                f64::from(MIN_TUNING_INCREMENT),
                f64::from(MAX_TUNING_INCREMENT),
            ),
        }
    }
    check_modulator(errors, &format!("{prefix}.modulator"), &osc.modulator);
}

fn check_modulator(errors: &mut Vec<ValidationError>, prefix: &str, modulator: &ModulatorPatch) {
    if let Err(e) = parse_waveform(&format!("{prefix}.waveform"), &modulator.waveform) {
        errors.push(e);
    }
    check_unit(errors, &format!("{prefix}.pulse_width"), modulator.pulse_width);
    check_range(
        errors,
        &format!("{prefix}.rate"),
        f64::from(modulator.rate),
        0.0,
        f64::from(MAX_RATE),
    );
    check_range(
        errors,
        &format!("{prefix}.depth"),
        f64::from(modulator.depth),
        -1.0,
        1.0,
    );
}

fn check_unit(errors: &mut Vec<ValidationError>, field: &str, value: f32) {
    check_range(errors, field, f64::from(value), 0.0, 1.0);
}

// NaN fails both comparisons, so `contains` rejects it.
fn check_range(errors: &mut Vec<ValidationError>, field: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
}
