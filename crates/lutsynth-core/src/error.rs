//! Error types for control-side synth operations.

use thiserror::Error;

/// Errors raised by the controller and parameter channel.
///
/// Out-of-range *values* are clamped rather than rejected; these variants
/// cover indices and names that cannot be mapped to anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// Oscillator slot does not exist
    #[error("unknown oscillator {id} (engine has {count} slots)")]
    UnknownOscillator {
        /// Requested slot index.
        id: usize,
        /// Number of slots in the engine.
        count: usize,
    },

    /// Note index outside the increment table
    #[error("note index {index} out of range (table has {count} notes)")]
    NoteOutOfRange {
        /// Requested note index.
        index: usize,
        /// Number of entries in the note table.
        count: usize,
    },

    /// Waveform name not recognized
    #[error("unknown waveform: {0}")]
    UnknownWaveform(String),

    /// Stereo channel name not recognized
    #[error("unknown channel: {0} (expected left, right or both)")]
    UnknownChannel(String),
}

/// Result alias for synth operations.
pub type Result<T> = std::result::Result<T, SynthError>;
