//! Error types for patch operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving or applying patches.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Patch not found by name or path
    #[error("patch not found: {0}")]
    PatchNotFound(String),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// The controller rejected a patch value
    #[error("failed to apply patch: {0}")]
    Apply(#[from] lutsynth_core::SynthError),

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;
    use std::path::Path;

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn io_constructors_keep_path_and_source() {
        let err = ConfigError::read_file("patches/lead.toml", denied());
        let ConfigError::ReadFile { path, source } = &err else {
            panic!("expected ReadFile, got {err:?}");
        };
        assert_eq!(path, Path::new("patches/lead.toml"));
        assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        assert!(err.source().is_some());

        let err = ConfigError::create_dir("/cfg/lutsynth/patches", denied());
        assert!(err.to_string().contains("/cfg/lutsynth/patches"));
    }

    #[test]
    fn save_failure_names_target_file() {
        let msg = ConfigError::write_file("/tmp/bass.toml", denied()).to_string();
        assert_eq!(msg, "failed to write file '/tmp/bass.toml': denied");
    }

    #[test]
    fn patch_not_found_display() {
        let err = ConfigError::PatchNotFound("warm-pad".to_string());
        assert_eq!(err.to_string(), "patch not found: warm-pad");
    }

    #[test]
    fn apply_wraps_synth_error() {
        let err: ConfigError =
            lutsynth_core::SynthError::UnknownOscillator { id: 5, count: 3 }.into();
        let msg = err.to_string();
        assert!(msg.starts_with("failed to apply patch"), "got: {msg}");
        assert!(msg.contains("unknown oscillator 5"), "got: {msg}");
    }

    #[test]
    fn validation_error_converts() {
        let err: ConfigError = crate::validation::ValidationError::TooManyOscillators {
            count: 4,
            max: 3,
        }
        .into();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().starts_with("validation failed"));
    }

    #[test]
    fn malformed_patch_text_is_a_parse_error() {
        let parse_err = toml::from_str::<toml::Value>("oscillators = [").unwrap_err();
        let err: ConfigError = parse_err.into();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
