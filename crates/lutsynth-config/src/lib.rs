//! Patch management for lutsynth.
//!
//! # Features
//!
//! - **Patches**: load and save complete synth state as TOML ([`Patch`])
//! - **Validation**: range checks that report every bad field at once
//! - **Paths**: platform-specific patch and config directories
//! - **Factory Patches**: built-in starting points
//!
//! A patch is applied through a [`SynthController`](lutsynth_core::SynthController),
//! so every field becomes an ordinary control change.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lutsynth_config::{Patch, user_patches_dir};
//! use lutsynth_core::{ParameterChannel, SynthController};
//!
//! let patch = Patch::load("warm_pad.toml").unwrap();
//!
//! let channel = Arc::new(ParameterChannel::new());
//! let mut controller: SynthController = SynthController::new(channel);
//! patch.apply(&mut controller).unwrap();
//!
//! let snapshot = Patch::capture("Snapshot", &controller).unwrap();
//! snapshot.save(user_patches_dir().join("snapshot.toml")).unwrap();
//! ```

mod error;
mod patch;

/// Platform-specific paths for patches and configuration.
pub mod paths;

/// Patch validation.
pub mod validation;

/// Factory patches bundled with the library.
pub mod factory_patches;

pub use error::ConfigError;
pub use factory_patches::{
    factory_patch_names, factory_patches, get_factory_patch, is_factory_patch,
};
pub use patch::{EngineSettings, ModulatorPatch, OscillatorPatch, Patch};
pub use paths::{find_patch, list_user_patches, user_config_dir, user_patches_dir};
pub use validation::{ValidationError, ValidationResult, validate_patch, validate_patch_for};

/// Resolve a patch by factory name, file path or user patch name.
///
/// Factory names win, so a user file cannot shadow `init`.
pub fn resolve_patch(name: &str) -> Result<Patch, ConfigError> {
    if let Some(patch) = get_factory_patch(name) {
        return Ok(patch);
    }
    let path = find_patch(name).ok_or_else(|| ConfigError::PatchNotFound(name.to_string()))?;
    Patch::load(path)
}
