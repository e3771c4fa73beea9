//! Platform-specific paths for patches and configuration.
//!
//! # Directory Structure
//!
//! - **User patches**: `~/.config/lutsynth/patches/` (Linux),
//!   `~/Library/Application Support/lutsynth/patches/` (macOS),
//!   `%APPDATA%\lutsynth\patches\` (Windows)
//! - **User config**: the parent of the patches directory
//!
//! # Example
//!
//! ```rust,no_run
//! use lutsynth_config::paths;
//!
//! println!("User patches: {:?}", paths::user_patches_dir());
//!
//! if let Some(path) = paths::find_patch("warm_pad") {
//!     println!("Found patch at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "lutsynth";

/// Subdirectory name for patches.
const PATCHES_SUBDIR: &str = "patches";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific patches directory.
pub fn user_patches_dir() -> PathBuf {
    user_config_dir().join(PATCHES_SUBDIR)
}

/// Find a patch file by name.
///
/// The name can be a path to an existing file, or a patch name (with or
/// without `.toml`) looked up in the user patches directory.
pub fn find_patch(name: &str) -> Option<PathBuf> {
    find_patch_in(name, &user_patches_dir())
}

pub(crate) fn find_patch_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Ensure the user patches directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_patches_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_patches_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// List patch files in the user patches directory, sorted by path.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_patches() -> Vec<PathBuf> {
    list_patches_in_dir(&user_patches_dir())
}

/// List `.toml` files in `dir`, sorted by path.
pub fn list_patches_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut patches: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    patches.sort();
    patches
}

/// Get the patch name from a file path.
///
/// ```rust
/// use lutsynth_config::paths::patch_name_from_path;
/// use std::path::Path;
///
/// let name = patch_name_from_path(Path::new("/path/to/warm_pad.toml"));
/// assert_eq!(name, Some("warm_pad".to_string()));
/// ```
pub fn patch_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}
