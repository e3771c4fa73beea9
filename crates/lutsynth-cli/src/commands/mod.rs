//! CLI command implementations.

pub mod devices;
pub mod notes;
pub mod patch;
pub mod play;
