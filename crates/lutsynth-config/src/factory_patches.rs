//! Factory patches bundled with lutsynth.
//!
//! These are always available without any files on disk and double as
//! starting points for `patch init --factory`.

use crate::Patch;

/// TOML content for factory patches, keyed by lookup name.
static FACTORY_PATCHES_TOML: &[(&str, &str)] = &[
    ("init", INIT_PATCH),
    ("detuned-saws", DETUNED_SAWS_PATCH),
    ("pulse-tremolo", PULSE_TREMOLO_PATCH),
    ("octave-sines", OCTAVE_SINES_PATCH),
];

/// Power-on state: three quiet squares at the base increment.
const INIT_PATCH: &str = r#"
name = "Init"
description = "Power-on state, three squares at the base increment"
master_amplitude = 0.1

[[oscillators]]
[[oscillators]]
[[oscillators]]
"#;

const DETUNED_SAWS_PATCH: &str = r#"
name = "Detuned Saws"
description = "Two saws pulled apart across the stereo field over a sub octave"
master_amplitude = 0.1

[[oscillators]]
waveform = "saw"
amplitude = 0.3
left_note = 24
right_note = 24

[[oscillators]]
waveform = "saw"
amplitude = 0.3
left_increment = 4.03
right_increment = 3.97

[[oscillators]]
waveform = "supersaw"
amplitude = 0.25
left_note = 12
right_note = 12
"#;

const PULSE_TREMOLO_PATCH: &str = r#"
name = "Pulse Tremolo"
description = "Narrow and wide pulses with out-of-step tremolo"
master_amplitude = 0.08

[[oscillators]]
waveform = "square"
pulse_width = 0.2
left_note = 19
right_note = 19

[oscillators.modulator]
enabled = true
waveform = "triangle"
rate = 2.0
depth = 0.8

[[oscillators]]
waveform = "square"
pulse_width = 0.65
left_note = 31
right_note = 31

[oscillators.modulator]
enabled = true
waveform = "sine"
rate = 3.0
depth = -0.8

[[oscillators]]
waveform = "triangle"
pulse_width = 0.5
amplitude = 0.2
left_note = 7
right_note = 7
"#;

const OCTAVE_SINES_PATCH: &str = r#"
name = "Octave Sines"
description = "Three sines an octave apart, each breathing at its own rate"
master_amplitude = 0.15

[[oscillators]]
waveform = "sine"
left_note = 12
right_note = 12

[oscillators.modulator]
enabled = true
rate = 0.25
depth = 0.5

[[oscillators]]
waveform = "sine"
left_note = 24
right_note = 24

[oscillators.modulator]
enabled = true
rate = 0.4
depth = 0.5

[[oscillators]]
waveform = "sine"
amplitude = 0.2
left_note = 36
right_note = 36

[oscillators.modulator]
enabled = true
rate = 0.65
depth = 0.5
"#;

/// All factory patches.
///
/// # Example
///
/// ```rust
/// use lutsynth_config::factory_patches;
///
/// for patch in factory_patches() {
///     println!("{}: {}", patch.name, patch.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_patches() -> Vec<Patch> {
    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(_, toml)| Patch::from_toml(toml).ok())
        .collect()
}

/// Get a factory patch by lookup name or display name, case-insensitively.
///
/// ```rust
/// use lutsynth_config::get_factory_patch;
///
/// assert!(get_factory_patch("detuned-saws").is_some());
/// assert!(get_factory_patch("Octave Sines").is_some());
/// assert!(get_factory_patch("nonexistent").is_none());
/// ```
pub fn get_factory_patch(name: &str) -> Option<Patch> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PATCHES_TOML
        .iter()
        .find(|(key, _)| *key == name_lower)
    {
        return Patch::from_toml(toml).ok();
    }

    factory_patches()
        .into_iter()
        .find(|patch| patch.name.to_lowercase() == name_lower)
}

/// Lookup names of all factory patches.
pub fn factory_patch_names() -> Vec<&'static str> {
    FACTORY_PATCHES_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` refers to a factory patch.
pub fn is_factory_patch(name: &str) -> bool {
    get_factory_patch(name).is_some()
}
