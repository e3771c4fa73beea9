//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use lutsynth_core::modulator::DEFAULT_TICK_RATE_HZ;
use lutsynth_core::params::{DEFAULT_AMPLITUDE, DEFAULT_PULSE_WIDTH};
use lutsynth_core::{DEFAULT_MASTER_AMPLITUDE, OSCILLATOR_COUNT, StereoChannel, SynthController};

use crate::error::ConfigError;
use crate::validation::{ValidationError, parse_waveform, validate_patch_for};

/// Complete synth state as stored on disk.
///
/// Patches are TOML files. Every field has a default, so a file only needs
/// the values that differ from a fresh engine.
///
/// # TOML Format
///
/// ```toml
/// name = "Detuned Saws"
/// description = "Three saws spread across the stereo field"
/// master_amplitude = 0.1
///
/// [engine]
/// sample_rate = 48000
/// buffer_size = 512
/// modulator_rate_hz = 600.0
///
/// [[oscillators]]
/// waveform = "saw"
/// amplitude = 0.33
/// left_note = 24
/// right_increment = 4.05
///
/// [oscillators.modulator]
/// enabled = true
/// waveform = "sine"
/// rate = 0.5
/// depth = 0.4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Name of the patch.
    pub name: String,

    /// Optional description of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Master output level in [0, 1].
    #[serde(default = "default_master_amplitude")]
    pub master_amplitude: f32,

    /// Device and timing settings.
    #[serde(default)]
    pub engine: EngineSettings,

    /// One entry per oscillator slot, in slot order.
    #[serde(default)]
    pub oscillators: Vec<OscillatorPatch>,
}

/// Device and control-loop settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Device buffer size in frames.
    pub buffer_size: u32,
    /// Modulator tick cadence in Hz.
    pub modulator_rate_hz: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 512,
            modulator_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

/// Settings for one oscillator slot.
///
/// A `*_note` entry takes precedence over the matching `*_increment`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OscillatorPatch {
    /// Table shape name (see `Waveform` for accepted names).
    pub waveform: String,
    /// Level in [0, 1].
    pub amplitude: f32,
    /// Square pulse width / triangle duty in [0, 1].
    pub pulse_width: f32,
    /// Left phase increment in table steps per sample.
    pub left_increment: f32,
    /// Right phase increment in table steps per sample.
    pub right_increment: f32,
    /// Left note index into the increment table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_note: Option<usize>,
    /// Right note index into the increment table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_note: Option<usize>,
    /// Amplitude modulator for this slot.
    pub modulator: ModulatorPatch,
}

impl Default for OscillatorPatch {
    fn default() -> Self {
        Self {
            waveform: "square".to_string(),
            amplitude: DEFAULT_AMPLITUDE,
            pulse_width: DEFAULT_PULSE_WIDTH,
            left_increment: 1.0,
            right_increment: 1.0,
            left_note: None,
            right_note: None,
            modulator: ModulatorPatch::default(),
        }
    }
}

/// Settings for one slot's modulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModulatorPatch {
    /// Whether the modulator shapes the slot's gain.
    pub enabled: bool,
    /// Table shape name.
    pub waveform: String,
    /// Pulse width / duty in [0, 1].
    pub pulse_width: f32,
    /// Table steps per tick in [0, 15].
    pub rate: f32,
    /// Depth in [-1, 1].
    pub depth: f32,
}

impl Default for ModulatorPatch {
    fn default() -> Self {
        Self {
            enabled: false,
            waveform: "sine".to_string(),
            pulse_width: DEFAULT_PULSE_WIDTH,
            rate: 1.0,
            depth: 1.0,
        }
    }
}

fn default_master_amplitude() -> f32 {
    DEFAULT_MASTER_AMPLITUDE
}

impl Patch {
    /// A patch that reproduces a freshly started engine.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            master_amplitude: DEFAULT_MASTER_AMPLITUDE,
            engine: EngineSettings::default(),
            oscillators: vec![OscillatorPatch::default(); OSCILLATOR_COUNT],
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Load a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let patch: Patch = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), name = %patch.name, "patch loaded");
        Ok(patch)
    }

    /// Load a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::info!(path = %path.display(), name = %self.name, "patch saved");
        Ok(())
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against the default engine size.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_patch_for(self, OSCILLATOR_COUNT)
    }

    /// Record the controller's current state.
    ///
    /// Notes are kept where the controller still knows them; a side tuned by
    /// raw increment stores only the increment.
    pub fn capture<const N: usize>(
        name: impl Into<String>,
        controller: &SynthController<N>,
    ) -> Result<Self, ConfigError> {
        let mut oscillators = Vec::with_capacity(N);
        for id in 0..N {
            let params = controller.params(id)?;
            let modulator = controller.modulator(id)?;
            let (left_note, right_note) = controller.note(id)?;
            oscillators.push(OscillatorPatch {
                waveform: params.waveform.name().to_string(),
                amplitude: params.amplitude,
                pulse_width: params.pulse_width,
                left_increment: params.left_phase_inc,
                right_increment: params.right_phase_inc,
                left_note,
                right_note,
                modulator: ModulatorPatch {
                    enabled: modulator.is_enabled(),
                    waveform: modulator.waveform().name().to_string(),
                    pulse_width: modulator.pulse_width(),
                    rate: modulator.rate(),
                    depth: modulator.depth(),
                },
            });
        }
        Ok(Self {
            master_amplitude: controller.master_amplitude(),
            oscillators,
            ..Self::new(name)
        })
    }

    /// Validate the patch and push it through `controller`.
    ///
    /// Nothing is applied if validation fails. Slots the patch does not list
    /// keep their current settings. Each field goes through the matching
    /// controller setter, so each lands as its own publish.
    pub fn apply<const N: usize>(
        &self,
        controller: &mut SynthController<N>,
    ) -> Result<(), ConfigError> {
        validate_patch_for(self, N)?;

        controller.set_master_amplitude(self.master_amplitude);
        for (id, osc) in self.oscillators.iter().enumerate() {
            let waveform = parse_waveform("waveform", &osc.waveform)?;
            controller.set_waveform(id, waveform)?;
            controller.set_pulse_width(id, osc.pulse_width)?;
            controller.set_amplitude(id, osc.amplitude)?;

            for (channel, note, increment) in [
                (StereoChannel::Left, osc.left_note, osc.left_increment),
                (StereoChannel::Right, osc.right_note, osc.right_increment),
            ] {
                match note {
                    Some(note) => controller.set_note(id, channel, note)?,
                    None => controller.set_phase_increment(id, channel, increment)?,
                }
            }

            let m = &osc.modulator;
            let shape = parse_waveform("modulator.waveform", &m.waveform)?;
            controller.set_modulator_waveform(id, shape)?;
            controller.set_modulator_pulse_width(id, m.pulse_width)?;
            controller.set_modulator_rate(id, m.rate)?;
            controller.set_modulator_depth(id, m.depth)?;
            controller.enable_modulator(id, m.enabled)?;
        }
        tracing::debug!(name = %self.name, slots = self.oscillators.len(), "patch applied");
        Ok(())
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new("Init")
    }
}
