//! Output device discovery via cpal.

use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Position in the host's output device list.
    pub index: usize,
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

fn describe(index: usize, device: &Device) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let default_sample_rate = device
        .default_output_config()
        .map(|c| c.sample_rate())
        .unwrap_or(48000);
    Some(AudioDevice {
        index,
        name,
        default_sample_rate,
    })
}

/// List the default host's output devices.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    Ok(devices
        .enumerate()
        .filter_map(|(i, d)| describe(i, &d))
        .collect())
}

/// The default host's default output device, if any.
///
/// Its `index` is always 0; look it up in [`list_output_devices`] for the
/// position in the host list.
pub fn default_output_device() -> Option<AudioDevice> {
    let device = cpal::default_host().default_output_device()?;
    describe(0, &device)
}

/// Find an output device by index, exact name or case-insensitive partial name.
pub(crate) fn find_output_device(host: &cpal::Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = name_or_index.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    if let Some(device) = devices
        .iter()
        .find(|d| device_name(d).is_ok_and(|n| n == name_or_index))
    {
        return Ok(device.clone());
    }

    let search_lower = name_or_index.to_lowercase();
    let matches: Vec<_> = devices
        .iter()
        .filter_map(|d| {
            device_name(d)
                .ok()
                .filter(|name| name.to_lowercase().contains(&search_lower))
                .map(|name| (d, name))
        })
        .collect();

    match matches.as_slice() {
        [] => Err(Error::DeviceNotFound(format!(
            "no output device matching '{}'",
            name_or_index
        ))),
        [(device, _)] => Ok((*device).clone()),
        [(device, first), ..] => {
            let names: Vec<_> = matches.iter().map(|(_, n)| n.as_str()).collect();
            tracing::warn!(
                search = name_or_index,
                ?names,
                chosen = %first,
                "device name matches several outputs, using first"
            );
            Ok((*device).clone())
        }
    }
}
