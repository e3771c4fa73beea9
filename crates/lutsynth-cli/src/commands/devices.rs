//! Output device listing command.

use clap::Args;
use lutsynth_io::{default_output_device, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_output_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    let default_name = default_output_device().map(|d| d.name);

    println!("Output Devices");
    println!("==============\n");
    for device in &devices {
        let marker = if default_name.as_deref() == Some(device.name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!(
            "  [{}] {} ({} Hz){}",
            device.index, device.name, device.default_sample_rate, marker
        );
    }
    println!();
    println!("Tip: Use device index or partial name with --device:");
    println!("  lutsynth play --device 0");
    println!("  lutsynth play --device \"USB\"");

    Ok(())
}
