//! Picks the output device at startup.

use anyhow::{Context, Result};
use cpal::{
    traits::{DeviceTrait, HostTrait},
    Device,
};

use crate::misc::Similarity;

/// Finds the output device for the `--output-device` flag.
/// `default` uses the host default, anything else picks the device whose name has the highest
/// string similarity (dice coefficient) to the given name.
pub fn output_device(wanted: &str) -> Result<Device> {
    let host = cpal::default_host();
    let wanted = wanted.to_lowercase();

    if wanted == "default" {
        return host
            .default_output_device()
            .context("No default output device");
    }

    let devices = host
        .output_devices()
        .context("Failed to list output devices")?;
    let (score, device) = devices
        .filter_map(|dev| {
            let name = dev.name().ok()?.to_lowercase();
            Some((name.similarity(&wanted), dev))
        })
        .reduce(|a, b| if a.0 >= b.0 { a } else { b })
        .context("No output device found")?;

    log::debug!("Matched output device with similarity {score:.2}");
    Ok(device)
}
