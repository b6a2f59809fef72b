//! Audio input sources and the format they are bound to.

pub mod audio_source;
pub mod data_source;
pub mod error;
pub mod format;
pub mod memory_source;
pub mod mic_source;
pub mod pcm;
pub mod wav_sink;
pub mod wav_source;

pub use audio_source::AudioSource;
pub use data_source::DataSource;
pub use error::{FormatError, SourceError};
pub use format::{AudioFormat, FormatConstraints, SUPPORTED_BIT_DEPTHS};
pub use memory_source::MemorySource;
pub use mic_source::MicSource;
pub use wav_sink::{PumpOptions, WavSink};
pub use wav_source::WavFileSource;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use tracing::info;

use crate::config::{BackendKind, InputConfig};

/// Build the backend described by `input`, without opening it.
pub fn build_source(input: &InputConfig) -> Result<Box<dyn AudioSource>> {
    match input.backend {
        BackendKind::Device => {
            let format = input.format().context("Invalid input format in config")?;
            let source = MicSource::new(format, input.device.clone())?;
            Ok(Box::new(source))
        }
        BackendKind::File => {
            let path = input
                .path
                .as_ref()
                .context("The file backend needs `input.path` set")?;
            let source = WavFileSource::probe(path)
                .with_context(|| format!("Failed to probe {path:?}"))?;
            Ok(Box::new(source))
        }
    }
}

/// Build and open the configured source.
pub fn open_configured(input: &InputConfig) -> Result<Box<dyn AudioSource>> {
    let mut source = build_source(input)?;
    source.open().context("Failed to open audio source")?;
    info!("Audio source ready: {}", source.format());
    Ok(source)
}

/// Names of the capture devices on the default host.
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .context("Failed to enumerate input devices")?;
    Ok(devices.filter_map(|device| device.name().ok()).collect())
}
