use crate::audio::{AudioFormat, FormatError, PumpOptions};
use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub capture: CaptureConfig,
}

/// Which kind of backend produces the audio.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A sound card input (microphone, line in).
    #[default]
    Device,
    /// A WAV file played back as if it were live.
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub backend: BackendKind,
    /// Input device name. Uses the system default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// WAV file for the `file` backend. Its header decides the format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl Default for InputConfig {
    fn default() -> Self {
        let format = AudioFormat::default();
        Self {
            backend: BackendKind::Device,
            device: None,
            path: None,
            sample_rate: format.sample_rate(),
            bits_per_sample: format.bits_per_sample(),
            channels: format.channels(),
        }
    }
}

impl InputConfig {
    /// The configured capture format, validated.
    pub fn format(&self) -> Result<AudioFormat, FormatError> {
        AudioFormat::new(self.sample_rate, self.bits_per_sample, self.channels)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Bytes requested from the source per read
    pub chunk_bytes: usize,
    /// How long a read may wait for data before the source counts as finished
    pub read_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: 4096,
            read_timeout_ms: 500,
        }
    }
}

impl CaptureConfig {
    pub fn pump_options(&self, limit: Option<Duration>) -> PumpOptions {
        PumpOptions {
            chunk_bytes: self.chunk_bytes,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            limit,
        }
    }
}

impl Config {
    /// Load the user config, writing the defaults out first if there is none.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
