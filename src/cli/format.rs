//! CLI handlers for inspecting audio formats.
//!
//! This module handles terminal presentation. Format logic lives in `audio`.

use crate::audio::{AudioFormat, AudioSource, DataSource, WavFileSource};
use crate::config::Config;
use anyhow::{Context, Result};
use serde::Serialize;

use super::args::{FormatCliArgs, ProbeCliArgs};

/// What `format` and `probe` print.
#[derive(Debug, Serialize)]
pub struct FormatReport {
    #[serde(flatten)]
    pub format: AudioFormat,
    pub frame_size: usize,
    pub byte_rate: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl FormatReport {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            frame_size: format.frame_size(),
            byte_rate: format.byte_rate(),
            duration_seconds: None,
        }
    }

    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        println!("Sample rate:     {} Hz", self.format.sample_rate());
        println!("Bits per sample: {}", self.format.bits_per_sample());
        println!("Channels:        {}", self.format.channels());
        println!("Frame size:      {} bytes", self.frame_size);
        println!("Byte rate:       {} bytes/s", self.byte_rate);
        if let Some(secs) = self.duration_seconds {
            println!("Duration:        {secs:.2}s");
        }
        Ok(())
    }
}

pub fn handle_format_command(config: &Config, args: FormatCliArgs) -> Result<()> {
    let format = config
        .input
        .format()
        .context("Invalid input format in config")?;
    FormatReport::new(format).print(args.json)
}

pub fn handle_probe_command(args: ProbeCliArgs) -> Result<()> {
    let mut source = WavFileSource::probe(&args.file)
        .with_context(|| format!("Failed to probe {:?}", args.file))?;

    let mut report = FormatReport::new(source.format());
    source.open()?;
    report.duration_seconds = source.duration().map(|d| d.as_secs_f64());
    source.close()?;

    report.print(args.json)
}
