//! CLI handler for recording the configured source to disk.

use crate::audio::{self, WavSink};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tracing::info;

use super::args::RecordCliArgs;

/// Turn `--seconds` into a recording limit, rejecting values no `Duration` can hold.
fn recording_limit(seconds: Option<f64>) -> Result<Option<Duration>> {
    let Some(secs) = seconds else {
        return Ok(None);
    };
    if secs <= 0.0 {
        return Err(anyhow!("--seconds must be positive, got {secs}"));
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|e| anyhow!("--seconds {secs} is not a usable duration: {e}"))
}

pub fn handle_record_command(config: &Config, args: RecordCliArgs) -> Result<()> {
    let limit = recording_limit(args.seconds)?;

    let mut source = audio::open_configured(&config.input)?;
    let mut sink = WavSink::create(&args.output, source.format())
        .with_context(|| format!("Failed to create {:?}", args.output))?;

    info!("Recording {} to {:?}", source.format(), args.output);
    let result = sink.pump(source.as_mut(), config.capture.pump_options(limit));

    // close the source even if pumping failed
    source.close().context("Failed to close audio source")?;
    let copied = result.context("Recording failed")?;
    sink.finalize()?;

    let format = source.format();
    println!(
        "Recorded {:.2}s of {} to {}",
        format.duration_of(copied as usize).as_secs_f64(),
        format,
        args.output.display()
    );
    Ok(())
}
