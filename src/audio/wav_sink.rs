//! Writes the PCM of an audio source into a WAV file.
//!
//! The sink binds to one [`AudioFormat`] when created. Every source pumped into
//! it is checked against that format before any bytes move.

use hound::WavWriter;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::audio_source::AudioSource;
use super::error::SourceError;
use super::format::AudioFormat;
use super::pcm;

/// How [`WavSink::pump`] pulls data from a source.
#[derive(Debug, Clone, Copy)]
pub struct PumpOptions {
    /// Size of each read, rounded down to whole frames.
    pub chunk_bytes: usize,
    /// How long to wait for data before treating the source as finished.
    pub read_timeout: Duration,
    /// Stop after this much audio. `None` runs until the source ends.
    pub limit: Option<Duration>,
}

impl Default for PumpOptions {
    fn default() -> Self {
        Self {
            chunk_bytes: 4096,
            read_timeout: Duration::from_millis(500),
            limit: None,
        }
    }
}

pub struct WavSink {
    path: PathBuf,
    format: AudioFormat,
    writer: WavWriter<BufWriter<File>>,
    bytes_written: u64,
}

impl WavSink {
    pub fn create(path: impl Into<PathBuf>, format: AudioFormat) -> Result<Self, SourceError> {
        let path = path.into();
        let writer = WavWriter::create(&path, format.into())?;
        debug!("Created WAV sink {:?} ({})", path, format);
        Ok(Self {
            path,
            format,
            writer,
            bytes_written: 0,
        })
    }

    /// The format this sink was bound to.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Append PCM bytes in the sink's format. Partial trailing samples are ignored.
    pub fn write(&mut self, data: &[u8]) -> Result<(), SourceError> {
        let bits = self.format.bits_per_sample();
        let mut samples = data.chunks_exact(self.format.bytes_per_sample());
        for sample in &mut samples {
            self.writer.write_sample(pcm::decode_sample(sample, bits))?;
        }
        self.bytes_written += (data.len() - samples.remainder().len()) as u64;
        Ok(())
    }

    /// Copy PCM from an open `source` until it runs dry or `options.limit`
    /// is reached. Returns the number of bytes copied.
    pub fn pump<S>(&mut self, source: &mut S, options: PumpOptions) -> Result<u64, SourceError>
    where
        S: AudioSource + ?Sized,
    {
        source.format().ensure_matches(&self.format)?;
        if !source.is_open() {
            return Err(SourceError::NotOpen);
        }

        let frame = self.format.frame_size();
        let chunk = (options.chunk_bytes / frame).max(1) * frame;
        let max_bytes = options.limit.map(|d| self.format.bytes_for(d) as u64);
        let mut buf = vec![0u8; chunk];
        let mut copied = 0u64;

        loop {
            let want = match max_bytes {
                Some(max) if copied >= max => break,
                Some(max) => chunk.min((max - copied) as usize),
                None => chunk,
            };

            if !source.can_read(options.read_timeout)? {
                debug!("Source has no more data after {} bytes", copied);
                break;
            }

            let n = source.read(&mut buf[..want])?;
            if n == 0 {
                break;
            }
            self.write(&buf[..n])?;
            copied += n as u64;
        }

        Ok(copied)
    }

    /// Flush the WAV header and close the file. Returns total bytes written.
    pub fn finalize(self) -> Result<u64, SourceError> {
        self.writer.finalize()?;
        info!(
            "Wrote {} ({:.2}s) to {:?}",
            self.format,
            self.format
                .duration_of(self.bytes_written as usize)
                .as_secs_f64(),
            self.path
        );
        Ok(self.bytes_written)
    }
}
