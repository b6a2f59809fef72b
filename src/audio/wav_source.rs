//! WAV file playback as an audio source.
//!
//! Integer PCM only. Samples are decoded through `hound` and handed out as
//! little-endian bytes in the file's own format.

use hound::WavReader;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::audio_source::AudioSource;
use super::data_source::DataSource;
use super::error::SourceError;
use super::format::{AudioFormat, FormatConstraints};
use super::pcm;

pub struct WavFileSource {
    path: PathBuf,
    format: AudioFormat,
    reader: Option<WavReader<BufReader<File>>>,
    samples_read: u32,
}

impl WavFileSource {
    /// Create a source expecting `path` to hold PCM in `format`.
    ///
    /// The file is not touched until [`DataSource::open`], which fails if its
    /// header disagrees with `format`.
    pub fn new(path: impl Into<PathBuf>, format: AudioFormat) -> Result<Self, SourceError> {
        FormatConstraints::conventional().check(&format)?;
        Ok(Self {
            path: path.into(),
            format,
            reader: None,
            samples_read: 0,
        })
    }

    /// Create a source whose format is taken from the file header.
    pub fn probe(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let reader = WavReader::open(&path)?;
        let format = AudioFormat::try_from(reader.spec())?;
        debug!("Probed {:?}: {}", path, format);
        Self::new(path, format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total length of the file's PCM data, if open.
    pub fn duration(&self) -> Option<Duration> {
        let reader = self.reader.as_ref()?;
        let bytes = reader.len() as usize * self.format.bytes_per_sample();
        Some(self.format.duration_of(bytes))
    }
}

impl Clone for WavFileSource {
    /// The copy refers to the same file but holds its own, closed reader.
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            format: self.format,
            reader: None,
            samples_read: 0,
        }
    }
}

impl DataSource for WavFileSource {
    fn open(&mut self) -> Result<(), SourceError> {
        if self.reader.is_some() {
            return Err(SourceError::Init(format!(
                "{} is already open",
                self.path.display()
            )));
        }

        let reader = WavReader::open(&self.path)?;
        AudioFormat::try_from(reader.spec())?.ensure_matches(&self.format)?;

        info!("Opened WAV source {:?} ({})", self.path, self.format);
        self.reader = Some(reader);
        self.samples_read = 0;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn can_read(&mut self, _timeout: Duration) -> Result<bool, SourceError> {
        let reader = self.reader.as_ref().ok_or(SourceError::NotOpen)?;
        Ok(self.samples_read < reader.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let reader = self.reader.as_mut().ok_or(SourceError::NotOpen)?;

        let bits = self.format.bits_per_sample();
        let width = self.format.bytes_per_sample();
        let wanted = self.format.frames_in(buf.len()) * usize::from(self.format.channels());

        let total = reader.len();
        let mut written = 0;
        let mut failure = None;
        for sample in reader.samples::<i32>().take(wanted) {
            match sample {
                Ok(value) => {
                    pcm::encode_sample(value, bits, &mut buf[written..written + width]);
                    written += width;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        match failure {
            Some(e) => {
                // nothing past a sample that fails to decode can be trusted
                self.samples_read = total;
                Err(e.into())
            }
            None => {
                self.samples_read += (written / width) as u32;
                Ok(written)
            }
        }
    }

    fn close(&mut self) -> Result<(), SourceError> {
        if self.reader.take().is_some() {
            debug!("Closed WAV source {:?}", self.path);
        }
        Ok(())
    }
}

impl AudioSource for WavFileSource {
    fn format(&self) -> AudioFormat {
        self.format
    }
}
