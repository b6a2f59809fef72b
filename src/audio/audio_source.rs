//! Audio source abstraction shared by every capture backend.

use tracing::debug;

use super::data_source::DataSource;
use super::error::SourceError;
use super::format::AudioFormat;

/// Trait for audio capture sources (sound device, file playback, buffers).
///
/// Each backend owns an [`AudioFormat`] fixed at construction and yields raw
/// little-endian PCM in that format through [`DataSource::read`]. Consumers
/// bind to the format once, before any data flows, and rely on it never
/// changing for the lifetime of the source.
pub trait AudioSource: DataSource {
    /// The format of every byte this source produces.
    fn format(&self) -> AudioFormat;

    fn sample_rate(&self) -> u32 {
        self.format().sample_rate()
    }

    fn bits_per_sample(&self) -> u16 {
        self.format().bits_per_sample()
    }

    fn channels(&self) -> u16 {
        self.format().channels()
    }

    /// Replace this source with a copy of `other`.
    ///
    /// Resources held by `self` are released first. If that fails the error
    /// is returned and `self` keeps its previous format; otherwise the whole
    /// value, format included, is swapped for a clone of `other` in one step.
    fn assign_from(&mut self, other: &Self) -> Result<(), SourceError>
    where
        Self: Clone,
    {
        self.release()?;
        debug!("Reassigning audio source: {} -> {}", self.format(), other.format());
        *self = other.clone();
        Ok(())
    }
}
