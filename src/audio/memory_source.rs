//! In-memory PCM source, used by tests and harnesses.

use std::time::Duration;

use super::audio_source::AudioSource;
use super::data_source::DataSource;
use super::error::SourceError;
use super::format::AudioFormat;

/// Serves a fixed buffer of PCM bytes in whole frames.
#[derive(Debug)]
pub struct MemorySource {
    format: AudioFormat,
    data: Vec<u8>,
    position: usize,
    open: bool,
}

impl MemorySource {
    /// Trailing bytes that do not make up a whole frame are dropped.
    pub fn new(format: AudioFormat, mut data: Vec<u8>) -> Self {
        let whole = format.frames_in(data.len()) * format.frame_size();
        data.truncate(whole);
        Self {
            format,
            data,
            position: 0,
            open: false,
        }
    }

    /// `duration` worth of digital silence.
    pub fn silence(format: AudioFormat, duration: Duration) -> Self {
        // 8-bit PCM is unsigned, so silence sits at the midpoint
        let fill = if format.bits_per_sample() == 8 { 0x80 } else { 0 };
        Self::new(format, vec![fill; format.bytes_for(duration)])
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl Clone for MemorySource {
    /// The copy shares no state with `self` and starts closed, at the beginning.
    fn clone(&self) -> Self {
        Self {
            format: self.format,
            data: self.data.clone(),
            position: 0,
            open: false,
        }
    }
}

impl DataSource for MemorySource {
    fn open(&mut self) -> Result<(), SourceError> {
        self.position = 0;
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn can_read(&mut self, _timeout: Duration) -> Result<bool, SourceError> {
        if !self.open {
            return Err(SourceError::NotOpen);
        }
        Ok(self.remaining() > 0)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if !self.open {
            return Err(SourceError::NotOpen);
        }

        let frame = self.format.frame_size();
        let len = (buf.len().min(self.remaining()) / frame) * frame;
        buf[..len].copy_from_slice(&self.data[self.position..self.position + len]);
        self.position += len;
        Ok(len)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.open = false;
        Ok(())
    }
}

impl AudioSource for MemorySource {
    fn format(&self) -> AudioFormat {
        self.format
    }
}
