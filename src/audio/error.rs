//! Error types for audio formats and sources (thiserror-based).

use thiserror::Error;

use super::format::AudioFormat;

/// A sample format that cannot be used, either at all or by a given backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Sample rate must be greater than zero")]
    ZeroSampleRate,

    #[error("Unsupported bit depth: {0} bits per sample")]
    UnsupportedBitDepth(u16),

    #[error("Channel count must be at least one")]
    NoChannels,

    #[error("Sample rate {rate} Hz outside supported range {min}-{max} Hz")]
    SampleRateOutOfRange { rate: u32, min: u32, max: u32 },

    #[error("{channels} channels requested, at most {max} supported")]
    TooManyChannels { channels: u16, max: u16 },

    /// A consumer bound to one format was handed data in another.
    #[error("Format mismatch: expected {expected}, got {actual}")]
    Mismatch {
        expected: AudioFormat,
        actual: AudioFormat,
    },

    #[error("Floating-point samples are not supported, integer PCM only")]
    FloatSamples,
}

/// Audio source lifecycle and I/O errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source could not be set up (device, file, stream).
    #[error("Failed to initialize audio source: {0}")]
    Init(String),

    /// Resources held by the source could not be released.
    #[error("Failed to release audio source: {0}")]
    Teardown(String),

    #[error("Audio source is not open")]
    NotOpen,

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display() {
        let err = FormatError::SampleRateOutOfRange {
            rate: 4000,
            min: 8000,
            max: 192_000,
        };
        assert_eq!(
            err.to_string(),
            "Sample rate 4000 Hz outside supported range 8000-192000 Hz"
        );
    }

    #[test]
    fn test_mismatch_display_names_both_formats() {
        let err = FormatError::Mismatch {
            expected: AudioFormat::default(),
            actual: AudioFormat::new(48_000, 24, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Format mismatch: expected 44100 Hz / 16-bit / 2 ch, got 48000 Hz / 24-bit / 1 ch"
        );
    }

    #[test]
    fn test_format_error_converts_into_source_error() {
        let err: SourceError = FormatError::NoChannels.into();
        assert!(matches!(err, SourceError::Format(FormatError::NoChannels)));
        assert_eq!(err.to_string(), "Channel count must be at least one");
    }
}
