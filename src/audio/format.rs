//! The audio format descriptor every source and consumer agrees on.
//!
//! An [`AudioFormat`] is fixed when a source is built. Fields are private and
//! there are no setters: the only way to get a different format is to build a
//! new value, which goes through validation again.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use super::error::FormatError;

/// Bit depths representable as whole-byte integer PCM.
pub const SUPPORTED_BIT_DEPTHS: [u16; 4] = [8, 16, 24, 32];

/// Sample rate, bit depth and channel count of a raw PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAudioFormat")]
pub struct AudioFormat {
    sample_rate: u32,
    bits_per_sample: u16,
    channels: u16,
}

#[derive(Deserialize)]
struct RawAudioFormat {
    sample_rate: u32,
    bits_per_sample: u16,
    channels: u16,
}

impl TryFrom<RawAudioFormat> for AudioFormat {
    type Error = FormatError;

    fn try_from(raw: RawAudioFormat) -> Result<Self, Self::Error> {
        AudioFormat::new(raw.sample_rate, raw.bits_per_sample, raw.channels)
    }
}

impl AudioFormat {
    /// 44.1 kHz, 16-bit, stereo.
    pub const CD_QUALITY: AudioFormat = AudioFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 2,
    };

    /// Build a format, rejecting values no backend could ever produce.
    ///
    /// Backend-specific limits (supported rates, bit depths, channel counts)
    /// are checked separately with [`FormatConstraints::check`].
    pub fn new(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Result<Self, FormatError> {
        if sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&bits_per_sample) {
            return Err(FormatError::UnsupportedBitDepth(bits_per_sample));
        }
        if channels == 0 {
            return Err(FormatError::NoChannels);
        }

        Ok(Self {
            sample_rate,
            bits_per_sample,
            channels,
        })
    }

    /// Samples per second, per channel.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Number of interleaved channels (1 = mono, 2 = stereo).
    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Bytes in one frame, i.e. one sample for every channel.
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channels)
    }

    /// Bytes per second of PCM in this format.
    pub fn byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * self.frame_size() as u64
    }

    /// Whole frames contained in `bytes`. Trailing partial frames are ignored.
    pub fn frames_in(&self, bytes: usize) -> usize {
        bytes / self.frame_size()
    }

    /// Playback time of `bytes` of PCM in this format.
    pub fn duration_of(&self, bytes: usize) -> Duration {
        let frames = self.frames_in(bytes) as u64;
        let rate = u64::from(self.sample_rate);
        let nanos = (frames % rate) * 1_000_000_000 / rate;
        Duration::new(frames / rate, nanos as u32)
    }

    /// Byte count of `duration` worth of PCM, rounded down to whole frames.
    ///
    /// Saturates at `usize::MAX` for durations too long to address.
    pub fn bytes_for(&self, duration: Duration) -> usize {
        let frames = duration.as_nanos() * u128::from(self.sample_rate) / 1_000_000_000;
        let bytes = frames.saturating_mul(self.frame_size() as u128);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }

    /// Fails with [`FormatError::Mismatch`] unless `self` equals `expected`.
    pub fn ensure_matches(&self, expected: &AudioFormat) -> Result<(), FormatError> {
        if self == expected {
            Ok(())
        } else {
            Err(FormatError::Mismatch {
                expected: *expected,
                actual: *self,
            })
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::CD_QUALITY
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz / {}-bit / {} ch",
            self.sample_rate, self.bits_per_sample, self.channels
        )
    }
}

impl TryFrom<hound::WavSpec> for AudioFormat {
    type Error = FormatError;

    fn try_from(spec: hound::WavSpec) -> Result<Self, Self::Error> {
        if spec.sample_format == hound::SampleFormat::Float {
            return Err(FormatError::FloatSamples);
        }
        AudioFormat::new(spec.sample_rate, spec.bits_per_sample, spec.channels)
    }
}

impl From<AudioFormat> for hound::WavSpec {
    fn from(format: AudioFormat) -> Self {
        hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

/// Formats a particular backend is able to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConstraints {
    pub sample_rates: RangeInclusive<u32>,
    pub bit_depths: &'static [u16],
    pub max_channels: u16,
}

impl FormatConstraints {
    /// 8-192 kHz, any whole-byte bit depth, up to 8 channels.
    pub fn conventional() -> Self {
        Self {
            sample_rates: 8_000..=192_000,
            bit_depths: &SUPPORTED_BIT_DEPTHS,
            max_channels: 8,
        }
    }

    pub fn check(&self, format: &AudioFormat) -> Result<(), FormatError> {
        if !self.sample_rates.contains(&format.sample_rate) {
            return Err(FormatError::SampleRateOutOfRange {
                rate: format.sample_rate,
                min: *self.sample_rates.start(),
                max: *self.sample_rates.end(),
            });
        }
        if !self.bit_depths.contains(&format.bits_per_sample) {
            return Err(FormatError::UnsupportedBitDepth(format.bits_per_sample));
        }
        if format.channels > self.max_channels {
            return Err(FormatError::TooManyChannels {
                channels: format.channels,
                max: self.max_channels,
            });
        }
        Ok(())
    }
}

impl Default for FormatConstraints {
    fn default() -> Self {
        Self::conventional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cd_quality() {
        let format = AudioFormat::default();
        assert_eq!(format.sample_rate(), 44_100);
        assert_eq!(format.bits_per_sample(), 16);
        assert_eq!(format.channels(), 2);
    }

    #[test]
    fn test_new_round_trips_valid_values() {
        for &rate in &[8_000, 22_050, 44_100, 48_000, 96_000, 192_000] {
            for &bits in &SUPPORTED_BIT_DEPTHS {
                for channels in 1..=8 {
                    let format = AudioFormat::new(rate, bits, channels).unwrap();
                    assert_eq!(format.sample_rate(), rate);
                    assert_eq!(format.bits_per_sample(), bits);
                    assert_eq!(format.channels(), channels);
                }
            }
        }
    }

    #[test]
    fn test_mono_24_bit_scenario() {
        let format = AudioFormat::new(48_000, 24, 1).unwrap();
        assert_eq!(format.sample_rate(), 48_000);
        assert_eq!(format.bits_per_sample(), 24);
        assert_eq!(format.channels(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_values() {
        assert_eq!(AudioFormat::new(0, 16, 2), Err(FormatError::ZeroSampleRate));
        assert_eq!(
            AudioFormat::new(44_100, 12, 2),
            Err(FormatError::UnsupportedBitDepth(12))
        );
        assert_eq!(
            AudioFormat::new(44_100, 0, 2),
            Err(FormatError::UnsupportedBitDepth(0))
        );
        assert_eq!(AudioFormat::new(44_100, 16, 0), Err(FormatError::NoChannels));
    }

    #[test]
    fn test_frame_arithmetic() {
        let format = AudioFormat::default();
        assert_eq!(format.bytes_per_sample(), 2);
        assert_eq!(format.frame_size(), 4);
        assert_eq!(format.byte_rate(), 176_400);
        assert_eq!(format.frames_in(10), 2);

        let mono24 = AudioFormat::new(48_000, 24, 1).unwrap();
        assert_eq!(mono24.frame_size(), 3);
        assert_eq!(mono24.byte_rate(), 144_000);
    }

    #[test]
    fn test_duration_conversions() {
        let format = AudioFormat::default();
        assert_eq!(format.duration_of(176_400), Duration::from_secs(1));
        assert_eq!(format.duration_of(88_200), Duration::from_millis(500));
        assert_eq!(format.bytes_for(Duration::from_millis(500)), 88_200);
        // 1 ms at 44.1 kHz is 44.1 frames, rounded down
        assert_eq!(format.bytes_for(Duration::from_millis(1)), 44 * 4);
    }

    #[test]
    fn test_bytes_for_saturates_on_huge_durations() {
        let format = AudioFormat::default();
        assert_eq!(
            format.bytes_for(Duration::from_secs(10u64.pow(15))),
            usize::MAX
        );
        assert_eq!(format.bytes_for(Duration::MAX), usize::MAX);
    }

    #[test]
    fn test_ensure_matches() {
        let a = AudioFormat::default();
        let b = AudioFormat::new(48_000, 16, 2).unwrap();
        assert!(a.ensure_matches(&AudioFormat::CD_QUALITY).is_ok());
        assert_eq!(
            b.ensure_matches(&a),
            Err(FormatError::Mismatch {
                expected: a,
                actual: b
            })
        );
    }

    #[test]
    fn test_copies_are_independent() {
        let a = AudioFormat::new(48_000, 24, 1).unwrap();
        let mut b = a;
        assert_eq!(a, b);
        b = AudioFormat::default();
        assert_eq!(a.sample_rate(), 48_000);
        assert_eq!(b.sample_rate(), 44_100);
    }

    #[test]
    fn test_wav_spec_conversion() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let format = AudioFormat::try_from(spec).unwrap();
        assert_eq!(format, AudioFormat::new(16_000, 16, 1).unwrap());
        assert_eq!(hound::WavSpec::from(format), spec);

        let float_spec = hound::WavSpec {
            sample_format: hound::SampleFormat::Float,
            bits_per_sample: 32,
            ..spec
        };
        assert_eq!(
            AudioFormat::try_from(float_spec),
            Err(FormatError::FloatSamples)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let format: AudioFormat =
            serde_json::from_str(r#"{"sample_rate":48000,"bits_per_sample":24,"channels":1}"#)
                .unwrap();
        assert_eq!(format, AudioFormat::new(48_000, 24, 1).unwrap());

        let err = serde_json::from_str::<AudioFormat>(
            r#"{"sample_rate":0,"bits_per_sample":16,"channels":2}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_conventional_constraints() {
        let constraints = FormatConstraints::conventional();
        assert!(constraints.check(&AudioFormat::default()).is_ok());
        assert_eq!(
            constraints.check(&AudioFormat::new(4_000, 16, 1).unwrap()),
            Err(FormatError::SampleRateOutOfRange {
                rate: 4_000,
                min: 8_000,
                max: 192_000
            })
        );
        assert_eq!(
            constraints.check(&AudioFormat::new(48_000, 16, 16).unwrap()),
            Err(FormatError::TooManyChannels {
                channels: 16,
                max: 8
            })
        );
    }

    #[test]
    fn test_narrow_constraints_reject_bit_depth() {
        let constraints = FormatConstraints {
            bit_depths: &[16],
            ..FormatConstraints::conventional()
        };
        assert_eq!(
            constraints.check(&AudioFormat::new(48_000, 24, 2).unwrap()),
            Err(FormatError::UnsupportedBitDepth(24))
        );
    }
}
