//! Sound-device capture via cpal.
//!
//! The device delivers `f32` frames on its own callback thread. They are
//! converted to 16-bit PCM and queued until the owner reads them.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::audio_source::AudioSource;
use super::data_source::DataSource;
use super::error::SourceError;
use super::format::{AudioFormat, FormatConstraints};
use super::pcm;

/// Seconds of audio kept while nobody reads; older bytes are dropped first.
const MAX_BUFFERED_SECS: u64 = 10;

pub struct MicSource {
    device_name: Option<String>,
    format: AudioFormat,
    queue: Arc<SampleQueue>,
    stream: Option<cpal::Stream>,
}

impl MicSource {
    /// Create a capture source on the default input device, or on the device
    /// called `device_name`. Nothing is opened until [`DataSource::open`].
    pub fn new(format: AudioFormat, device_name: Option<String>) -> Result<Self, SourceError> {
        Self::constraints().check(&format)?;
        Ok(Self {
            device_name,
            format,
            queue: Arc::new(SampleQueue::new(format)),
            stream: None,
        })
    }

    /// Formats this backend can capture in.
    pub fn constraints() -> FormatConstraints {
        FormatConstraints {
            bit_depths: &[16],
            ..FormatConstraints::conventional()
        }
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    fn find_device(&self) -> Result<cpal::Device, SourceError> {
        let host = cpal::default_host();
        match &self.device_name {
            None => host
                .default_input_device()
                .ok_or_else(|| SourceError::Init("No input device available".to_string())),
            Some(wanted) => host
                .input_devices()
                .map_err(|e| SourceError::Device(e.to_string()))?
                .find(|device| device.name().map(|n| &n == wanted).unwrap_or(false))
                .ok_or_else(|| SourceError::Init(format!("Input device not found: {wanted}"))),
        }
    }
}

impl Clone for MicSource {
    /// The copy targets the same device but has its own queue and no stream.
    fn clone(&self) -> Self {
        Self {
            device_name: self.device_name.clone(),
            format: self.format,
            queue: Arc::new(SampleQueue::new(self.format)),
            stream: None,
        }
    }
}

impl DataSource for MicSource {
    fn open(&mut self) -> Result<(), SourceError> {
        if self.stream.is_some() {
            return Err(SourceError::Init("Mic source already open".to_string()));
        }

        let device = self.find_device()?;
        info!(
            "Mic source using device: {} ({})",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            self.format
        );

        let config = cpal::StreamConfig {
            channels: self.format.channels(),
            sample_rate: cpal::SampleRate(self.format.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };

        self.queue.clear()?;
        let queue = Arc::clone(&self.queue);
        let err_fn = |err| error!("Mic stream error: {}", err);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| queue.push(data),
                err_fn,
                None,
            )
            .map_err(|e| SourceError::Init(e.to_string()))?;

        stream
            .play()
            .map_err(|e| SourceError::Init(e.to_string()))?;
        self.stream = Some(stream);

        info!("Mic capture started");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn can_read(&mut self, timeout: Duration) -> Result<bool, SourceError> {
        if self.stream.is_none() {
            return Err(SourceError::NotOpen);
        }
        self.queue.wait(timeout)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if self.stream.is_none() {
            return Err(SourceError::NotOpen);
        }
        self.queue.pop_frames(buf)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        if self.stream.is_none() {
            return Ok(());
        }

        // fail before the stream goes away so an error leaves the source intact
        let dropped = self.queue.clear()?;
        if let Some(stream) = self.stream.take() {
            debug!("Stopping mic stream");
            drop(stream);
        }

        if dropped > 0 {
            warn!("Discarded {} unread bytes of mic audio", dropped);
        }
        info!("Mic capture stopped");
        Ok(())
    }
}

impl AudioSource for MicSource {
    fn format(&self) -> AudioFormat {
        self.format
    }
}

impl Drop for MicSource {
    fn drop(&mut self) {
        if self.stream.is_some() {
            debug!("Dropping open MicSource, cleaning up");
            let _ = self.close();
        }
    }
}

/// 16-bit PCM handed from the device callback to the reader.
struct SampleQueue {
    bytes: Mutex<VecDeque<u8>>,
    ready: Condvar,
    frame_size: usize,
    capacity: usize,
}

impl SampleQueue {
    fn new(format: AudioFormat) -> Self {
        Self {
            bytes: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            frame_size: format.frame_size(),
            capacity: (format.byte_rate() * MAX_BUFFERED_SECS) as usize,
        }
    }

    /// Called on the device thread; never blocks on the reader for long.
    fn push(&self, samples: &[f32]) {
        let Ok(mut bytes) = self.bytes.lock() else {
            return;
        };
        for &sample in samples {
            bytes.extend(pcm::f32_to_i16(sample).to_le_bytes());
        }

        let overflow = bytes.len().saturating_sub(self.capacity);
        if overflow > 0 {
            // keep the stream frame-aligned when trimming
            let trim = overflow.div_ceil(self.frame_size) * self.frame_size;
            let len = bytes.len();
            bytes.drain(..trim.min(len));
        }
        drop(bytes);
        self.ready.notify_all();
    }

    fn wait(&self, timeout: Duration) -> Result<bool, SourceError> {
        let bytes = self.lock()?;
        let (bytes, _) = self
            .ready
            .wait_timeout_while(bytes, timeout, |b| b.len() < self.frame_size)
            .map_err(|_| SourceError::Device("Sample queue lock poisoned".to_string()))?;
        Ok(bytes.len() >= self.frame_size)
    }

    fn pop_frames(&self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let mut bytes = self.lock()?;
        let len = (buf.len().min(bytes.len()) / self.frame_size) * self.frame_size;
        for (slot, byte) in buf.iter_mut().zip(bytes.drain(..len)) {
            *slot = byte;
        }
        Ok(len)
    }

    /// Empty the queue, returning how many bytes were discarded.
    fn clear(&self) -> Result<usize, SourceError> {
        let mut bytes = self.lock()?;
        let dropped = bytes.len();
        bytes.clear();
        bytes.shrink_to_fit();
        Ok(dropped)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, VecDeque<u8>>, SourceError> {
        self.bytes
            .lock()
            .map_err(|_| SourceError::Device("Sample queue lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::error::FormatError;
    use std::thread;

    fn stereo_16() -> AudioFormat {
        AudioFormat::new(48_000, 16, 2).unwrap()
    }

    #[test]
    fn test_only_16_bit_capture_supported() {
        let format = AudioFormat::new(48_000, 24, 2).unwrap();
        assert!(matches!(
            MicSource::new(format, None),
            Err(SourceError::Format(FormatError::UnsupportedBitDepth(24)))
        ));
    }

    #[test]
    fn test_new_does_not_open_device() {
        let source = MicSource::new(AudioFormat::default(), Some("USB Mic".to_string())).unwrap();
        assert!(!source.is_open());
        assert_eq!(source.format(), AudioFormat::default());
        assert_eq!(source.device_name(), Some("USB Mic"));
    }

    #[test]
    fn test_read_requires_open() {
        let mut source = MicSource::new(stereo_16(), None).unwrap();
        let mut buf = [0u8; 8];
        assert!(matches!(source.read(&mut buf), Err(SourceError::NotOpen)));
        assert!(matches!(
            source.can_read(Duration::ZERO),
            Err(SourceError::NotOpen)
        ));
        assert!(source.close().is_ok());
    }

    #[test]
    fn test_clone_keeps_format_and_device() {
        let a = MicSource::new(stereo_16(), Some("Line In".to_string())).unwrap();
        let b = a.clone();
        assert_eq!(b.format(), a.format());
        assert_eq!(b.device_name(), a.device_name());
        assert!(!Arc::ptr_eq(&a.queue, &b.queue));
    }

    #[test]
    fn test_poisoned_queue_fails_clear_without_losing_data() {
        let source = MicSource::new(stereo_16(), None).unwrap();
        source.queue.push(&[0.5, 0.5]);

        let queue = Arc::clone(&source.queue);
        let _ = thread::spawn(move || {
            let _guard = queue.bytes.lock().unwrap();
            panic!("device callback panicked");
        })
        .join();

        assert!(matches!(source.queue.clear(), Err(SourceError::Device(_))));
        let bytes = source.queue.bytes.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(bytes.len(), 4);
    }

    #[test]
    fn test_queue_converts_and_returns_whole_frames() {
        let queue = SampleQueue::new(stereo_16());
        queue.push(&[0.0, 1.0, -1.0]);

        let mut buf = [0u8; 16];
        // three samples make one stereo frame plus a half
        assert_eq!(queue.pop_frames(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[0x00, 0x00, 0xFF, 0x7F]);
        assert_eq!(queue.clear().unwrap(), 2);
    }

    #[test]
    fn test_queue_wait_times_out_when_empty() {
        let queue = SampleQueue::new(stereo_16());
        assert!(!queue.wait(Duration::from_millis(10)).unwrap());
    }

    #[test]
    fn test_queue_wait_wakes_on_push() {
        let queue = Arc::new(SampleQueue::new(stereo_16()));
        let producer = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.push(&[0.5, 0.5]);
        });

        assert!(queue.wait(Duration::from_secs(5)).unwrap());
        handle.join().unwrap();
    }

    #[test]
    fn test_queue_drops_oldest_on_overflow() {
        let format = AudioFormat::new(8_000, 16, 1).unwrap();
        let queue = SampleQueue::new(format);
        let ten_seconds = vec![0.0f32; 80_000];
        queue.push(&ten_seconds);
        queue.push(&[1.0]);

        let mut buf = vec![0u8; 200_000];
        let len = queue.pop_frames(&mut buf).unwrap();
        assert_eq!(len, 160_000);
        assert_eq!(&buf[len - 2..len], &i16::MAX.to_le_bytes());
    }
}
