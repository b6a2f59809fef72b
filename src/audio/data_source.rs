//! Generic openable, readable, closable stream of bytes.

use std::time::Duration;

use super::error::SourceError;

/// Trait for anything that yields raw data in chunks (devices, files, buffers).
///
/// Sources start closed. `open` acquires the underlying resource, `read`
/// pulls the next chunk, `close` gives the resource back. A closed source may
/// be opened again.
pub trait DataSource {
    /// Acquire the underlying resource and start producing data.
    fn open(&mut self) -> Result<(), SourceError>;

    fn is_open(&self) -> bool;

    /// Wait up to `timeout` for data to become readable.
    ///
    /// Returns `Ok(false)` if nothing arrived in time or the stream has ended.
    fn can_read(&mut self, timeout: Duration) -> Result<bool, SourceError>;

    /// Read the next chunk into `buf`, returning the number of bytes written.
    ///
    /// `Ok(0)` means end of stream for finite sources, or no data right now
    /// for live ones.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;

    /// Stop producing data and release the underlying resource.
    fn close(&mut self) -> Result<(), SourceError>;

    /// Teardown hook run before this source is overwritten by another.
    fn release(&mut self) -> Result<(), SourceError> {
        if self.is_open() {
            self.close()?;
        }
        Ok(())
    }
}
