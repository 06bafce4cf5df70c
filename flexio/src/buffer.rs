//! Shared byte buffer backing in-memory streams.

use parking_lot::{Mutex, MutexGuard};
use std::io;
use std::ops::Deref;
use std::sync::Arc;

/// Read-only guard to buffer contents
///
/// Holds the lock and provides read-only access to the underlying data.
/// The lock is released when the guard is dropped.
pub struct BufferReadGuard<'a>(MutexGuard<'a, Vec<u8>>);

impl Deref for BufferReadGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for BufferReadGuard<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Byte buffer with internal locking
///
/// Backed by `Arc<Mutex<Vec<u8>>>`; clones share the same data, so the
/// contents of an in-memory stream can still be inspected through a clone
/// taken before the stream was released.
///
/// # Example
///
/// ```
/// use flexio::Buffer;
///
/// let buffer = Buffer::new();
/// buffer.write_at(0, b"hello").unwrap();
///
/// let guard = buffer.lock();
/// assert_eq!(&*guard, b"hello");
/// ```
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self(Arc::new(Mutex::new(data)))
    }

    /// Write `data` at byte offset `pos`, growing the buffer as needed.
    /// A gap between the current end and `pos` is filled with zeros.
    ///
    /// # Errors
    /// `InvalidInput` if the end of the write does not fit in `usize`.
    pub fn write_at(&self, pos: usize, data: &[u8]) -> io::Result<()> {
        let end = pos.checked_add(data.len()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "write position out of range")
        })?;
        let mut buf = self.0.lock();
        if buf.len() < end {
            buf.resize(end, 0);
        }
        buf[pos..end].copy_from_slice(data);
        Ok(())
    }

    /// Copy bytes starting at `pos` into `out`. Returns the count copied,
    /// zero at or past the end.
    #[must_use]
    pub fn read_at(&self, pos: usize, out: &mut [u8]) -> usize {
        let buf = self.0.lock();
        if pos >= buf.len() {
            return 0;
        }
        let n = out.len().min(buf.len() - pos);
        out[..n].copy_from_slice(&buf[pos..pos + n]);
        n
    }

    /// Resize to exactly `len` bytes, zero-filling when growing.
    pub fn truncate(&self, len: usize) {
        self.0.lock().resize(len, 0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    /// Lock the buffer for reading.
    ///
    /// The lock is held until the guard is dropped.
    #[must_use]
    pub fn lock(&self) -> BufferReadGuard<'_> {
        BufferReadGuard(self.0.lock())
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("len", &self.len()).finish()
    }
}
