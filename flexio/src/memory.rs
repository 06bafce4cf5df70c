//! In-memory stream.
//!
//! Created by the acquirer when no source is given. The stream honours the
//! read/write intent of its mode: reading a write-only memory stream fails
//! the same way reading a write-only file does.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::buffer::Buffer;
use crate::mode::OpenMode;
use crate::stream::{Capabilities, StreamLike};

pub struct MemoryStream {
    buffer: Buffer,
    pos: u64,
    mode: OpenMode,
    closed: bool,
}

impl MemoryStream {
    /// Create a stream for `mode`, optionally pre-filled with `init`.
    ///
    /// Truncating modes (`w`, `x`) start empty and ignore `init`; append
    /// modes start positioned at the end of `init`.
    #[must_use]
    pub fn new(mode: OpenMode, init: Option<&[u8]>) -> Self {
        let data = match init {
            Some(init) if !mode.truncates() => init.to_vec(),
            _ => Vec::new(),
        };
        let pos = if mode.appending() { data.len() as u64 } else { 0 };
        Self {
            buffer: Buffer::from_vec(data),
            pos,
            mode,
            closed: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// A handle on the backing buffer. It outlives the stream.
    #[must_use]
    pub fn buffer(&self) -> Buffer {
        self.buffer.clone()
    }

    /// The whole content regardless of the current position.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    fn check_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }
        Ok(())
    }

    fn position(&self) -> io::Result<usize> {
        usize::try_from(self.pos)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "position too large"))
    }
}

pub(crate) fn closed_error() -> io::Error {
    io::Error::other("I/O operation on closed stream")
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_open()?;
        if !self.mode.readable() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not readable"));
        }
        let n = self.buffer.read_at(self.position()?, buf);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        if !self.mode.writable() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not writable"));
        }
        if self.mode.appending() {
            self.pos = self.buffer.len() as u64;
        }
        self.buffer.write_at(self.position()?, buf)?;
        self.pos += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_open()
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.check_open()?;
        let (base, offset) = match pos {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(n) => (self.buffer.len() as u64, n),
            SeekFrom::Current(n) => (self.pos, n),
        };
        match base.checked_add_signed(offset) {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

impl StreamLike for MemoryStream {
    fn capabilities(&self) -> Capabilities {
        Capabilities::from_mode(&self.mode, true)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn in_memory(&self) -> bool {
        true
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.check_open()?;
        if !self.mode.writable() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not writable"));
        }
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length too large"))?;
        self.buffer.truncate(len);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStream")
            .field("len", &self.buffer.len())
            .field("pos", &self.pos)
            .field("mode", &self.mode.to_string())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(s: &str) -> OpenMode {
        OpenMode::parse(s).unwrap()
    }

    #[test]
    fn test_write_seek_read() {
        let mut m = MemoryStream::new(mode("w+"), None);
        m.write_all(b"hello").unwrap();
        m.seek(SeekFrom::Start(0)).unwrap();
        let mut s = String::new();
        m.read_to_string(&mut s).unwrap();
        assert_eq!(s, "hello");
    }

    #[test]
    fn test_truncating_mode_ignores_init() {
        let m = MemoryStream::new(mode("w"), Some(b"old"));
        assert!(m.contents().is_empty());
    }

    #[test]
    fn test_read_mode_sees_init() {
        let mut m = MemoryStream::new(mode("r"), Some(b"seed"));
        let mut out = Vec::new();
        m.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"seed");
        assert_eq!(
            m.write(b"x").unwrap_err().kind(),
            io::ErrorKind::Unsupported
        );
    }

    #[test]
    fn test_append_writes_at_end() {
        let mut m = MemoryStream::new(mode("a+"), Some(b"one"));
        m.seek(SeekFrom::Start(0)).unwrap();
        m.write_all(b"two").unwrap();
        assert_eq!(m.contents(), b"onetwo");
    }

    #[test]
    fn test_write_only_cannot_read() {
        let mut m = MemoryStream::new(mode("w"), None);
        let mut buf = [0u8; 4];
        assert_eq!(
            m.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::Unsupported
        );
    }

    #[test]
    fn test_negative_seek_fails() {
        let mut m = MemoryStream::new(mode("w+"), None);
        assert!(m.seek(SeekFrom::Current(-1)).is_err());
    }

    #[test]
    fn test_write_at_huge_position_fails() {
        let mut m = MemoryStream::new(mode("wb"), None);
        m.seek(SeekFrom::Start(u64::MAX)).unwrap();
        assert_eq!(
            m.write(b"x").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert!(m.contents().is_empty());
    }

    #[test]
    fn test_closed_stream_rejects_io() {
        let mut m = MemoryStream::new(mode("w+"), None);
        m.close().unwrap();
        assert!(m.is_closed());
        assert!(m.write(b"x").is_err());
        // closing twice is fine
        m.close().unwrap();
    }

    #[test]
    fn test_buffer_outlives_stream() {
        let mut m = MemoryStream::new(mode("wb"), None);
        let buffer = m.buffer();
        m.write_all(b"kept").unwrap();
        drop(m);
        assert_eq!(buffer.to_vec(), b"kept");
    }
}
