//! The stream capability interface.
//!
//! Anything a caller wants to hand to `FlexStream` as an already-open stream
//! must implement [`StreamLike`]. The trait bundles the byte-level I/O traits
//! with an explicit description of what the stream can do, so that
//! compatibility with a requested mode is checked against declared
//! capabilities instead of being guessed.

use core::ffi::c_int;
use std::io::{self, Cursor, Read, Seek, Write};

use crate::mode::OpenMode;

/// What an open stream is able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
    pub seek: bool,
    /// `Some(true)` for byte streams, `Some(false)` for text streams,
    /// `None` when the stream does not say.
    pub binary: Option<bool>,
}

impl Capabilities {
    /// Capabilities implied by a mode.
    #[must_use]
    pub fn from_mode(mode: &OpenMode, seek: bool) -> Self {
        Self {
            read: mode.readable(),
            write: mode.writable(),
            seek,
            binary: Some(mode.is_binary()),
        }
    }

    /// A stream that can neither read nor write has no usable mode.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        !self.read && !self.write
    }

    /// Whether a stream with these capabilities can serve `mode`.
    #[must_use]
    pub fn satisfies(&self, mode: &OpenMode) -> bool {
        if self.is_ambiguous() {
            return false;
        }
        if mode.readable() && !self.read {
            return false;
        }
        if mode.writable() && !self.write {
            return false;
        }
        match self.binary {
            Some(binary) => binary == mode.is_binary(),
            None => true,
        }
    }
}

impl std::fmt::Display for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rw = match (self.read, self.write) {
            (true, true) => "read/write",
            (true, false) => "read-only",
            (false, true) => "write-only",
            (false, false) => "no read/write",
        };
        write!(f, "{rw}")?;
        match self.binary {
            Some(true) => write!(f, ", binary")?,
            Some(false) => write!(f, ", text")?,
            None => {}
        }
        if self.seek {
            write!(f, ", seekable")?;
        }
        Ok(())
    }
}

/// A live, operable stream.
pub trait StreamLike: Read + Write + Seek {
    /// What this stream can do right now.
    fn capabilities(&self) -> Capabilities;

    /// Close the stream. Closing an already closed stream is a no-op.
    ///
    /// # Errors
    /// Returns the error reported by the underlying resource.
    fn close(&mut self) -> io::Result<()>;

    fn is_closed(&self) -> bool;

    /// A human-readable name (path, descriptor number), if any.
    fn name(&self) -> Option<String> {
        None
    }

    /// Whether the stream is backed by memory rather than an OS resource.
    fn in_memory(&self) -> bool {
        false
    }

    /// The OS file descriptor behind the stream.
    ///
    /// # Errors
    /// Streams without one return `Unsupported`.
    fn fileno(&self) -> io::Result<c_int> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stream has no file descriptor",
        ))
    }

    /// Resize the stream to `len` bytes.
    ///
    /// # Errors
    /// Streams that cannot be resized return `Unsupported`.
    fn truncate(&mut self, _len: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stream does not support truncate",
        ))
    }
}

/// A plain byte cursor: readable, writable and seekable, never really closed.
impl StreamLike for Cursor<Vec<u8>> {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            read: true,
            write: true,
            seek: true,
            binary: None,
        }
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn in_memory(&self) -> bool {
        true
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length too large"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_satisfies_nothing() {
        let caps = Capabilities::default();
        assert!(caps.is_ambiguous());
        assert!(!caps.satisfies(&OpenMode::parse("r").unwrap()));
        assert!(!caps.satisfies(&OpenMode::parse("w").unwrap()));
    }

    #[test]
    fn test_read_only_rejects_write() {
        let caps = Capabilities {
            read: true,
            write: false,
            seek: true,
            binary: None,
        };
        assert!(caps.satisfies(&OpenMode::parse("r").unwrap()));
        assert!(caps.satisfies(&OpenMode::parse("rb").unwrap()));
        assert!(!caps.satisfies(&OpenMode::parse("r+").unwrap()));
        assert!(!caps.satisfies(&OpenMode::parse("a").unwrap()));
    }

    #[test]
    fn test_binary_must_agree_when_declared() {
        let caps = Capabilities::from_mode(&OpenMode::parse("rb").unwrap(), true);
        assert!(caps.satisfies(&OpenMode::parse("rb").unwrap()));
        assert!(!caps.satisfies(&OpenMode::parse("r").unwrap()));
    }

    #[test]
    fn test_display() {
        let caps = Capabilities::from_mode(&OpenMode::parse("w+").unwrap(), true);
        assert_eq!(caps.to_string(), "read/write, text, seekable");
    }
}
