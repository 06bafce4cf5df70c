//! A scriptable in-memory stream for exercising `FlexStream` with a
//! caller-supplied handle.
//!
//! - capabilities are whatever the test declares, including none at all
//! - `failing_close()` makes every `close` return an error
//! - writing a buffer containing `WANT_ERROR` fails the write
//! - a [`CloseProbe`] taken before handing the stream over counts the
//!   `close` calls, so a test can check that a handle was closed exactly once
//!   (or never)

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flexio::{Capabilities, StreamLike};

pub const WANT_ERROR: u8 = 0x01;

/// Observes close calls on a [`MockStream`] from outside.
#[derive(Clone, Debug, Default)]
pub struct CloseProbe(Arc<AtomicUsize>);

impl CloseProbe {
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct MockStream {
    data: Vec<u8>,
    pos: usize,
    caps: Capabilities,
    name: Option<String>,
    fail_close: bool,
    closed: bool,
    probe: CloseProbe,
}

impl MockStream {
    /// A readable, writable, seekable stream holding `data`.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            caps: Capabilities {
                read: true,
                write: true,
                seek: true,
                binary: None,
            },
            name: None,
            fail_close: false,
            closed: false,
            probe: CloseProbe::default(),
        }
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.caps.read = true;
        self.caps.write = false;
        self
    }

    #[must_use]
    pub fn write_only(mut self) -> Self {
        self.caps.read = false;
        self.caps.write = true;
        self
    }

    /// Declare neither read nor write capability.
    #[must_use]
    pub fn without_capabilities(mut self) -> Self {
        self.caps.read = false;
        self.caps.write = false;
        self
    }

    #[must_use]
    pub fn binary(mut self, binary: Option<bool>) -> Self {
        self.caps.binary = binary;
        self
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    #[must_use]
    pub fn probe(&self) -> CloseProbe {
        self.probe.clone()
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn check_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::other("I/O operation on closed mock stream"));
        }
        Ok(())
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_open()?;
        if !self.caps.read {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not readable"));
        }
        let rest = self.data.get(self.pos..).unwrap_or_default();
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        if !self.caps.write {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not writable"));
        }
        if buf.contains(&WANT_ERROR) {
            return Err(io::Error::other("Failed to write: mocked error"));
        }
        let end = self.pos + buf.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_open()
    }
}

impl Seek for MockStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.check_open()?;
        let target = match pos {
            SeekFrom::Start(n) => i128::from(n),
            SeekFrom::End(n) => self.data.len() as i128 + i128::from(n),
            SeekFrom::Current(n) => self.pos as i128 + i128::from(n),
        };
        let target = usize::try_from(target)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid seek"))?;
        self.pos = target;
        Ok(target as u64)
    }
}

impl StreamLike for MockStream {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn close(&mut self) -> io::Result<()> {
        self.probe.0.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        if self.fail_close {
            return Err(io::Error::other("Failed to close: mocked error"));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn in_memory(&self) -> bool {
        true
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length too large"))?;
        self.data.resize(len, 0);
        Ok(())
    }
}
