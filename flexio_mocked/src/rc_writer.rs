//! A write-only stream that stores written data in memory for later inspection.
//!
//! Clones share the same output, so a test can keep one clone and hand
//! the other to a `FlexStream` as a borrowed stream.
//!
//! # Example
//! ```
//! use flexio_mocked::RcWriter;
//! use std::io::Write;
//!
//! let mut writer = RcWriter::new();
//! writer.write_all(b"Hello, world!").unwrap();
//! assert_eq!(writer.get_output(), "Hello, world!");
//! ```

use std::cell::{Cell, RefCell};
use std::io::{self, Result, Seek, SeekFrom, Write};
use std::rc::Rc;

use flexio::{Capabilities, StreamLike};

#[derive(Clone, Default)]
pub struct RcWriter {
    inner: Rc<RefCell<Vec<u8>>>,
    closed: Rc<Cell<bool>>,
}

impl Write for RcWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed.get() {
            return Err(io::Error::other("write to closed RcWriter"));
        }
        self.inner.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.borrow_mut().flush()
    }
}

impl io::Read for RcWriter {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "not readable"))
    }
}

impl Seek for RcWriter {
    fn seek(&mut self, _pos: SeekFrom) -> Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "not seekable"))
    }
}

impl StreamLike for RcWriter {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            read: false,
            write: !self.closed.get(),
            seek: false,
            binary: Some(true),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closed.set(true);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl RcWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_output(&self) -> String {
        String::from_utf8_lossy(&self.inner.borrow()).to_string()
    }
}
