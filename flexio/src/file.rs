//! A filesystem stream opened from a path.
//!
//! # Example
//!
//! ```no_run
//! use std::io::Write;
//! use flexio::{FileStream, OpenMode};
//!
//! let mode = OpenMode::parse("w").unwrap();
//! let mut file = FileStream::open("example.txt", mode).unwrap();
//! file.write_all(b"Hello, world!").unwrap();
//! ```

#[cfg(unix)]
use core::ffi::c_int;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::memory::closed_error;
use crate::mode::OpenMode;
use crate::stream::{Capabilities, StreamLike};

pub struct FileStream {
    file: Option<File>,
    mode: OpenMode,
    name: Option<String>,
}

impl FileStream {
    /// Open `path` with the semantics of `mode`.
    ///
    /// # Errors
    /// Returns the error from the filesystem (not found, permission denied,
    /// already exists for `x` modes, ...).
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> io::Result<Self> {
        let path = path.as_ref();
        let file = mode.to_open_options().open(path)?;
        Ok(Self {
            file: Some(file),
            mode,
            name: Some(path.to_string_lossy().into_owned()),
        })
    }

    #[must_use]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    fn file_mut(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed_error)
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.mode.readable() {
            self.file_mut()?;
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not readable"));
        }
        self.file_mut()?.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.mode.writable() {
            self.file_mut()?;
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not writable"));
        }
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut()?.seek(pos)
    }
}

impl StreamLike for FileStream {
    fn capabilities(&self) -> Capabilities {
        if self.file.is_none() {
            return Capabilities::default();
        }
        Capabilities::from_mode(&self.mode, true)
    }

    /// Close the file, reporting the OS close error if there is one.
    /// Can be called multiple times.
    fn close(&mut self) -> io::Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush()?;
        close_file(file)
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    #[cfg(unix)]
    fn fileno(&self) -> io::Result<c_int> {
        use std::os::fd::AsRawFd;
        self.file.as_ref().map(AsRawFd::as_raw_fd).ok_or_else(closed_error)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        if !self.mode.writable() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not writable"));
        }
        self.file_mut()?.set_len(len)
    }
}

#[cfg(unix)]
fn close_file(file: File) -> io::Result<()> {
    use std::os::fd::IntoRawFd;
    crate::descriptor::close_raw(file.into_raw_fd())
}

#[cfg(not(unix))]
fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

impl std::fmt::Debug for FileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("name", &self.name)
            .field("mode", &self.mode.to_string())
            .field("closed", &self.file.is_none())
            .finish()
    }
}
