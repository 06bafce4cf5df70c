//! Streams over raw file descriptors.
//!
//! The wrapper belongs to whoever created it, but the descriptor itself
//! belongs to its original holder unless `close_fd` is set: closing a
//! wrapper with `close_fd == false` only detaches it.
//!
//! # Safety
//! The descriptor is turned into a `File` with `from_raw_fd`. The wrapper
//! never lets that `File` drop on its own: every exit path either closes the
//! descriptor explicitly or hands it back with `into_raw_fd`.

use core::ffi::c_int;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::{FromRawFd, IntoRawFd};

use crate::memory::closed_error;
use crate::mode::OpenMode;
use crate::stream::{Capabilities, StreamLike};

/// Close a raw descriptor, reporting the OS error on failure.
pub(crate) fn close_raw(fd: c_int) -> io::Result<()> {
    let result = unsafe { libc::close(fd) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Query the access mode of an open descriptor.
///
/// # Errors
/// Returns the OS error (`EBADF` for a descriptor that is not open).
pub fn descriptor_capabilities(fd: c_int) -> io::Result<Capabilities> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    let (read, write) = match flags & libc::O_ACCMODE {
        libc::O_RDONLY => (true, false),
        libc::O_WRONLY => (false, true),
        libc::O_RDWR => (true, true),
        _ => (false, false),
    };
    let seek = unsafe { libc::lseek(fd, 0, libc::SEEK_CUR) } >= 0;
    Ok(Capabilities {
        read,
        write,
        seek,
        binary: None,
    })
}

pub struct DescriptorStream {
    fd: c_int,
    file: Option<File>,
    mode: OpenMode,
    close_fd: bool,
}

impl DescriptorStream {
    /// Wrap `fd` for use with `mode`.
    ///
    /// # Errors
    /// - `InvalidInput` for negative descriptors
    /// - the OS error if `fd` is not an open descriptor
    pub fn wrap(fd: c_int, mode: OpenMode, close_fd: bool) -> io::Result<Self> {
        if fd < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("negative file descriptor {fd}"),
            ));
        }
        descriptor_capabilities(fd)?;
        let file = unsafe { File::from_raw_fd(fd) };
        Ok(Self {
            fd,
            file: Some(file),
            mode,
            close_fd,
        })
    }

    #[must_use]
    pub fn fd(&self) -> c_int {
        self.fd
    }

    #[must_use]
    pub fn closes_fd(&self) -> bool {
        self.close_fd
    }

    fn file_mut(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed_error)
    }
}

impl Read for DescriptorStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.mode.readable() {
            self.file_mut()?;
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not readable"));
        }
        self.file_mut()?.read(buf)
    }
}

impl Write for DescriptorStream {
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

impl Seek for DescriptorStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut()?.seek(pos)
    }
}

impl StreamLike for DescriptorStream {
    fn capabilities(&self) -> Capabilities {
        if self.file.is_none() {
            return Capabilities::default();
        }
        match descriptor_capabilities(self.fd) {
            Ok(caps) => caps,
            Err(_) => Capabilities::default(),
        }
    }

    /// Detach from the descriptor, closing it only if `close_fd` was set.
    /// Can be called multiple times.
    fn close(&mut self) -> io::Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let fd = file.into_raw_fd();
        if self.close_fd {
            close_raw(fd)?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn name(&self) -> Option<String> {
        Some(self.fd.to_string())
    }

    fn fileno(&self) -> io::Result<c_int> {
        if self.file.is_none() {
            return Err(closed_error());
        }
        Ok(self.fd)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        if !self.mode.writable() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not writable"));
        }
        self.file_mut()?.set_len(len)
    }
}

impl Drop for DescriptorStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for DescriptorStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorStream")
            .field("fd", &self.fd)
            .field("mode", &self.mode.to_string())
            .field("close_fd", &self.close_fd)
            .field("closed", &self.file.is_none())
            .finish()
    }
}
