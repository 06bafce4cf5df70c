//! Stream acquisition.
//!
//! Turns a classified [`Source`] and a mode into a live [`Handle`] plus the
//! ownership flag. A failed acquisition hands the source back untouched so a
//! borrowed stream is never lost on the error path.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::error::FlexError;
use crate::file::FileStream;
use crate::input::{Source, SourceKind};
use crate::memory::MemoryStream;
use crate::mode::OpenMode;
use crate::stream::{Capabilities, StreamLike};

#[cfg(unix)]
use crate::descriptor::{descriptor_capabilities, DescriptorStream};

/// Settings that only some sources use.
#[derive(Debug, Clone, Default)]
pub struct AcquireOptions {
    /// Initial content of an in-memory buffer
    pub init: Option<Vec<u8>>,
    /// Close the OS descriptor together with its wrapper
    pub close_fd: bool,
}

/// A live stream.
///
/// `FlexStream` hands out shared access only, so a borrowed stream cannot be
/// closed through it:
///
/// ```compile_fail
/// use flexio::{FlexStream, StreamLike};
/// use std::io::Cursor;
///
/// let mut cursor = Cursor::new(Vec::new());
/// let mut stream = FlexStream::new(&mut cursor, "r+").unwrap();
/// stream.acquire().unwrap();
/// stream.handle_mut().unwrap().stream_mut().close().unwrap();
/// ```
pub enum Handle<'s> {
    File(FileStream),
    Memory(MemoryStream),
    #[cfg(unix)]
    Descriptor(DescriptorStream),
    Borrowed(&'s mut dyn StreamLike),
}

impl<'s> Handle<'s> {
    #[must_use]
    pub fn stream(&self) -> &dyn StreamLike {
        match self {
            Self::File(s) => s,
            Self::Memory(s) => s,
            #[cfg(unix)]
            Self::Descriptor(s) => s,
            Self::Borrowed(s) => &**s,
        }
    }

    pub(crate) fn stream_mut(&mut self) -> &mut dyn StreamLike {
        match self {
            Self::File(s) => s,
            Self::Memory(s) => s,
            #[cfg(unix)]
            Self::Descriptor(s) => s,
            Self::Borrowed(s) => &mut **s,
        }
    }

    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Borrowed(_))
    }

    /// The in-memory stream, if this handle is one.
    #[must_use]
    pub fn as_memory(&self) -> Option<&MemoryStream> {
        match self {
            Self::Memory(m) => Some(m),
            _ => None,
        }
    }
}

impl Read for Handle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_mut().read(buf)
    }
}

impl Write for Handle<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream_mut().flush()
    }
}

impl Seek for Handle<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.stream_mut().seek(pos)
    }
}

impl std::fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(s) => f.debug_tuple("File").field(s).finish(),
            Self::Memory(s) => f.debug_tuple("Memory").field(s).finish(),
            #[cfg(unix)]
            Self::Descriptor(s) => f.debug_tuple("Descriptor").field(s).finish(),
            Self::Borrowed(s) => f.debug_tuple("Borrowed").field(&s.name()).finish(),
        }
    }
}

/// Result of a successful acquisition.
#[derive(Debug)]
pub struct Acquired<'s> {
    pub handle: Handle<'s>,
    pub owned: bool,
    pub mode: OpenMode,
}

/// Acquisition failure. The source comes back with the error.
#[derive(Debug)]
pub struct Rejected<'s> {
    pub source: Source<'s>,
    pub error: FlexError,
}

/// The mode used when the caller did not name one.
///
/// Paths are read; fresh buffers are read/write; borrowed streams and
/// descriptors get whatever their capabilities allow.
#[must_use]
pub fn default_mode(source: &Source<'_>, opts: &AcquireOptions) -> String {
    let caps = match source {
        Source::Path(_) => return "r".to_string(),
        Source::Memory if opts.init.is_some() => return "r+".to_string(),
        Source::Memory => return "w+".to_string(),
        Source::External(stream) => stream.capabilities(),
        #[cfg(unix)]
        Source::Descriptor(fd) => descriptor_capabilities(*fd).unwrap_or_default(),
        #[cfg(not(unix))]
        Source::Descriptor(_) => Capabilities::default(),
    };
    let mut mode = match (caps.read, caps.write) {
        (false, true) => String::from("a"),
        _ => String::from("r"),
    };
    if caps.binary == Some(true) {
        mode.push('b');
    }
    if caps.read && caps.write {
        mode.push('+');
    }
    mode
}

/// Produce a live handle for `source`.
///
/// # Errors
/// - `InvalidMode` when `mode` does not parse
/// - `ResourceOpen` when a path cannot be opened or a descriptor wrapped
/// - `ModeMismatch` when a borrowed stream or descriptor cannot serve `mode`
pub fn acquire<'s>(
    source: Source<'s>,
    mode: &str,
    opts: &AcquireOptions,
) -> Result<Acquired<'s>, Rejected<'s>> {
    let parsed = match OpenMode::parse(mode) {
        Ok(parsed) => parsed,
        Err(reason) => {
            let error = FlexError::InvalidMode {
                mode: mode.to_string(),
                reason,
            };
            return Err(Rejected { source, error });
        }
    };
    let kind = source.kind();

    match source {
        Source::Path(path) => match FileStream::open(&path, parsed) {
            Ok(file) => {
                debug!(kind = %kind, path = %path.display(), mode = %parsed, "opened path");
                Ok(Acquired {
                    handle: Handle::File(file),
                    owned: true,
                    mode: parsed,
                })
            }
            Err(err) => {
                let error = FlexError::ResourceOpen {
                    kind,
                    target: path.display().to_string(),
                    mode: mode.to_string(),
                    source: err,
                };
                Err(Rejected {
                    source: Source::Path(path),
                    error,
                })
            }
        },

        Source::Memory => {
            let memory = MemoryStream::new(parsed, opts.init.as_deref());
            debug!(kind = %kind, mode = %parsed, "created in-memory buffer");
            Ok(Acquired {
                handle: Handle::Memory(memory),
                owned: true,
                mode: parsed,
            })
        }

        Source::External(stream) => {
            let available = if stream.is_closed() {
                Capabilities::default()
            } else {
                stream.capabilities()
            };
            if !available.satisfies(&parsed) {
                let error = FlexError::ModeMismatch {
                    kind,
                    requested: mode.to_string(),
                    available,
                };
                return Err(Rejected {
                    source: Source::External(stream),
                    error,
                });
            }
            debug!(kind = %kind, mode = %parsed, name = ?stream.name(), "borrowed stream");
            Ok(Acquired {
                handle: Handle::Borrowed(stream),
                owned: false,
                mode: parsed,
            })
        }

        Source::Descriptor(fd) => acquire_descriptor(fd, mode, parsed, opts),
    }
}

#[cfg(unix)]
fn acquire_descriptor<'s>(
    fd: core::ffi::c_int,
    mode: &str,
    parsed: OpenMode,
    opts: &AcquireOptions,
) -> Result<Acquired<'s>, Rejected<'s>> {
    let open_error = |source: io::Error| Rejected {
        source: Source::Descriptor(fd),
        error: FlexError::ResourceOpen {
            kind: SourceKind::Descriptor,
            target: fd.to_string(),
            mode: mode.to_string(),
            source,
        },
    };

    if fd < 0 {
        return Err(open_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("negative file descriptor {fd}"),
        )));
    }
    let available = descriptor_capabilities(fd).map_err(open_error)?;
    if !available.satisfies(&parsed) {
        return Err(Rejected {
            source: Source::Descriptor(fd),
            error: FlexError::ModeMismatch {
                kind: SourceKind::Descriptor,
                requested: mode.to_string(),
                available,
            },
        });
    }
    let stream = DescriptorStream::wrap(fd, parsed, opts.close_fd).map_err(open_error)?;
    debug!(kind = %SourceKind::Descriptor, fd = fd, mode = %parsed, close_fd = opts.close_fd, "wrapped descriptor");
    Ok(Acquired {
        handle: Handle::Descriptor(stream),
        owned: true,
        mode: parsed,
    })
}

#[cfg(not(unix))]
fn acquire_descriptor<'s>(
    fd: core::ffi::c_int,
    mode: &str,
    _parsed: OpenMode,
    _opts: &AcquireOptions,
) -> Result<Acquired<'s>, Rejected<'s>> {
    Err(Rejected {
        source: Source::Descriptor(fd),
        error: FlexError::ResourceOpen {
            kind: SourceKind::Descriptor,
            target: fd.to_string(),
            mode: mode.to_string(),
            source: io::Error::new(
                io::ErrorKind::Unsupported,
                "raw descriptors are only supported on unix",
            ),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_is_owned() {
        let acquired = acquire(Source::Memory, "w+", &AcquireOptions::default()).unwrap();
        assert!(acquired.owned);
        assert!(acquired.handle.as_memory().is_some());
    }

    #[test]
    fn test_invalid_mode_returns_source() {
        let rejected = acquire(Source::Memory, "rw", &AcquireOptions::default()).unwrap_err();
        assert!(matches!(rejected.error, FlexError::InvalidMode { .. }));
        assert!(matches!(rejected.source, Source::Memory));
    }

    #[test]
    fn test_borrowed_is_not_owned() {
        let mut cursor = Cursor::new(b"abc".to_vec());
        let acquired = acquire(
            Source::External(&mut cursor),
            "r+",
            &AcquireOptions::default(),
        )
        .unwrap();
        assert!(!acquired.owned);
        assert!(acquired.handle.is_borrowed());
    }

    #[test]
    fn test_default_modes() {
        let opts = AcquireOptions::default();
        assert_eq!(default_mode(&Source::Memory, &opts), "w+");
        assert_eq!(default_mode(&Source::Path("x".into()), &opts), "r");

        let seeded = AcquireOptions {
            init: Some(b"seed".to_vec()),
            close_fd: false,
        };
        assert_eq!(default_mode(&Source::Memory, &seeded), "r+");

        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(default_mode(&Source::External(&mut cursor), &opts), "r+");
    }
}
