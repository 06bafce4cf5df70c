//! `FlexStream`: one stream type over paths, borrowed streams, in-memory
//! buffers and raw descriptors.
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Seek, SeekFrom, Write};
//! use flexio::FlexStream;
//!
//! let mut stream = FlexStream::memory("w+").unwrap();
//! let text = stream
//!     .with(|s| {
//!         s.write_all(b"hello")?;
//!         s.seek(SeekFrom::Start(0))?;
//!         let mut text = String::new();
//!         s.read_to_string(&mut text)?;
//!         Ok(text)
//!     })
//!     .unwrap();
//! assert_eq!(text, "hello");
//! assert!(stream.is_released());
//! ```

use core::ffi::c_int;
use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::{debug, trace, warn};

use crate::acquire::{acquire, default_mode, AcquireOptions, Handle, Rejected};
use crate::buffer::Buffer;
use crate::error::{FlexError, Lifecycle};
use crate::error_mapping::io_kind_to_embedded;
use crate::input::{classify, Input, Source, SourceKind};
use crate::memory::closed_error;
use crate::mode::OpenMode;
use crate::scope::Scope;
use crate::stream::Capabilities;

/// Builder for [`FlexStream`].
#[derive(Debug)]
pub struct FlexBuilder<'s> {
    input: Input<'s>,
    mode: Option<String>,
    opts: AcquireOptions,
}

impl<'s> FlexBuilder<'s> {
    /// Mode string, validated at acquisition time.
    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Initial content for an in-memory buffer. Ignored by other sources.
    #[must_use]
    pub fn init(mut self, init: impl Into<Vec<u8>>) -> Self {
        self.opts.init = Some(init.into());
        self
    }

    /// Close the OS descriptor on release. Only descriptor sources use it.
    #[must_use]
    pub fn close_fd(mut self, close_fd: bool) -> Self {
        self.opts.close_fd = close_fd;
        self
    }

    /// Classify the input.
    ///
    /// # Errors
    /// Returns `UnsupportedInputKind` if the input is none of the recognised
    /// shapes.
    pub fn build(self) -> Result<FlexStream<'s>, FlexError> {
        let source = classify(self.input)?;
        let kind = source.kind();
        let name = source.name();
        let in_memory = match &source {
            Source::Memory => true,
            Source::External(stream) => stream.in_memory(),
            _ => false,
        };
        trace!(kind = %kind, name = ?name, mode = ?self.mode, "classified input");

        Ok(FlexStream {
            kind,
            name,
            in_memory,
            source: Some(source),
            mode: self.mode,
            opts: self.opts,
            handle: None,
            owned: None,
            resolved: None,
            state: Lifecycle::Fresh,
        })
    }
}

/// A stream that may own or borrow its underlying handle.
///
/// `'s` is the lifetime of a borrowed stream; owned sources produce
/// `FlexStream<'static>`.
pub struct FlexStream<'s> {
    kind: SourceKind,
    name: Option<String>,
    in_memory: bool,
    source: Option<Source<'s>>,
    mode: Option<String>,
    opts: AcquireOptions,
    handle: Option<Handle<'s>>,
    owned: Option<bool>,
    resolved: Option<OpenMode>,
    state: Lifecycle,
}

impl<'s> FlexStream<'s> {
    pub fn builder(input: impl Into<Input<'s>>) -> FlexBuilder<'s> {
        FlexBuilder {
            input: input.into(),
            mode: None,
            opts: AcquireOptions::default(),
        }
    }

    /// Classify `input` and remember `mode` for acquisition.
    ///
    /// # Errors
    /// Returns `UnsupportedInputKind` if the input is none of the recognised
    /// shapes.
    pub fn new(input: impl Into<Input<'s>>, mode: &str) -> Result<Self, FlexError> {
        Self::builder(input).mode(mode).build()
    }

    /// A stream over a fresh in-memory buffer.
    ///
    /// # Errors
    /// Never fails at construction; the mode is checked on acquisition.
    pub fn memory(mode: &str) -> Result<Self, FlexError> {
        Self::new(Input::Absent, mode)
    }

    /// Acquire the live handle.
    ///
    /// # Errors
    /// - `AlreadyAcquired` unless the stream is fresh
    /// - `InvalidMode`, `ResourceOpen` or `ModeMismatch` from the acquirer;
    ///   the stream then stays fresh with no handle set
    pub fn acquire(&mut self) -> Result<(), FlexError> {
        if self.state != Lifecycle::Fresh {
            return Err(FlexError::AlreadyAcquired { state: self.state });
        }
        let Some(source) = self.source.take() else {
            return Err(FlexError::AlreadyAcquired { state: self.state });
        };
        let mode = match &self.mode {
            Some(mode) => mode.clone(),
            None => default_mode(&source, &self.opts),
        };

        match acquire(source, &mode, &self.opts) {
            Ok(acquired) => {
                self.owned = Some(acquired.owned);
                self.resolved = Some(acquired.mode);
                self.state = Lifecycle::Acquired;
                trace!(kind = %self.kind, owned = acquired.owned, mode = %acquired.mode, "acquired");
                self.handle = Some(acquired.handle);
                Ok(())
            }
            Err(Rejected { source, error }) => {
                self.source = Some(source);
                debug!(kind = %self.kind, mode = %mode, error = %error, "acquisition failed");
                Err(error)
            }
        }
    }

    /// Enter a scope. The handle is acquired if the stream is still fresh
    /// and released when the returned guard goes away, however that happens.
    ///
    /// # Errors
    /// - `AlreadyAcquired` if the stream was already released
    /// - any acquisition error
    pub fn scope(&mut self) -> Result<Scope<'_, 's>, FlexError> {
        match self.state {
            Lifecycle::Fresh => {
                self.acquire()?;
            }
            Lifecycle::Acquired => {}
            Lifecycle::Released => {
                return Err(FlexError::AlreadyAcquired {
                    state: Lifecycle::Released,
                })
            }
        }
        Ok(Scope::new(self))
    }

    /// Run `f` inside a scope.
    ///
    /// # Errors
    /// - acquisition errors
    /// - `Usage` if `f` fails, with any release failure attached to it
    /// - `Release` if only the release fails
    pub fn with<T, F>(&mut self, f: F) -> Result<T, FlexError>
    where
        F: FnOnce(&mut FlexStream<'s>) -> io::Result<T>,
    {
        let mut scope = self.scope()?;
        let outcome = f(&mut *scope);
        let released = scope.finish();
        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release)) => Err(release),
            (Err(source), released) => Err(FlexError::Usage {
                source,
                release: released.err().map(Box::new),
            }),
        }
    }

    /// Release the handle: close it if owned, leave it open if borrowed.
    ///
    /// Can be called multiple times; only the first call on an acquired
    /// stream does anything. A fresh stream is simply marked released.
    ///
    /// # Errors
    /// Returns `Release` if closing an owned handle fails. The stream is
    /// released regardless.
    pub fn release(&mut self) -> Result<(), FlexError> {
        let previous = std::mem::replace(&mut self.state, Lifecycle::Released);
        self.source = None;
        let Some(mut handle) = self.handle.take() else {
            trace!(kind = %self.kind, state = %previous, "release: nothing to release");
            return Ok(());
        };

        if self.owned == Some(true) {
            trace!(kind = %self.kind, "release: closing owned handle");
            handle
                .stream_mut()
                .close()
                .map_err(|source| FlexError::Release {
                    kind: self.kind,
                    source,
                })?;
        } else {
            trace!(kind = %self.kind, "release: leaving borrowed handle open");
        }
        Ok(())
    }

    /// Same as [`release`](Self::release).
    ///
    /// # Errors
    /// See [`release`](Self::release).
    pub fn close(&mut self) -> Result<(), FlexError> {
        self.release()
    }

    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    #[must_use]
    pub fn is_acquired(&self) -> bool {
        self.state == Lifecycle::Acquired
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.state == Lifecycle::Released
    }

    /// Whether the handle was created here. `None` until acquisition.
    #[must_use]
    pub fn owned(&self) -> Option<bool> {
        self.owned
    }

    #[must_use]
    pub fn source_kind(&self) -> SourceKind {
        self.kind
    }

    /// The mode string given by the caller, if any.
    #[must_use]
    pub fn requested_mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    /// The parsed mode, known once acquired.
    #[must_use]
    pub fn mode(&self) -> Option<OpenMode> {
        self.resolved
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn in_memory(&self) -> bool {
        self.in_memory
    }

    #[must_use]
    pub fn closes_fd(&self) -> bool {
        self.opts.close_fd
    }

    #[must_use]
    pub fn handle(&self) -> Option<&Handle<'s>> {
        self.handle.as_ref()
    }

    /// A handle on the in-memory buffer while acquired.
    #[must_use]
    pub fn buffer(&self) -> Option<Buffer> {
        self.handle
            .as_ref()
            .and_then(Handle::as_memory)
            .map(crate::memory::MemoryStream::buffer)
    }

    /// The whole in-memory content while acquired.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.buffer().map(|b| b.to_vec())
    }

    /// Capabilities of the live handle; nothing when not acquired.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        match &self.handle {
            Some(handle) if !handle.stream().is_closed() => handle.stream().capabilities(),
            _ => Capabilities::default(),
        }
    }

    #[must_use]
    pub fn readable(&self) -> bool {
        self.capabilities().read && self.resolved.is_some_and(|m| m.readable())
    }

    #[must_use]
    pub fn writable(&self) -> bool {
        self.capabilities().write && self.resolved.is_some_and(|m| m.writable())
    }

    #[must_use]
    pub fn seekable(&self) -> bool {
        self.capabilities().seek
    }

    /// Whether I/O through this stream is no longer possible.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.stream().is_closed(),
            None => self.state == Lifecycle::Released,
        }
    }

    /// The live handle, acquiring on first use.
    fn live(&mut self) -> io::Result<&mut Handle<'s>> {
        if self.state == Lifecycle::Fresh {
            self.acquire()?;
        }
        match self.state {
            Lifecycle::Acquired => self.handle.as_mut().ok_or_else(closed_error),
            _ => Err(closed_error()),
        }
    }

    fn is_text(&self) -> bool {
        self.resolved.is_some_and(|m| m.is_text())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Current position.
    ///
    /// # Errors
    /// Returns the error from the underlying stream.
    pub fn tell(&mut self) -> io::Result<u64> {
        self.live()?.seek(SeekFrom::Current(0))
    }

    /// Resize the stream to `len` bytes.
    ///
    /// # Errors
    /// Returns the error from the underlying stream.
    pub fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.live()?.stream_mut().truncate(len)
    }

    /// Read the rest of the stream as UTF-8 text.
    ///
    /// # Errors
    /// `InvalidData` if the bytes are not UTF-8; otherwise the read error.
    pub fn read_text(&mut self) -> io::Result<String> {
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write `text` completely. Returns its length in bytes.
    ///
    /// # Errors
    /// Returns the write error.
    pub fn write_text(&mut self, text: &str) -> io::Result<usize> {
        self.write_all(text.as_bytes())?;
        Ok(text.len())
    }

    /// Read one line, including its `\n`, appending it to `line`.
    /// Returns the number of bytes read; zero at end of stream.
    ///
    /// # Errors
    /// `InvalidData` if the line is not UTF-8; otherwise the read error.
    pub fn read_line(&mut self, line: &mut String) -> io::Result<usize> {
        self.read_line_max(line, usize::MAX)
    }

    /// Like [`read_line`](Self::read_line), but stop after `limit`
    /// characters even if no `\n` was seen.
    ///
    /// # Errors
    /// `InvalidData` if the line is not UTF-8; otherwise the read error.
    pub fn read_line_max(&mut self, line: &mut String, limit: usize) -> io::Result<usize> {
        let mut bytes = Vec::new();
        let mut chars = 0;
        while chars < limit {
            let Some(lead) = self.read_byte()? else {
                break;
            };
            bytes.push(lead);
            for _ in 1..utf8_width(lead) {
                match self.read_byte()? {
                    Some(b) => bytes.push(b),
                    None => break,
                }
            }
            chars += 1;
            if lead == b'\n' {
                break;
            }
        }
        let text =
            std::str::from_utf8(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        line.push_str(text);
        Ok(bytes.len())
    }

    /// All remaining lines, each with its `\n`.
    ///
    /// # Errors
    /// The first error from [`read_line`](Self::read_line).
    pub fn read_lines(&mut self) -> io::Result<Vec<String>> {
        self.lines().collect()
    }

    /// Write every item of `lines`. No separators are added.
    ///
    /// # Errors
    /// Returns the first write error.
    pub fn write_lines<I>(&mut self, lines: I) -> io::Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for line in lines {
            self.write_text(line.as_ref())?;
        }
        Ok(())
    }

    /// The OS descriptor of the live handle.
    ///
    /// # Errors
    /// `Unsupported` for in-memory buffers and streams without a descriptor.
    pub fn fileno(&mut self) -> io::Result<c_int> {
        self.live()?.stream().fileno()
    }

    /// Whether the stream is connected to a terminal. Streams without a
    /// descriptor never are.
    ///
    /// # Errors
    /// Fails if the stream cannot be acquired or was released.
    pub fn isatty(&mut self) -> io::Result<bool> {
        match self.fileno() {
            Ok(fd) => Ok(is_terminal(fd)),
            Err(e) if e.kind() == io::ErrorKind::Unsupported => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Iterate over the remaining lines. Each line keeps its `\n`.
    pub fn lines(&mut self) -> Lines<'_, 's> {
        Lines { stream: self }
    }
}

/// Byte length of a UTF-8 sequence from its first byte. Invalid lead bytes
/// count as one and fail validation later.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

#[cfg(unix)]
fn is_terminal(fd: c_int) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

#[cfg(not(unix))]
fn is_terminal(_fd: c_int) -> bool {
    false
}

/// Iterator returned by [`FlexStream::lines`].
pub struct Lines<'a, 's> {
    stream: &'a mut FlexStream<'s>,
}

impl Iterator for Lines<'_, '_> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        match self.stream.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(Ok(line)),
            Err(e) => Some(Err(e)),
        }
    }
}

impl Read for FlexStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.live()?.read(buf)
    }
}

impl Write for FlexStream<'_> {
    /// In text mode every call must carry whole UTF-8 text, which is then
    /// written completely.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.live()?;
        if !self.is_text() {
            return self.live()?.write(buf);
        }
        std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.live()?.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.live()?.flush()
    }
}

impl Seek for FlexStream<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.live()?.seek(pos)
    }
}

impl embedded_io::ErrorType for FlexStream<'_> {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for FlexStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(self, buf).map_err(|e| io_kind_to_embedded(e.kind()))
    }
}

impl embedded_io::Write for FlexStream<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Write::write(self, buf).map_err(|e| io_kind_to_embedded(e.kind()))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(self).map_err(|e| io_kind_to_embedded(e.kind()))
    }
}

impl embedded_io::Seek for FlexStream<'_> {
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        let pos = match pos {
            embedded_io::SeekFrom::Start(n) => SeekFrom::Start(n),
            embedded_io::SeekFrom::End(n) => SeekFrom::End(n),
            embedded_io::SeekFrom::Current(n) => SeekFrom::Current(n),
        };
        Seek::seek(self, pos).map_err(|e| io_kind_to_embedded(e.kind()))
    }
}

impl Drop for FlexStream<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(kind = %self.kind, error = %e, "release on drop failed");
        }
    }
}

impl std::fmt::Debug for FlexStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlexStream")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("owned", &self.owned)
            .finish()
    }
}
