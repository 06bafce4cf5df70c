//! Error types for stream resolution and lifecycle.
//!
//! Every variant carries enough context (source kind, mode, underlying cause)
//! to tell caller misuse apart from an environment failure; see
//! [`FlexError::is_misuse`].

use std::fmt;
use std::io;

use crate::input::SourceKind;
use crate::mode::ModeError;
use crate::stream::Capabilities;

/// Lifecycle of a `FlexStream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, nothing acquired yet
    Fresh,
    /// A live handle is present
    Acquired,
    /// The handle is gone; the stream cannot be reused
    Released,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Acquired => write!(f, "acquired"),
            Self::Released => write!(f, "released"),
        }
    }
}

#[derive(Debug)]
pub enum FlexError {
    /// The constructor argument is none of the recognised input shapes
    UnsupportedInputKind { kind: String },

    /// The mode string could not be parsed
    InvalidMode { mode: String, reason: ModeError },

    /// Opening a path or wrapping a descriptor failed
    ResourceOpen {
        kind: SourceKind,
        target: String,
        mode: String,
        source: io::Error,
    },

    /// A supplied stream or descriptor cannot serve the requested mode
    ModeMismatch {
        kind: SourceKind,
        requested: String,
        available: Capabilities,
    },

    /// Acquisition requested on a stream that is not fresh
    AlreadyAcquired { state: Lifecycle },

    /// Closing an owned handle failed; the stream is released regardless
    Release { kind: SourceKind, source: io::Error },

    /// The caller's own scoped usage failed. A release failure that happened
    /// afterwards is attached, never substituted.
    Usage {
        source: io::Error,
        release: Option<Box<FlexError>>,
    },
}

impl FlexError {
    /// Whether the error comes from how the API was used rather than from
    /// the environment.
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedInputKind { .. }
                | Self::InvalidMode { .. }
                | Self::ModeMismatch { .. }
                | Self::AlreadyAcquired { .. }
        )
    }

    /// The closest `io::ErrorKind`.
    #[must_use]
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::UnsupportedInputKind { .. } | Self::InvalidMode { .. } => {
                io::ErrorKind::InvalidInput
            }
            Self::ModeMismatch { .. } => io::ErrorKind::Unsupported,
            Self::AlreadyAcquired { .. } => io::ErrorKind::Other,
            Self::ResourceOpen { source, .. }
            | Self::Release { source, .. }
            | Self::Usage { source, .. } => source.kind(),
        }
    }

    /// The release failure attached to a usage error, if any.
    #[must_use]
    pub fn release_error(&self) -> Option<&FlexError> {
        match self {
            Self::Usage { release, .. } => release.as_deref(),
            Self::Release { .. } => Some(self),
            _ => None,
        }
    }
}

impl fmt::Display for FlexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedInputKind { kind } => {
                write!(f, "unsupported input kind: {kind}")
            }
            Self::InvalidMode { mode, reason } => {
                write!(f, "invalid mode {mode:?}: {reason}")
            }
            Self::ResourceOpen {
                kind,
                target,
                mode,
                source,
            } => write!(f, "failed to open {kind} {target} with mode {mode:?}: {source}"),
            Self::ModeMismatch {
                kind,
                requested,
                available,
            } => write!(
                f,
                "{kind} stream cannot serve mode {requested:?}: it is {available}"
            ),
            Self::AlreadyAcquired { state } => {
                write!(f, "stream can only be acquired once, it is already {state}")
            }
            Self::Release { kind, source } => {
                write!(f, "failed to close {kind} stream: {source}")
            }
            Self::Usage { source, release } => {
                write!(f, "stream usage failed: {source}")?;
                if let Some(release) = release {
                    write!(f, " (while releasing: {release})")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for FlexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidMode { reason, .. } => Some(reason),
            Self::ResourceOpen { source, .. }
            | Self::Release { source, .. }
            | Self::Usage { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FlexError> for io::Error {
    fn from(err: FlexError) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}
