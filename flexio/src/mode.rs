//! Open modes.
//!
//! A mode string follows the familiar `open()` grammar:
//!
//! ```text
//! mode ::= one of [rwax], optionally one of [bt], optionally '+'
//! ```
//!
//! Characters may appear in any order (`"w+b"` and `"wb+"` are the same mode).
//! The string is kept verbatim by `FlexStream` and only parsed when the stream
//! is acquired.

use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

/// The primary intent of a mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primary {
    /// `r`: read an existing resource
    Read,
    /// `w`: create or truncate, then write
    Write,
    /// `a`: create if missing, write at the end
    Append,
    /// `x`: create, fail if the resource exists
    Create,
}

impl Primary {
    fn as_char(self) -> char {
        match self {
            Self::Read => 'r',
            Self::Write => 'w',
            Self::Append => 'a',
            Self::Create => 'x',
        }
    }
}

/// A parsed, validated open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    primary: Primary,
    update: bool,
    binary: bool,
}

/// Why a mode string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    Empty,
    InvalidCharacter(char),
    Duplicate(char),
    /// More than one of `r`, `w`, `a`, `x`
    ConflictingPrimary,
    /// Both `b` and `t`
    ConflictingType,
    /// Only `b`, `t` or `+` was given
    MissingPrimary,
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "mode string is empty"),
            Self::InvalidCharacter(c) => write!(f, "invalid mode character {c:?}"),
            Self::Duplicate(c) => write!(f, "mode character {c:?} given twice"),
            Self::ConflictingPrimary => {
                write!(f, "must have exactly one of read/write/append/create mode")
            }
            Self::ConflictingType => write!(f, "can't have text and binary mode at once"),
            Self::MissingPrimary => {
                write!(f, "must have exactly one of read/write/append/create mode")
            }
        }
    }
}

impl std::error::Error for ModeError {}

impl OpenMode {
    /// Parse a mode string.
    ///
    /// # Errors
    /// Returns a [`ModeError`] describing the first problem found.
    pub fn parse(mode: &str) -> Result<Self, ModeError> {
        if mode.is_empty() {
            return Err(ModeError::Empty);
        }

        let mut primary = None;
        let mut kind = None;
        let mut update = false;

        for c in mode.chars() {
            match c {
                'r' | 'w' | 'a' | 'x' => {
                    let p = match c {
                        'r' => Primary::Read,
                        'w' => Primary::Write,
                        'a' => Primary::Append,
                        _ => Primary::Create,
                    };
                    match primary {
                        Some(seen) if seen == p => return Err(ModeError::Duplicate(c)),
                        Some(_) => return Err(ModeError::ConflictingPrimary),
                        None => primary = Some(p),
                    }
                }
                'b' | 't' => match kind {
                    Some(seen) if seen == c => return Err(ModeError::Duplicate(c)),
                    Some(_) => return Err(ModeError::ConflictingType),
                    None => kind = Some(c),
                },
                '+' => {
                    if update {
                        return Err(ModeError::Duplicate(c));
                    }
                    update = true;
                }
                other => return Err(ModeError::InvalidCharacter(other)),
            }
        }

        let primary = primary.ok_or(ModeError::MissingPrimary)?;
        Ok(Self {
            primary,
            update,
            binary: kind == Some('b'),
        })
    }

    #[must_use]
    pub fn primary(&self) -> Primary {
        self.primary
    }

    /// Whether `+` was given.
    #[must_use]
    pub fn is_update(&self) -> bool {
        self.update
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        !self.binary
    }

    #[must_use]
    pub fn readable(&self) -> bool {
        self.primary == Primary::Read || self.update
    }

    #[must_use]
    pub fn writable(&self) -> bool {
        self.primary != Primary::Read || self.update
    }

    #[must_use]
    pub fn appending(&self) -> bool {
        self.primary == Primary::Append
    }

    /// Whether existing content is discarded on open.
    #[must_use]
    pub fn truncates(&self) -> bool {
        matches!(self.primary, Primary::Write | Primary::Create)
    }

    #[must_use]
    pub fn creates(&self) -> bool {
        self.primary != Primary::Read
    }

    #[must_use]
    pub fn exclusive(&self) -> bool {
        self.primary == Primary::Create
    }

    /// Open options implementing this mode for a filesystem path.
    #[must_use]
    pub fn to_open_options(&self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        opts.read(self.readable());
        if self.appending() {
            opts.append(true);
        } else {
            opts.write(self.writable());
        }
        opts.truncate(self.primary == Primary::Write);
        if self.exclusive() {
            opts.create_new(true);
        } else {
            opts.create(self.creates());
        }
        opts
    }
}

impl FromStr for OpenMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical form: primary, then `b` for binary, then `+`.
impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary.as_char())?;
        if self.binary {
            write!(f, "b")?;
        }
        if self.update {
            write!(f, "+")?;
        }
        Ok(())
    }
}
