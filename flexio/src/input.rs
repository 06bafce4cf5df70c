//! Input classification.
//!
//! `Input` is whatever the caller handed to the constructor. [`classify`]
//! resolves it once into a [`Source`], checking the recognised shapes in a
//! fixed order:
//!
//! 1. absent → in-memory buffer
//! 2. a stream (anything implementing [`StreamLike`]) → borrowed stream
//! 3. a string or path → path
//! 4. an integer → raw descriptor
//!
//! Anything else is rejected with `UnsupportedInputKind`. Stream values are
//! converted into [`Input::Stream`] before any textual interpretation, so a
//! stream type that also happens to be path-like is never opened as a path.

use core::ffi::c_int;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::FlexError;
use crate::stream::StreamLike;

/// A constructor argument before classification.
pub enum Input<'s> {
    /// No source: create an in-memory buffer
    Absent,
    Stream(&'s mut dyn StreamLike),
    Path(PathBuf),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// A value of some other shape, described by name
    Other(String),
}

impl<'s> Input<'s> {
    /// A borrowed stream given as a trait object.
    pub fn stream(stream: &'s mut dyn StreamLike) -> Self {
        Self::Stream(stream)
    }

    fn describe(&self) -> String {
        match self {
            Self::Absent => "absent".to_string(),
            Self::Stream(_) => "stream".to_string(),
            Self::Path(p) => format!("path {}", p.display()),
            Self::Integer(n) => format!("integer {n}"),
            Self::Float(x) => format!("float {x}"),
            Self::Bool(b) => format!("bool {b}"),
            Self::Other(what) => what.clone(),
        }
    }
}

impl fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Input({})", self.describe())
    }
}

impl From<()> for Input<'_> {
    fn from((): ()) -> Self {
        Self::Absent
    }
}

impl<'s, T: Into<Input<'s>>> From<Option<T>> for Input<'s> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl<'s, S: StreamLike + 's> From<&'s mut S> for Input<'s> {
    fn from(stream: &'s mut S) -> Self {
        Self::Stream(stream)
    }
}

impl From<&str> for Input<'_> {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for Input<'_> {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Input<'_> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Input<'_> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&PathBuf> for Input<'_> {
    fn from(path: &PathBuf) -> Self {
        Self::Path(path.clone())
    }
}

impl From<&OsStr> for Input<'_> {
    fn from(path: &OsStr) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<OsString> for Input<'_> {
    fn from(path: OsString) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Raw bytes name a path on unix.
#[cfg(unix)]
impl From<&[u8]> for Input<'_> {
    fn from(path: &[u8]) -> Self {
        use std::os::unix::ffi::OsStrExt;
        Self::Path(PathBuf::from(OsStr::from_bytes(path)))
    }
}

impl From<i32> for Input<'_> {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for Input<'_> {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<i64> for Input<'_> {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u64> for Input<'_> {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| Self::Other(format!("integer {n}")), Self::Integer)
    }
}

impl From<usize> for Input<'_> {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or_else(|_| Self::Other(format!("integer {n}")), Self::Integer)
    }
}

impl From<f64> for Input<'_> {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<f32> for Input<'_> {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<bool> for Input<'_> {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Values read from configuration: `null` is absent, strings are paths,
/// integers are descriptors.
impl From<serde_json::Value> for Input<'_> {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Absent,
            Value::String(s) => Self::Path(PathBuf::from(s)),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::Integer(i),
                (None, Some(x)) if n.is_f64() => Self::Float(x),
                _ => Self::Other(format!("number {n}")),
            },
            Value::Array(_) => Self::Other("array".to_string()),
            Value::Object(_) => Self::Other("object".to_string()),
        }
    }
}

/// The four kinds of source a `FlexStream` can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Path,
    External,
    Memory,
    Descriptor,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::External => write!(f, "external"),
            Self::Memory => write!(f, "in-memory"),
            Self::Descriptor => write!(f, "descriptor"),
        }
    }
}

/// A classified source, resolved once and never re-checked.
pub enum Source<'s> {
    Path(PathBuf),
    External(&'s mut dyn StreamLike),
    Memory,
    Descriptor(c_int),
}

impl Source<'_> {
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Path(_) => SourceKind::Path,
            Self::External(_) => SourceKind::External,
            Self::Memory => SourceKind::Memory,
            Self::Descriptor(_) => SourceKind::Descriptor,
        }
    }

    /// Display name: the path, the descriptor number or the stream's own name.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        match self {
            Self::Path(p) => Some(p.to_string_lossy().into_owned()),
            Self::External(s) => s.name(),
            Self::Memory => None,
            Self::Descriptor(fd) => Some(fd.to_string()),
        }
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::External(s) => f.debug_tuple("External").field(&s.name()).finish(),
            Self::Memory => write!(f, "Memory"),
            Self::Descriptor(fd) => f.debug_tuple("Descriptor").field(fd).finish(),
        }
    }
}

/// Resolve a constructor argument into a [`Source`].
///
/// # Errors
/// Returns `UnsupportedInputKind` for floats, booleans, integers outside the
/// descriptor range, and any other shape.
pub fn classify(input: Input<'_>) -> Result<Source<'_>, FlexError> {
    match input {
        Input::Absent => Ok(Source::Memory),
        Input::Stream(stream) => Ok(Source::External(stream)),
        Input::Path(path) => Ok(Source::Path(path)),
        Input::Integer(n) => c_int::try_from(n)
            .map(Source::Descriptor)
            .map_err(|_| FlexError::UnsupportedInputKind {
                kind: format!("integer {n} (out of descriptor range)"),
            }),
        other @ (Input::Float(_) | Input::Bool(_) | Input::Other(_)) => {
            Err(FlexError::UnsupportedInputKind {
                kind: other.describe(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_absent_is_memory() {
        assert_eq!(classify(Input::from(())).unwrap().kind(), SourceKind::Memory);
        let none: Option<&str> = None;
        assert_eq!(classify(none.into()).unwrap().kind(), SourceKind::Memory);
    }

    #[test]
    fn test_stream_is_external() {
        let mut cursor = Cursor::new(Vec::new());
        let source = classify(Input::from(&mut cursor)).unwrap();
        assert_eq!(source.kind(), SourceKind::External);
    }

    #[test]
    fn test_paths() {
        for input in [
            Input::from("a.txt"),
            Input::from(String::from("a.txt")),
            Input::from(Path::new("a.txt")),
            Input::from(OsString::from("a.txt")),
            Input::from(Some("a.txt")),
        ] {
            let source = classify(input).unwrap();
            assert_eq!(source.kind(), SourceKind::Path);
            assert_eq!(source.name().as_deref(), Some("a.txt"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_byte_path() {
        let source = classify(Input::from(&b"bytes.bin"[..])).unwrap();
        assert_eq!(source.name().as_deref(), Some("bytes.bin"));
    }

    #[test]
    fn test_integer_is_descriptor() {
        let source = classify(Input::from(3)).unwrap();
        assert!(matches!(source, Source::Descriptor(3)));
    }

    #[test]
    fn test_unrecognised_shapes() {
        for input in [
            Input::from(1.5),
            Input::from(true),
            Input::from(i64::MAX),
            Input::Other("set".to_string()),
        ] {
            let err = classify(input).unwrap_err();
            assert!(matches!(err, FlexError::UnsupportedInputKind { .. }));
        }
    }

    #[test]
    fn test_json_values() {
        use serde_json::json;
        assert_eq!(
            classify(json!(null).into()).unwrap().kind(),
            SourceKind::Memory
        );
        assert_eq!(
            classify(json!("out.txt").into()).unwrap().kind(),
            SourceKind::Path
        );
        assert_eq!(
            classify(json!(7).into()).unwrap().kind(),
            SourceKind::Descriptor
        );
        assert!(classify(json!(2.5).into()).is_err());
        assert!(classify(json!([1, 2]).into()).is_err());
        assert!(classify(json!({"a": 1}).into()).is_err());
    }
}
