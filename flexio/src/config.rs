//! Stream options read from JSON.
//!
//! ```json
//! {"source": "out.txt", "mode": "w", "close_fd": false, "init": null}
//! ```
//!
//! `source` follows the input classification rules: `null` or missing is an
//! in-memory buffer, a string is a path, an integer is a descriptor.

use serde::Deserialize;
use std::env;
use std::fmt;

use crate::error::FlexError;
use crate::error_mapping::error_kind_to_str;
use crate::flex::FlexStream;
use crate::input::Input;

/// Environment variable overriding the configured mode.
pub const MODE_ENV: &str = "FLEXIO_MODE";

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FlexOptions {
    #[serde(default)]
    pub source: serde_json::Value,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub init: Option<String>,
    #[serde(default)]
    pub close_fd: bool,
}

#[derive(Debug)]
pub enum OptionsError {
    Read(embedded_io::ErrorKind),
    Parse(serde_json::Error),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(kind) => {
                write!(f, "Failed to read stream options: {}", error_kind_to_str(*kind))
            }
            Self::Parse(e) => write!(f, "Failed to parse stream options JSON: {e}"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(_) => None,
            Self::Parse(e) => Some(e),
        }
    }
}

impl FlexOptions {
    /// Read options as JSON from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are I/O errors reading from the provided reader
    /// - The JSON input is invalid or malformed
    pub fn from_reader<R: embedded_io::Read>(mut reader: R) -> Result<Self, OptionsError> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match embedded_io::Read::read(&mut reader, &mut chunk) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) => return Err(OptionsError::Read(embedded_io::Error::kind(&e))),
            }
        }
        serde_json::from_slice(&buffer).map_err(OptionsError::Parse)
    }

    /// Options from an already parsed JSON value.
    ///
    /// # Errors
    /// Returns an error if the value is not an options object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, OptionsError> {
        serde_json::from_value(value).map_err(OptionsError::Parse)
    }

    /// Let `FLEXIO_MODE` override the mode.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(mode) = env::var(MODE_ENV) {
            if !mode.is_empty() {
                self.mode = Some(mode);
            }
        }
        self
    }

    /// Build a stream from these options.
    ///
    /// # Errors
    /// Returns `UnsupportedInputKind` if `source` is not a recognised shape.
    pub fn build(self) -> Result<FlexStream<'static>, FlexError> {
        let mut builder = FlexStream::builder(Input::from(self.source)).close_fd(self.close_fd);
        if let Some(mode) = self.mode {
            builder = builder.mode(mode);
        }
        if let Some(init) = self.init {
            builder = builder.init(init);
        }
        builder.build()
    }
}

impl FlexStream<'static> {
    /// Build a stream from [`FlexOptions`].
    ///
    /// # Errors
    /// See [`FlexOptions::build`].
    pub fn from_options(opts: FlexOptions) -> Result<Self, FlexError> {
        opts.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceKind;
    use serde_json::json;

    #[test]
    fn test_from_reader_happy_path() {
        let input = br#"{"source": "out.txt", "mode": "w"}"#;
        let opts = FlexOptions::from_reader(&input[..]).unwrap();
        assert_eq!(opts.source, json!("out.txt"));
        assert_eq!(opts.mode.as_deref(), Some("w"));
        assert!(!opts.close_fd);
    }

    #[test]
    fn test_missing_source_is_memory() {
        let opts = FlexOptions::from_value(json!({"mode": "w+"})).unwrap();
        let stream = opts.build().unwrap();
        assert_eq!(stream.source_kind(), SourceKind::Memory);
    }

    #[test]
    fn test_bad_json() {
        let err = FlexOptions::from_reader(&b"{not json"[..]).unwrap_err();
        assert!(matches!(err, OptionsError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn test_unsupported_source() {
        let opts = FlexOptions::from_value(json!({"source": 1.5})).unwrap();
        assert!(matches!(
            opts.build(),
            Err(FlexError::UnsupportedInputKind { .. })
        ));
    }
}
