//! One stream type over paths, borrowed streams, in-memory buffers and raw
//! file descriptors.
//!
//! A [`FlexStream`] classifies its input once, acquires a live handle on
//! first use (opening the path, creating the buffer, wrapping the
//! descriptor, or borrowing the caller's stream) and releases it exactly
//! once. Owned handles are closed on release; borrowed ones are left open
//! for the caller.
//!
//! # Example
//!
//! ```no_run
//! use std::io::Write;
//! use flexio::FlexStream;
//!
//! let mut out = FlexStream::new("report.txt", "w").unwrap();
//! out.with(|s| s.write_all(b"done\n")).unwrap();
//! ```

pub mod acquire;
pub mod buffer;
pub mod config;
#[cfg(unix)]
pub mod descriptor;
pub mod error;
mod error_mapping;
pub mod file;
pub mod flex;
pub mod input;
pub mod memory;
pub mod mode;
pub mod scope;
pub mod stream;

pub use acquire::{AcquireOptions, Handle};
pub use buffer::{Buffer, BufferReadGuard};
pub use config::{FlexOptions, OptionsError, MODE_ENV};
#[cfg(unix)]
pub use descriptor::{descriptor_capabilities, DescriptorStream};
pub use error::{FlexError, Lifecycle};
pub use error_mapping::{embedded_kind_to_io, error_kind_to_str, io_kind_to_embedded};
pub use file::FileStream;
pub use flex::{FlexBuilder, FlexStream, Lines};
pub use input::{classify, Input, Source, SourceKind};
pub use memory::MemoryStream;
pub use mode::{ModeError, OpenMode, Primary};
pub use scope::Scope;
pub use stream::{Capabilities, StreamLike};
