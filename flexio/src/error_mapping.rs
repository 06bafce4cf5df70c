//! Error mapping utilities for converting between error types.
//!
//! `FlexStream` speaks both `std::io` and `embedded_io`. This module converts
//! `std::io::ErrorKind` to `embedded_io::ErrorKind` and back, and turns error
//! kinds into human-readable static strings.

use std::io;

/// Convert `std::io::ErrorKind` to `embedded_io::ErrorKind`
#[must_use]
#[allow(clippy::match_same_arms)]
pub fn io_kind_to_embedded(kind: io::ErrorKind) -> embedded_io::ErrorKind {
    match kind {
        io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
        io::ErrorKind::ConnectionRefused => embedded_io::ErrorKind::ConnectionRefused,
        io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
        io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
        io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
        io::ErrorKind::AddrInUse => embedded_io::ErrorKind::AddrInUse,
        io::ErrorKind::AddrNotAvailable => embedded_io::ErrorKind::AddrNotAvailable,
        io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
        io::ErrorKind::AlreadyExists => embedded_io::ErrorKind::AlreadyExists,
        io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
        io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
        io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
        io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
        io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
        io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
        _ => embedded_io::ErrorKind::Other,
    }
}

/// Convert `embedded_io::ErrorKind` back to `std::io::ErrorKind`
#[must_use]
#[allow(clippy::match_same_arms)]
pub fn embedded_kind_to_io(kind: embedded_io::ErrorKind) -> io::ErrorKind {
    match kind {
        embedded_io::ErrorKind::NotFound => io::ErrorKind::NotFound,
        embedded_io::ErrorKind::PermissionDenied => io::ErrorKind::PermissionDenied,
        embedded_io::ErrorKind::ConnectionRefused => io::ErrorKind::ConnectionRefused,
        embedded_io::ErrorKind::ConnectionReset => io::ErrorKind::ConnectionReset,
        embedded_io::ErrorKind::ConnectionAborted => io::ErrorKind::ConnectionAborted,
        embedded_io::ErrorKind::NotConnected => io::ErrorKind::NotConnected,
        embedded_io::ErrorKind::AddrInUse => io::ErrorKind::AddrInUse,
        embedded_io::ErrorKind::AddrNotAvailable => io::ErrorKind::AddrNotAvailable,
        embedded_io::ErrorKind::BrokenPipe => io::ErrorKind::BrokenPipe,
        embedded_io::ErrorKind::AlreadyExists => io::ErrorKind::AlreadyExists,
        embedded_io::ErrorKind::InvalidInput => io::ErrorKind::InvalidInput,
        embedded_io::ErrorKind::InvalidData => io::ErrorKind::InvalidData,
        embedded_io::ErrorKind::TimedOut => io::ErrorKind::TimedOut,
        embedded_io::ErrorKind::Interrupted => io::ErrorKind::Interrupted,
        embedded_io::ErrorKind::Unsupported => io::ErrorKind::Unsupported,
        embedded_io::ErrorKind::OutOfMemory => io::ErrorKind::OutOfMemory,
        _ => io::ErrorKind::Other,
    }
}

/// Convert error kind to a static string description
#[must_use]
pub fn error_kind_to_str(kind: embedded_io::ErrorKind) -> &'static str {
    match kind {
        embedded_io::ErrorKind::NotFound => "not found",
        embedded_io::ErrorKind::PermissionDenied => "permission denied",
        embedded_io::ErrorKind::ConnectionRefused => "connection refused",
        embedded_io::ErrorKind::ConnectionReset => "connection reset",
        embedded_io::ErrorKind::ConnectionAborted => "connection aborted",
        embedded_io::ErrorKind::NotConnected => "not connected",
        embedded_io::ErrorKind::AddrInUse => "address in use",
        embedded_io::ErrorKind::AddrNotAvailable => "address not available",
        embedded_io::ErrorKind::BrokenPipe => "broken pipe",
        embedded_io::ErrorKind::AlreadyExists => "already exists",
        embedded_io::ErrorKind::InvalidInput => "invalid input",
        embedded_io::ErrorKind::InvalidData => "invalid data",
        embedded_io::ErrorKind::TimedOut => "timed out",
        embedded_io::ErrorKind::Interrupted => "interrupted",
        embedded_io::ErrorKind::Unsupported => "unsupported",
        embedded_io::ErrorKind::OutOfMemory => "out of memory",
        embedded_io::ErrorKind::Other => "other error",
        _ => "unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_common_kinds() {
        for kind in [
            io::ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::AlreadyExists,
            io::ErrorKind::Unsupported,
            io::ErrorKind::InvalidData,
        ] {
            assert_eq!(embedded_kind_to_io(io_kind_to_embedded(kind)), kind);
        }
    }

    #[test]
    fn test_unknown_maps_to_other() {
        assert_eq!(
            io_kind_to_embedded(io::ErrorKind::UnexpectedEof),
            embedded_io::ErrorKind::Other
        );
        assert_eq!(error_kind_to_str(embedded_io::ErrorKind::NotFound), "not found");
    }
}
