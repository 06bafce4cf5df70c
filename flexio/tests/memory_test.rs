#[macro_use]
extern crate hamcrest;
use flexio::{FlexError, FlexStream, Lifecycle, SourceKind};
use hamcrest::prelude::*;
use std::io::{self, Read, Seek, SeekFrom, Write};

mod common;

#[test]
fn write_seek_read_round_trip() {
    common::init_tracing();
    let mut stream = FlexStream::memory("w+").unwrap();

    let text = stream
        .with(|s| {
            s.write_all(b"hello")?;
            s.seek(SeekFrom::Start(0))?;
            let mut text = String::new();
            s.read_to_string(&mut text)?;
            Ok(text)
        })
        .unwrap();

    assert_that!(text, equal_to("hello".to_string()));
    assert_eq!(stream.source_kind(), SourceKind::Memory);
    assert!(stream.is_released());
    assert!(stream.handle().is_none());
}

#[test]
fn buffer_survives_release() {
    let mut stream = FlexStream::memory("w").unwrap();
    stream.acquire().unwrap();
    let buffer = stream.buffer().unwrap();
    stream.write_text("kept").unwrap();
    stream.release().unwrap();

    assert!(stream.buffer().is_none());
    assert_that!(buffer.to_vec(), equal_to(b"kept".to_vec()));
}

#[test]
fn init_is_ignored_by_truncating_modes() {
    let mut stream = FlexStream::builder(()).mode("w+").init("old").build().unwrap();
    stream.acquire().unwrap();
    assert_eq!(stream.contents().unwrap(), b"");
}

#[test]
fn append_mode_starts_at_end_of_init() {
    let mut stream = FlexStream::builder(()).mode("a+").init("abc").build().unwrap();
    assert_eq!(stream.tell().unwrap(), 3);
    stream.write_text("def").unwrap();
    stream.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(stream.read_text().unwrap(), "abcdef");
}

#[test]
fn writes_always_append_in_append_mode() {
    let mut stream = FlexStream::builder(()).mode("a+").init("abc").build().unwrap();
    stream.seek(SeekFrom::Start(0)).unwrap();
    stream.write_text("!").unwrap();
    assert_eq!(stream.contents().unwrap(), b"abc!");
}

#[test]
fn read_only_buffer_rejects_writes() {
    let mut stream = FlexStream::builder(()).mode("r").init("data").build().unwrap();
    let err = stream.write_text("more").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    assert!(stream.readable());
    assert!(!stream.writable());
}

#[test]
fn truncate_then_tell() {
    let mut stream = FlexStream::builder(()).mode("r+").init("abcdef").build().unwrap();
    stream.truncate(2).unwrap();
    assert_eq!(stream.read_text().unwrap(), "ab");
    assert_eq!(stream.tell().unwrap(), 2);
}

#[test]
fn io_after_release_fails() {
    let mut stream = FlexStream::memory("w+").unwrap();
    stream.write_text("x").unwrap();
    stream.release().unwrap();

    assert!(stream.is_closed());
    assert!(stream.write_text("y").is_err());
    assert!(stream.tell().is_err());
}

#[test]
fn second_acquire_is_rejected() {
    let mut stream = FlexStream::memory("w+").unwrap();
    stream.acquire().unwrap();
    let err = stream.acquire().unwrap_err();
    assert!(matches!(
        err,
        FlexError::AlreadyAcquired {
            state: Lifecycle::Acquired
        }
    ));
    assert!(err.is_misuse());
}

#[test]
fn release_is_idempotent() {
    let mut stream = FlexStream::memory("w+").unwrap();
    stream.acquire().unwrap();
    stream.release().unwrap();
    stream.release().unwrap();
    stream.close().unwrap();
    assert_eq!(stream.state(), Lifecycle::Released);
}

#[test]
fn failing_usage_still_releases() {
    let mut stream = FlexStream::builder(()).mode("r").init("ro").build().unwrap();

    let err = stream.with(|s| s.write_text("nope")).unwrap_err();

    match &err {
        FlexError::Usage { source, release } => {
            assert_eq!(source.kind(), io::ErrorKind::Unsupported);
            assert!(release.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(stream.is_released());
    assert!(stream.handle().is_none());
}

#[test]
fn panic_inside_scope_still_releases() {
    let mut stream = FlexStream::memory("w+").unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut scope = stream.scope().unwrap();
        scope.write_text("partial").unwrap();
        panic!("boom");
    }));

    assert!(result.is_err());
    assert!(stream.is_released());
    assert!(stream.handle().is_none());
}

#[test]
fn scope_reports_release_result() {
    let mut stream = FlexStream::memory("w+").unwrap();
    {
        let mut scope = stream.scope().unwrap();
        scope.write_text("abc").unwrap();
        assert!(scope.is_acquired());
        scope.finish().unwrap();
    }
    assert!(stream.is_released());
    assert!(matches!(
        stream.scope(),
        Err(FlexError::AlreadyAcquired { .. })
    ));
}

#[test]
fn lines_keep_line_endings() {
    let mut stream = FlexStream::builder(()).init("a\nb\n").build().unwrap();
    let lines: Vec<String> = stream.lines().collect::<io::Result<_>>().unwrap();
    assert_that!(lines, equal_to(vec!["a\n".to_string(), "b\n".to_string()]));
}

#[test]
fn invalid_mode_is_reported_on_acquire() {
    let mut stream = FlexStream::memory("rwx").unwrap();
    let err = stream.acquire().unwrap_err();
    assert!(matches!(err, FlexError::InvalidMode { .. }));
    assert_eq!(err.io_kind(), io::ErrorKind::InvalidInput);
    assert_eq!(stream.state(), Lifecycle::Fresh);
}

#[test]
fn embedded_io_interface() {
    let mut stream = FlexStream::memory("w+b").unwrap();
    embedded_io::Write::write_all(&mut stream, b"bytes").unwrap();
    embedded_io::Seek::seek(&mut stream, embedded_io::SeekFrom::Start(1)).unwrap();

    let mut buf = [0u8; 4];
    let n = embedded_io::Read::read(&mut stream, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"ytes");
}

#[test]
fn embedded_io_errors_are_kinds() {
    let mut stream = FlexStream::builder(()).mode("rb").init("x").build().unwrap();
    let err = embedded_io::Write::write(&mut stream, b"y").unwrap_err();
    assert_eq!(err, embedded_io::ErrorKind::Unsupported);
}

#[test]
fn text_mode_rejects_invalid_utf8() {
    let mut stream = FlexStream::memory("w+").unwrap();
    let err = stream.write(&[0xff, 0xfe]).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(stream.contents().unwrap(), b"");

    stream.write_text("still usable").unwrap();
    assert_eq!(stream.contents().unwrap(), b"still usable");
}

#[test]
fn binary_mode_accepts_any_bytes() {
    let mut stream = FlexStream::memory("wb+").unwrap();
    assert_eq!(stream.write(&[0xff, 0xfe]).unwrap(), 2);
    assert_eq!(stream.contents().unwrap(), vec![0xff, 0xfe]);
}

#[test]
fn read_line_max_stops_at_limit() {
    let mut stream = FlexStream::builder(()).init("h\u{e9}llo\nworld\n").build().unwrap();

    let mut line = String::new();
    assert_eq!(stream.read_line_max(&mut line, 2).unwrap(), 3);
    assert_eq!(line, "h\u{e9}");

    line.clear();
    stream.read_line_max(&mut line, 100).unwrap();
    assert_eq!(line, "llo\n");

    line.clear();
    assert_eq!(stream.read_line_max(&mut line, 0).unwrap(), 0);
    assert!(line.is_empty());
}

#[test]
fn write_lines_then_read_lines() {
    let mut stream = FlexStream::memory("w+").unwrap();
    stream.write_lines(["first\n", "second\n", "third"]).unwrap();
    stream.seek(SeekFrom::Start(0)).unwrap();

    let lines = stream.read_lines().unwrap();
    assert_that!(
        lines,
        equal_to(vec![
            "first\n".to_string(),
            "second\n".to_string(),
            "third".to_string()
        ])
    );
    assert!(stream.read_lines().unwrap().is_empty());
}

#[test]
fn memory_has_no_descriptor() {
    let mut stream = FlexStream::memory("w+").unwrap();
    assert_eq!(stream.fileno().unwrap_err().kind(), io::ErrorKind::Unsupported);
    assert!(!stream.isatty().unwrap());

    stream.release().unwrap();
    assert!(stream.isatty().is_err());
}
