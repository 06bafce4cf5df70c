#[macro_use]
extern crate hamcrest;
use flexio::{FlexError, FlexOptions, FlexStream, OptionsError, SourceKind, MODE_ENV};
use hamcrest::prelude::*;
use serde_json::json;
use std::fs;

mod common;

#[test]
fn memory_options_with_init() {
    common::init_tracing();
    let opts = FlexOptions::from_reader(&br#"{"mode": "r", "init": "from json"}"#[..]).unwrap();
    let mut stream = opts.build().unwrap();

    assert_eq!(stream.source_kind(), SourceKind::Memory);
    assert_that!(stream.read_text().unwrap(), equal_to("from json".to_string()));
}

#[test]
fn path_options_write_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opts.txt");
    let opts = FlexOptions::from_value(json!({
        "source": path.to_str().unwrap(),
        "mode": "w"
    }))
    .unwrap();

    let mut stream = FlexStream::from_options(opts).unwrap();
    stream.with(|s| s.write_text("written")).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "written");
}

#[test]
fn options_read_from_a_flex_stream() {
    let mut config = FlexStream::builder(())
        .mode("r")
        .init(r#"{"source": null, "mode": "w+"}"#)
        .build()
        .unwrap();

    let opts = FlexOptions::from_reader(&mut config).unwrap();
    assert_eq!(opts.source, serde_json::Value::Null);
    assert_eq!(opts.mode.as_deref(), Some("w+"));
}

#[test]
fn non_object_options_are_rejected() {
    assert!(matches!(
        FlexOptions::from_value(json!([1, 2, 3])),
        Err(OptionsError::Parse(_))
    ));
    let opts = FlexOptions::from_value(json!({"source": true})).unwrap();
    assert!(matches!(
        opts.build(),
        Err(FlexError::UnsupportedInputKind { .. })
    ));
}

#[test]
fn mode_env_var_overrides_options() {
    std::env::set_var(MODE_ENV, "a+");
    let opts = FlexOptions::from_value(json!({"mode": "r", "init": "abc"}))
        .unwrap()
        .with_env_overrides();
    std::env::remove_var(MODE_ENV);
    assert_eq!(opts.mode.as_deref(), Some("a+"));

    let mut stream = opts.build().unwrap();
    stream.write_text("d").unwrap();
    assert_eq!(stream.contents().unwrap(), b"abcd");
}
