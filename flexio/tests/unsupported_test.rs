use flexio::{classify, FlexError, FlexStream, Input, SourceKind};

#[test]
fn float_is_unsupported() {
    let err = FlexStream::new(1.5, "r").unwrap_err();
    assert!(matches!(err, FlexError::UnsupportedInputKind { .. }));
    assert!(err.is_misuse());
    assert!(err.to_string().contains("unsupported input kind"));
}

#[test]
fn bool_is_unsupported() {
    assert!(matches!(
        FlexStream::builder(true).build(),
        Err(FlexError::UnsupportedInputKind { .. })
    ));
}

#[test]
fn json_shapes() {
    let cases = [
        (serde_json::json!(null), Some(SourceKind::Memory)),
        (serde_json::json!("a.txt"), Some(SourceKind::Path)),
        (serde_json::json!(3), Some(SourceKind::Descriptor)),
        (serde_json::json!([1, 2]), None),
        (serde_json::json!({"k": 1}), None),
        (serde_json::json!(0.25), None),
    ];
    for (value, expected) in cases {
        let got = classify(Input::from(value.clone())).ok().map(|s| s.kind());
        assert_eq!(got, expected, "classifying {value}");
    }
}

#[test]
fn integer_outside_descriptor_range() {
    let err = FlexStream::new(i64::MAX, "r").unwrap_err();
    assert!(matches!(err, FlexError::UnsupportedInputKind { .. }));
}

#[test]
fn no_input_is_memory() {
    let none: Option<&str> = None;
    let stream = FlexStream::new(none, "w+").unwrap();
    assert_eq!(stream.source_kind(), SourceKind::Memory);
    assert!(stream.in_memory());
    assert_eq!(stream.name(), None);
}
