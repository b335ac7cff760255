use super::*;
use serde_json::json;

#[test]
fn numbers_lerp_linearly() {
    let interp = Interp::between(&json!(0), &json!(500)).unwrap();
    assert_eq!(interp.kind(), ValueKind::Number);
    assert_eq!(interp.at(0.25), TrackValue::Number(125.0));
    assert_eq!(interp.at(1.0), TrackValue::Number(500.0));
    // Overshooting easings extrapolate numbers.
    assert_eq!(interp.at(1.1).as_number().unwrap().round(), 550.0);
}

#[test]
fn colors_lerp_per_channel_and_stay_in_gamut() {
    let interp = Interp::between(&json!("#000000"), &json!("#ffffff")).unwrap();
    assert_eq!(interp.kind(), ValueKind::Color);
    let mid = interp.at(0.5).as_color().unwrap();
    assert!((mid.r - 0.5).abs() < 1e-9);
    assert_eq!(interp.at(1.4).as_color().unwrap(), Rgba::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn bare_strings_flip_at_half() {
    let interp = Interp::between(&json!("hidden"), &json!("visible")).unwrap();
    assert_eq!(interp.kind(), ValueKind::Text);
    assert_eq!(interp.at(0.49).as_text(), Some("hidden"));
    assert_eq!(interp.at(0.5).as_text(), Some("visible"));
}

#[test]
fn mixed_color_and_keyword_strings_flip_as_text() {
    let interp = Interp::between(&json!("transparent"), &json!("#ff0000")).unwrap();
    assert_eq!(interp.kind(), ValueKind::Text);
    assert_eq!(interp.at(1.0).as_text(), Some("#ff0000"));
}

#[test]
fn records_interpolate_shared_fields() {
    let interp = Interp::between(
        &json!({"x": 0, "y": 10, "label": "a"}),
        &json!({"x": 100, "y": 20, "label": "b", "extra": 5}),
    )
    .unwrap();
    let v = interp.at(0.5);
    assert_eq!(v.field("x"), Some(&TrackValue::Number(50.0)));
    assert_eq!(v.field("y"), Some(&TrackValue::Number(15.0)));
    assert_eq!(v.field("label").and_then(TrackValue::as_text), Some("b"));
    assert_eq!(v.field("extra"), Some(&TrackValue::Number(5.0)));
}

#[test]
fn mismatched_kinds_are_rejected() {
    let err = Interp::between(&json!(1), &json!("big")).unwrap_err();
    assert_eq!(
        err,
        TrackError::MismatchedValues {
            from: "number",
            to: "text"
        }
    );
    assert!(Interp::between(&json!({"x": 1}), &json!({"x": true})).is_err());
}

#[test]
fn arrays_and_null_are_unsupported() {
    assert!(matches!(
        Interp::constant(&json!([1, 2])),
        Err(TrackError::UnsupportedValue(_))
    ));
    assert!(matches!(
        Interp::constant(&json!(null)),
        Err(TrackError::UnsupportedValue(_))
    ));
}

#[test]
fn values_serialize_in_declared_shape() {
    let v = TrackValue::Record(vec![
        (Arc::from("opacity"), TrackValue::Number(0.5)),
        (Arc::from("tint"), TrackValue::Color(Rgba::new(1.0, 0.0, 0.0, 1.0))),
        (Arc::from("visible"), TrackValue::Bool(true)),
    ]);
    assert_eq!(
        serde_json::to_value(&v).unwrap(),
        json!({"opacity": 0.5, "tint": "#ff0000", "visible": true})
    );
}
