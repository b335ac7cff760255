use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(Rgba::parse("#ff0000"), Some(Rgba::new(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(Rgba::parse("#f00"), Some(Rgba::new(1.0, 0.0, 0.0, 1.0)));

    let c = Rgba::parse("#0000ff80").unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    let c = Rgba::parse("#0f08").unwrap();
    assert!((c.g - 1.0).abs() < 1e-9);
    assert!((c.a - (136.0 / 255.0)).abs() < 1e-9);
}

#[test]
fn parses_functional_forms() {
    let c = Rgba::parse("rgb(255, 128, 0)").unwrap();
    assert_eq!(c.r, 1.0);
    assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
    assert_eq!(c.a, 1.0);

    let c = Rgba::parse("RGBA(0, 0, 0, 0.5)").unwrap();
    assert_eq!(c, Rgba::new(0.0, 0.0, 0.0, 0.5));

    let c = Rgba::parse("rgb(100%, 50%, 0%)").unwrap();
    assert_eq!(c, Rgba::new(1.0, 0.5, 0.0, 1.0));
}

#[test]
fn rejects_non_colors() {
    for s in ["red", "#12", "#ggg", "rgb(1,2)", "rgba(1,2,3)", "hello", "#12345"] {
        assert_eq!(Rgba::parse(s), None, "{s}");
    }
}

#[test]
fn lerp_is_per_channel() {
    let a = Rgba::new(0.0, 0.0, 0.0, 1.0);
    let b = Rgba::new(1.0, 0.5, 0.25, 0.0);
    assert_eq!(Rgba::lerp(&a, &b, 0.0), a);
    assert_eq!(Rgba::lerp(&a, &b, 1.0), b);
    assert_eq!(Rgba::lerp(&a, &b, 0.5), Rgba::new(0.5, 0.25, 0.125, 0.5));
}

#[test]
fn hex_output_drops_opaque_alpha() {
    assert_eq!(Rgba::new(1.0, 0.0, 0.0, 1.0).to_hex(), "#ff0000");
    assert_eq!(Rgba::new(0.0, 0.0, 1.0, 0.5).to_hex(), "#0000ff80");
}
