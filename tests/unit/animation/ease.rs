use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::NAMED {
        assert_eq!(ease.apply(0.0), 0.0, "{} at 0", ease.name());
        assert_eq!(ease.apply(1.0), 1.0, "{} at 1", ease.name());
    }
    for bezier in [
        CubicBezier::EASE,
        CubicBezier::EASE_IN,
        CubicBezier::EASE_OUT,
        CubicBezier::EASE_IN_OUT,
    ] {
        let ease = Ease::CubicBezier(bezier);
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn input_outside_unit_range_is_clamped() {
    for ease in Ease::NAMED {
        assert_eq!(ease.apply(-0.5), 0.0);
        assert_eq!(ease.apply(1.5), 1.0);
        assert_eq!(ease.apply(f64::NAN), 0.0);
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in [
        Ease::Linear,
        Ease::InSine,
        Ease::OutSine,
        Ease::InOutSine,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InQuart,
        Ease::OutQuint,
        Ease::InOutExpo,
        Ease::InOutCirc,
        Ease::EASE,
    ] {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{}", ease.name());
        assert!(b < c, "{}", ease.name());
    }
}

#[test]
fn overshooting_families_leave_unit_range() {
    assert!(Ease::InBack.apply(0.2) < 0.0);
    assert!(Ease::OutBack.apply(0.8) > 1.0);
    assert!(Ease::OutElastic.apply(0.1) > 1.0);
    assert!(Ease::InElastic.apply(0.9) < 0.0);
}

#[test]
fn bounce_out_touches_known_points() {
    assert!((Ease::OutBounce.apply(1.0 / 2.75) - 1.0).abs() < 1e-9);
    assert!((Ease::InBounce.apply(0.5) - (1.0 - Ease::OutBounce.apply(0.5))).abs() < 1e-12);
}

#[test]
fn names_resolve_with_aliases() {
    assert_eq!(Ease::from_name("linear").unwrap(), Ease::Linear);
    assert_eq!(Ease::from_name("easeInOutCubic").unwrap(), Ease::InOutCubic);
    assert_eq!(Ease::from_name("ease-in-out-cubic").unwrap(), Ease::InOutCubic);
    assert_eq!(Ease::from_name("in_out_cubic").unwrap(), Ease::InOutCubic);
    assert_eq!(Ease::from_name("cubic-in-out").unwrap(), Ease::InOutCubic);
    assert_eq!(Ease::from_name("OutBounce").unwrap(), Ease::OutBounce);
    assert_eq!(Ease::from_name("ease").unwrap(), Ease::EASE);
    assert_eq!(
        Ease::from_name("ease-in").unwrap(),
        Ease::CubicBezier(CubicBezier::EASE_IN)
    );
}

#[test]
fn canonical_names_round_trip() {
    for ease in Ease::NAMED {
        assert_eq!(Ease::from_name(&ease.name()).unwrap(), ease);
    }
    let custom = Ease::from_name("cubic-bezier(0.6, -0.28, 0.735, 0.045)").unwrap();
    assert_eq!(Ease::from_name(&custom.name()).unwrap(), custom);
}

#[test]
fn unknown_names_fail() {
    for name in ["wobble", "", "ease-sideways-quad", "cubic-bezier(1, 2)"] {
        let err = Ease::from_name(name).unwrap_err();
        assert!(matches!(err, PlayerError::UnknownEasing(ref n) if n == name));
    }
}

#[test]
fn bezier_rejects_x_outside_unit_range() {
    assert!(CubicBezier::new(1.5, 0.0, 0.5, 1.0).is_err());
    assert!(CubicBezier::new(0.2, f64::NAN, 0.5, 1.0).is_err());
    assert!(Ease::from_name("cubic-bezier(-0.1, 0, 0.5, 1)").is_err());
}

#[test]
fn bezier_identity_curve_is_linear() {
    let ease = Ease::CubicBezier(CubicBezier::new(0.0, 0.0, 1.0, 1.0).unwrap());
    for i in 1..10 {
        let t = f64::from(i) / 10.0;
        assert!((ease.apply(t) - t).abs() < 1e-5);
    }
}

#[test]
fn css_ease_matches_reference_midpoint() {
    // Browsers report ~0.8024 for `ease` at 50%.
    let y = Ease::EASE.apply(0.5);
    assert!((y - 0.8024).abs() < 1e-3, "{y}");
}

#[test]
fn serde_uses_canonical_names() {
    let json = serde_json::to_string(&Ease::OutQuad).unwrap();
    assert_eq!(json, "\"ease-out-quad\"");
    let back: Ease = serde_json::from_str("\"easeOutQuad\"").unwrap();
    assert_eq!(back, Ease::OutQuad);
    assert!(serde_json::from_str::<Ease>("\"nope\"").is_err());
}
