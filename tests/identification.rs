use nalgebra::Point2;
use particle_id::identification::{
    quality, GammaRule, GridKind, IdentificationContour, IdentificationGrid, IdentificationLine,
    IdentificationTelescope, Rounding, GAMMA_LINE,
};

fn band(name: &str, y0: f64, y1: f64, code: i32, priority: i32) -> IdentificationContour {
    IdentificationContour::new(
        name,
        vec![
            Point2::new(0.0, y0),
            Point2::new(100.0, y0),
            Point2::new(100.0, y1),
            Point2::new(0.0, y1),
        ],
        false,
        code,
        priority,
    )
    .unwrap()
}

fn curved_grid() -> IdentificationGrid {
    // Lines of the usual ΔE–E shape: falling with the residual energy.
    let line = |z: i32, a: i32, scale: f64| {
        let points = (0..=10)
            .map(|i| {
                let x = 10.0 * i as f64 + 1.0;
                Point2::new(x, scale * 100.0 / x.sqrt())
            })
            .collect();
        IdentificationLine::new(z, a, points).unwrap()
    };
    IdentificationGrid::new(
        "si_csi",
        GridKind::DeltaEE,
        vec![line(1, 1, 1.0), line(2, 4, 3.0), line(3, 7, 6.0), line(4, 9, 10.0)],
        Rounding::Nearest,
        0.5,
    )
    .unwrap()
}

#[test]
fn repeated_identification_is_bit_identical() {
    let tel = IdentificationTelescope::new("t", 2, "csi", "si")
        .with_grid(curved_grid())
        .with_contours([band("low", 0.0, 2.0, 6, 0)]);
    for i in 0..40 {
        for j in 0..40 {
            let (x, y) = (2.5 * i as f64, 5.0 * j as f64);
            let a = tel.identify(x, y);
            let b = tel.identify(x, y);
            assert_eq!(a, b, "point ({x}, {y})");
            assert_eq!(
                a.a_real.map(f64::to_bits),
                b.a_real.map(f64::to_bits),
                "point ({x}, {y})"
            );
        }
    }
}

#[test]
fn curved_grid_places_points_between_lines() {
    let tel = IdentificationTelescope::new("t", 2, "csi", "si").with_grid(curved_grid());
    // At x = 21: Z=2 line at 300/sqrt(21) ≈ 65.5, Z=3 at ≈ 130.9.
    let r = tel.identify(21.0, 70.0);
    assert!(r.id_ok);
    assert_eq!(r.id_quality, quality::GRID_IDENTIFIED);
    assert_eq!((r.z, r.a), (2, 4));
    let r = tel.identify(21.0, 125.0);
    assert_eq!(r.z, 3);
    // Far above the Z=4 line.
    let r = tel.identify(21.0, 1000.0);
    assert!(!r.id_ok);
    assert_eq!(r.id_quality, quality::OUT_OF_RANGE);
}

#[test]
fn lower_priority_value_wins_on_overlap() {
    let tel = IdentificationTelescope::new("t", 2, "csi", "si").with_contours([
        band("p2", 0.0, 50.0, 22, 2),
        band("p1", 20.0, 30.0, 11, 1),
    ]);
    let r = tel.identify(50.0, 25.0);
    assert_eq!(r.id_quality, 11);
    assert_eq!(r.rejecting_cut.as_deref(), Some("p1"));
    let r = tel.identify(50.0, 10.0);
    assert_eq!(r.id_quality, 22);
}

#[test]
fn exclusive_contour_accepts_outside_points() {
    let c = IdentificationContour::new(
        "veto",
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 10.0),
            Point2::new(0.0, 10.0),
        ],
        true,
        4,
        0,
    )
    .unwrap();
    assert!(c.is_exclusive());
    let tel = IdentificationTelescope::new("t", 2, "csi", "si").with_contours([c]);
    assert!(!tel.identify(50.0, 5.0).id_ok);
    assert_eq!(tel.identify(50.0, 50.0).id_quality, 4);
}

#[test]
fn gamma_line_cut_with_generic_code_is_relabelled() {
    let rule = GammaRule {
        gamma_code: 10,
        generic_code: Some(3),
    };
    let tel = IdentificationTelescope::new("t", 5, "csi", "si")
        .with_grid(curved_grid())
        .with_contours([band(GAMMA_LINE, 0.0, 2.0, 3, 0)])
        .with_gamma_rule(rule);
    let r = tel.identify(50.0, 1.0);
    assert!(r.id_ok);
    assert_eq!((r.id_code, r.id_quality, r.z, r.a), (0, 10, 0, 1));
    assert_eq!(r.rejecting_cut.as_deref(), Some(GAMMA_LINE));
}

#[test]
fn gamma_rule_applies_to_unidentified_results() {
    let rule = GammaRule {
        gamma_code: quality::OUT_OF_RANGE,
        generic_code: None,
    };
    let plain = IdentificationTelescope::new("plain", 5, "csi", "si");
    let salvaging = IdentificationTelescope::new("salvage", 5, "csi", "si").with_gamma_rule(rule);

    let before = plain.identify(1.0, 1.0);
    assert!(!before.id_ok);
    assert_eq!(before.id_quality, quality::OUT_OF_RANGE);

    let traced = salvaging.identify_traced(1.0, 1.0);
    assert!(traced.gamma_override);
    let r = traced.result;
    assert_eq!(
        (r.id_ok, r.id_code, r.id_quality, r.z, r.a),
        (true, 0, quality::OUT_OF_RANGE, 0, 1)
    );
}
