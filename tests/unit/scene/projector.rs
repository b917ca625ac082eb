use super::*;

fn vp() -> Viewport {
    Viewport::new(800.0, 600.0).unwrap()
}

#[test]
fn scale_is_one_at_focal_length() {
    let p = PerspectiveProjector::new(300.0);
    let out = p.project(Point::new(10.0, -20.0), 300.0, 30.0, vp());
    assert_eq!(out.scale, 1.0);
    assert_eq!(out.size, 30.0);
    assert_eq!(out.screen, Point::new(410.0, 280.0));
}

#[test]
fn scale_strictly_decreases_with_depth() {
    let p = PerspectiveProjector::new(300.0);
    let mut prev = f64::INFINITY;
    for i in 1..200 {
        let z = i as f64 * 7.5;
        let s = p.scale_at(z);
        assert!(s < prev, "scale at z={z} did not decrease");
        prev = s;
    }
}

#[test]
fn origin_projects_to_center_at_any_depth() {
    let p = PerspectiveProjector::new(300.0);
    for z in [1.0, 300.0, 1500.0] {
        assert_eq!(p.project(Point::ORIGIN, z, 10.0, vp()).screen, Point::new(400.0, 300.0));
    }
}

#[test]
fn off_screen_uses_projected_size_margin() {
    let p = PerspectiveProjector::new(300.0);
    // x = 400 + 430 = 830 with size 30: 830 <= 800 + 30, still on screen.
    let near_edge = p.project(Point::new(430.0, 0.0), 300.0, 30.0, vp());
    assert!(!near_edge.is_off_screen(vp()));
    let past_edge = p.project(Point::new(431.0, 0.0), 300.0, 30.0, vp());
    assert!(past_edge.is_off_screen(vp()));
}
