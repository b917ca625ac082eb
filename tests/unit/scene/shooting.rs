use super::*;
use crate::surface::recording::{DrawCmd, RecordingSurface};

fn vp() -> Viewport {
    Viewport::new(800.0, 600.0).unwrap()
}

#[test]
fn spawn_lands_in_top_half_with_full_opacity() {
    let mut rng = fastrand::Rng::with_seed(11);
    let mut sp = ShootingStarSpawner::new(ShootingStyle::default());
    for _ in 0..50 {
        sp.spawn(vp(), &mut rng);
    }
    for s in sp.stars() {
        assert!((0.0..800.0).contains(&s.pos.x));
        assert!((0.0..300.0).contains(&s.pos.y));
        assert!((100.0..300.0).contains(&s.length));
        assert!((6.0..18.0).contains(&s.speed));
        assert_eq!(s.angle, SHOOTING_ANGLE);
        assert_eq!(s.opacity, 1.0);
    }
}

#[test]
fn opacity_never_increases_and_star_drops_on_first_non_positive() {
    let mut rng = fastrand::Rng::with_seed(5);
    let mut sp = ShootingStarSpawner::new(ShootingStyle::default());
    sp.spawn(vp(), &mut rng);

    let mut prev = 1.0;
    let mut passes = 0;
    while !sp.is_empty() {
        sp.tick();
        sp.fade();
        passes += 1;
        if let Some(s) = sp.stars().first() {
            assert!(s.opacity <= prev);
            assert!(s.opacity > 0.0);
            prev = s.opacity;
        }
        assert!(passes <= 100, "star never expired");
    }
    // 1.0 / 0.02 = 50 draws; float drift may add one.
    assert!((50..=51).contains(&passes), "expired after {passes} passes");
}

#[test]
fn streak_moves_diagonally_down_right() {
    let mut rng = fastrand::Rng::with_seed(9);
    let mut sp = ShootingStarSpawner::new(ShootingStyle::default());
    sp.spawn(vp(), &mut rng);
    let before = sp.stars()[0];
    sp.tick();
    let after = sp.stars()[0];
    let d = after.pos - before.pos;
    assert!(d.x > 0.0 && d.y > 0.0);
    assert!((d.x - d.y).abs() < 1e-9);
    assert!((d.hypot() - before.speed).abs() < 1e-9);
}

#[test]
fn draw_fades_from_head_to_transparent_tail() {
    let mut rng = fastrand::Rng::with_seed(2);
    let mut sp = ShootingStarSpawner::new(ShootingStyle::default());
    sp.spawn(vp(), &mut rng);
    let star = sp.stars()[0];

    let mut surface = RecordingSurface::new();
    sp.draw(&mut surface);
    match &surface.commands[..] {
        [DrawCmd::GradientLine {
            from,
            to,
            width,
            from_color,
            to_color,
        }] => {
            assert_eq!(*from, star.pos);
            assert!((from.distance(*to) - star.length).abs() < 1e-9);
            assert!(to.x < from.x && to.y < from.y);
            assert_eq!(*width, 2.0);
            assert_eq!(from_color.a, 255);
            assert_eq!(to_color.a, 0);
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn tick_moves_without_fading() {
    let mut rng = fastrand::Rng::with_seed(4);
    let mut sp = ShootingStarSpawner::new(ShootingStyle::default());
    sp.spawn(vp(), &mut rng);
    sp.tick();
    assert_eq!(sp.stars()[0].opacity, 1.0);

    let mut surface = RecordingSurface::new();
    sp.draw(&mut surface);
    assert!(matches!(
        surface.commands[..],
        [DrawCmd::GradientLine { from_color, .. }] if from_color.a == 255
    ));

    sp.fade();
    assert!((sp.stars()[0].opacity - 0.98).abs() < 1e-12);
}
