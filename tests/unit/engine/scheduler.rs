use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::Rgba8;
use crate::surface::recording::{DrawCmd, RecordingSurface};

const FRAME: Duration = Duration::from_micros(16_667);

fn seeded() -> SplashConfig {
    SplashConfig {
        seed: Some(42),
        ..SplashConfig::default()
    }
}

fn engine(cfg: SplashConfig) -> (FrameScheduler<RecordingSurface>, Rc<Cell<u32>>) {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let assets = SceneAssets::pending(&cfg);
    let e = FrameScheduler::new(cfg, assets, move || c.set(c.get() + 1)).unwrap();
    (e, calls)
}

fn env(w: f64, h: f64, dpr: f64) -> HostEnv {
    HostEnv::new(w, h, dpr).unwrap()
}

#[test]
fn invalid_config_is_rejected() {
    let mut cfg = seeded();
    cfg.phrases.clear();
    let assets = SceneAssets::pending(&cfg);
    assert!(FrameScheduler::<RecordingSurface>::new(cfg, assets, || {}).is_err());
}

#[test]
fn start_without_surface_is_a_no_op() {
    let (mut e, _) = engine(seeded());
    e.start(None, env(800.0, 600.0, 1.0)).unwrap();
    assert_eq!(e.lifecycle(), Lifecycle::NotStarted);
    assert!(e.stars().is_empty());
    assert!(e.pool().is_empty());
    assert!(!e.tick(FRAME).drawn);
}

#[test]
fn start_sizes_surface_and_seeds_scene() {
    let (mut e, _) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(1280.0, 720.0, 2.0))
        .unwrap();
    assert!(e.is_running());
    assert_eq!(e.device_class(), DeviceClass::Desktop);
    assert_eq!(
        e.backing(),
        Some(BackingSize {
            width: 1920,
            height: 1080,
            dpr: 1.5
        })
    );
    assert_eq!(e.surface().unwrap().resizes.len(), 1);
    assert_eq!(e.stars().len(), 100);
    assert_eq!(e.pool().len(), 50);
    assert_eq!(e.pool().capacity(), 240);
}

#[test]
fn mobile_viewport_uses_mobile_tunables() {
    let (mut e, _) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(390.0, 844.0, 3.0))
        .unwrap();
    assert_eq!(e.device_class(), DeviceClass::Mobile);
    assert_eq!(e.backing().unwrap().dpr, 1.0);
    assert_eq!(e.stars().len(), 40);
    assert_eq!(e.pool().len(), 30);
}

#[test]
fn mobile_backing_ignores_low_pixel_ratio() {
    let (mut e, _) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(390.0, 844.0, 0.5))
        .unwrap();
    let backing = e.backing().unwrap();
    assert_eq!((backing.width, backing.height, backing.dpr), (390, 844, 1.0));
}

#[test]
fn frame_draws_layers_back_to_front() {
    let (mut e, _) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(800.0, 600.0, 1.0))
        .unwrap();
    let stats = e.tick(FRAME);
    assert!(stats.drawn);
    assert_eq!(stats.frame, 1);

    let cmds = &e.surface().unwrap().commands;
    assert_eq!(cmds[0], DrawCmd::Clear);
    assert_eq!(
        cmds[1],
        DrawCmd::FillRect {
            rect: Viewport::new(800.0, 600.0).unwrap().rect(),
            color: Rgba8::rgb(0x1F, 0x05, 0x0A),
        }
    );
    let last_star = cmds
        .iter()
        .rposition(|c| matches!(c, DrawCmd::FillCircle { .. }))
        .unwrap();
    let first_text = cmds
        .iter()
        .position(|c| matches!(c, DrawCmd::Text { .. }))
        .unwrap();
    assert_eq!(last_star, 1 + 100);
    assert!(first_text > last_star);
    // Images are still pending in this engine.
    assert!(!cmds.iter().any(|c| matches!(c, DrawCmd::Image { .. })));
    assert!(stats.images_skipped > 0);
}

#[test]
fn timers_spawn_on_wall_clock() {
    let (mut e, _) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(1024.0, 768.0, 1.0))
        .unwrap();
    let mut shooting = 0;
    for _ in 0..9 {
        shooting += e.tick(Duration::from_millis(100)).shooting_spawned;
    }
    assert_eq!(shooting, 1);
    let stats = e.tick(Duration::from_millis(100));
    assert_eq!(stats.falling_spawned + stats.spawns_dropped, 1);
}

#[test]
fn shooting_star_is_drawn_at_full_opacity_on_its_spawn_frame() {
    let (mut e, _) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(1024.0, 768.0, 1.0))
        .unwrap();
    let head_alphas = |e: &FrameScheduler<RecordingSurface>| -> Vec<u8> {
        e.surface()
            .unwrap()
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::GradientLine { from_color, .. } => Some(from_color.a),
                _ => None,
            })
            .collect()
    };

    assert_eq!(e.tick(Duration::from_millis(900)).shooting_spawned, 1);
    assert_eq!(head_alphas(&e), vec![255]);

    let mut drawn = 1;
    while !head_alphas(&e).is_empty() {
        e.tick(FRAME);
        if !head_alphas(&e).is_empty() {
            drawn += 1;
        }
        assert!(drawn <= 60, "shooting star never expired");
    }
    // One draw per fade step: 1.0 / 0.02, float drift may add one.
    assert!((50..=51).contains(&drawn), "drawn in {drawn} frames");
}

#[test]
fn full_pool_drops_timer_spawns() {
    let mut cfg = seeded();
    cfg.desktop.pool_capacity = 50;
    let (mut e, _) = engine(cfg);
    e.start(Some(RecordingSurface::new()), env(1024.0, 768.0, 1.0))
        .unwrap();
    let stats = e.tick(Duration::from_millis(100));
    assert_eq!(stats.falling_spawned, 0);
    assert_eq!(stats.spawns_dropped, 1);
    assert_eq!(stats.falling, 50);
}

#[test]
fn exit_transition_wraps_frame_in_canvas_effect() {
    let (mut e, calls) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(800.0, 600.0, 1.0))
        .unwrap();
    assert!(!e.on_enter_requested());
    e.tick(Duration::from_millis(3_000));
    assert_eq!(e.gate_state(), GateState::Armed);
    assert!(e.on_enter_requested());

    e.tick(Duration::from_millis(500));
    let cmds = &e.surface().unwrap().commands;
    assert!(matches!(cmds[1], DrawCmd::PushEffect(fx) if fx.opacity < 1.0 && fx.scale > 1.0));
    assert_eq!(cmds.last(), Some(&DrawCmd::PopEffect));

    e.tick(Duration::from_millis(500));
    assert_eq!(e.gate_state(), GateState::Done);
    assert_eq!(calls.get(), 1);
    e.stop();
    assert_eq!(calls.get(), 1);
}

#[test]
fn stop_is_idempotent_and_freezes_state() {
    let (mut e, _) = engine(seeded());
    e.start(Some(RecordingSurface::new()), env(800.0, 600.0, 1.0))
        .unwrap();
    e.tick(FRAME);
    e.stop();
    e.stop();
    assert_eq!(e.lifecycle(), Lifecycle::Stopped);

    let frames = e.surface().unwrap().frames_begun;
    let falling: Vec<_> = e.pool().iter().copied().collect();
    let stats = e.tick(Duration::from_secs(10));
    assert!(!stats.drawn);
    assert_eq!(e.surface().unwrap().frames_begun, frames);
    assert_eq!(e.pool().iter().copied().collect::<Vec<_>>(), falling);

    e.on_resize(env(1600.0, 1200.0, 1.0)).unwrap();
    assert_eq!(e.surface().unwrap().resizes.len(), 1);
    assert!(!e.on_enter_requested());

    e.start(Some(RecordingSurface::new()), env(800.0, 600.0, 1.0))
        .unwrap();
    assert_eq!(e.lifecycle(), Lifecycle::Stopped);
}
