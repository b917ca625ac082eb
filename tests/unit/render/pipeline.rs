use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::assets::store::SceneAssets;
use crate::config::settings::SplashConfig;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::HostEnv;

fn started(cfg: SplashConfig) -> (FrameScheduler<CpuSurface>, Rc<Cell<u32>>) {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let assets = SceneAssets::pending(&cfg);
    let mut engine = FrameScheduler::new(cfg, assets, move || c.set(c.get() + 1)).unwrap();
    engine
        .start(Some(CpuSurface::new()), HostEnv::new(64.0, 48.0, 1.0).unwrap())
        .unwrap();
    (engine, calls)
}

fn quick_gate() -> SplashConfig {
    let mut cfg = SplashConfig {
        seed: Some(9),
        ..SplashConfig::default()
    };
    cfg.gate.reveal_delay_ms = 100;
    cfg.gate.transition_ms = 200;
    cfg
}

#[test]
fn zero_fps_and_bad_durations_are_rejected() {
    assert!(OfflineRun::new(0, 10).is_err());
    assert!(OfflineRun::for_duration(30, 0.0).is_err());
    assert!(OfflineRun::for_duration(30, f64::NAN).is_err());
    assert_eq!(OfflineRun::for_duration(30, 1.0).unwrap().frame_count(), 30);
    assert_eq!(
        OfflineRun::new(50, 1).unwrap().frame_dt(),
        Duration::from_millis(20)
    );
}

#[test]
fn run_pushes_every_frame_at_backing_size() {
    let (mut engine, _) = started(quick_gate());
    let mut sink = InMemorySink::new();
    let stats = OfflineRun::new(30, 10)
        .unwrap()
        .run(&mut engine, &mut sink)
        .unwrap();
    assert_eq!(stats.frames, 10);
    assert!(!stats.entry_accepted);
    assert_eq!(
        sink.config(),
        Some(&SinkConfig {
            width: 64,
            height: 48,
            fps: 30
        })
    );
    assert!(sink.is_ended());
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
    for (_, f) in sink.frames() {
        assert_eq!((f.width, f.height), (64, 48));
        // The background is opaque, so every pixel is.
        assert!(f.data.chunks_exact(4).all(|px| px[3] >= 250));
    }
}

#[test]
fn enter_click_finishes_the_run_and_stops_the_engine() {
    let (mut engine, calls) = started(quick_gate());
    let mut sink = InMemorySink::new();
    let stats = OfflineRun::new(30, 120)
        .unwrap()
        .with_enter_at(Duration::from_millis(200))
        .run(&mut engine, &mut sink)
        .unwrap();
    assert!(stats.entry_accepted);
    assert!(stats.frames < 120);
    assert_eq!(calls.get(), 1);
    assert!(!engine.is_running());
    assert_eq!(sink.frames().len() as u64, stats.frames);
}

#[test]
fn unstarted_engine_cannot_render() {
    let cfg = quick_gate();
    let assets = SceneAssets::pending(&cfg);
    let mut engine = FrameScheduler::<CpuSurface>::new(cfg, assets, || {}).unwrap();
    let run = OfflineRun::new(30, 1).unwrap();
    assert!(run.run(&mut engine, &mut InMemorySink::new()).is_err());
    assert!(run.render_at(&mut engine, Duration::ZERO).is_err());
}

#[test]
fn render_at_advances_the_clock() {
    let (mut engine, _) = started(quick_gate());
    let frame = OfflineRun::new(50, 1)
        .unwrap()
        .render_at(&mut engine, Duration::from_millis(500))
        .unwrap();
    assert_eq!((frame.width, frame.height), (64, 48));
    assert_eq!(engine.frames(), 25);
}

#[derive(Default)]
struct FailingSink {
    pushed: u64,
    ended: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> SplashResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: u64, _frame: &FrameRGBA) -> SplashResult<()> {
        self.pushed += 1;
        if self.pushed == 3 {
            return Err(SplashError::encode("disk full"));
        }
        Ok(())
    }

    fn end(&mut self) -> SplashResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[test]
fn failed_frame_still_ends_the_sink() {
    let (mut engine, _) = started(quick_gate());
    let mut sink = FailingSink::default();
    let err = OfflineRun::new(30, 10)
        .unwrap()
        .run(&mut engine, &mut sink)
        .unwrap_err();
    assert!(err.to_string().contains("disk full"));
    assert_eq!(sink.pushed, 3);
    assert!(sink.ended);
}
