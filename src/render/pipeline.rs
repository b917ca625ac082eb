use std::time::Duration;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::engine::gate::GateState;
use crate::engine::scheduler::FrameScheduler;
use crate::foundation::error::{SplashError, SplashResult};
use crate::render::cpu::CpuSurface;
use crate::render::frame::FrameRGBA;

/// Counters from one [`OfflineRun::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Whether the host callback ran during the run.
    pub entry_accepted: bool,
    /// Falling elements recycled over the run.
    pub recycled: u64,
    /// Image draws skipped because an asset was not ready.
    pub images_skipped: u64,
}

/// Drives a started engine with a fixed frame clock, for previews and video output.
#[derive(Clone, Debug, PartialEq)]
pub struct OfflineRun {
    fps: u32,
    frames: u64,
    enter_at: Option<Duration>,
}

impl OfflineRun {
    /// `frames` frames at `fps`.
    pub fn new(fps: u32, frames: u64) -> SplashResult<Self> {
        if fps == 0 {
            return Err(SplashError::validation("fps must be non-zero"));
        }
        Ok(Self {
            fps,
            frames,
            enter_at: None,
        })
    }

    /// Run covering `seconds` of wall time.
    pub fn for_duration(fps: u32, seconds: f64) -> SplashResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(SplashError::validation("seconds must be finite and > 0"));
        }
        Self::new(fps, (seconds * f64::from(fps)).ceil() as u64)
    }

    /// Deliver the enter click once the clock reaches `at`.
    pub fn with_enter_at(mut self, at: Duration) -> Self {
        self.enter_at = Some(at);
        self
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frames requested.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Wall time of one frame.
    pub fn frame_dt(&self) -> Duration {
        Duration::from_nanos((1_000_000_000f64 / f64::from(self.fps)).round() as u64)
    }

    /// Render every frame into `sink`.
    ///
    /// Stops early once the entry gate finishes, stopping the engine as its owner would.
    #[tracing::instrument(skip_all, fields(fps = self.fps, frames = self.frames))]
    pub fn run(
        &self,
        engine: &mut FrameScheduler<CpuSurface>,
        sink: &mut dyn FrameSink,
    ) -> SplashResult<RunStats> {
        let backing = engine
            .backing()
            .filter(|_| engine.is_running())
            .ok_or_else(|| SplashError::validation("engine must be started before rendering"))?;
        sink.begin(SinkConfig {
            width: backing.width,
            height: backing.height,
            fps: self.fps,
        })?;

        let mut stats = RunStats::default();
        if let Err(e) = self.push_frames(engine, sink, &mut stats) {
            // Release the sink even when a frame failed.
            if let Err(end_err) = sink.end() {
                tracing::warn!(error = %end_err, "sink end failed after an aborted run");
            }
            return Err(e);
        }
        sink.end()?;
        tracing::info!(frames = stats.frames, "offline run finished");
        Ok(stats)
    }

    fn push_frames(
        &self,
        engine: &mut FrameScheduler<CpuSurface>,
        sink: &mut dyn FrameSink,
        stats: &mut RunStats,
    ) -> SplashResult<()> {
        let dt = self.frame_dt();
        let mut clock = Duration::ZERO;
        let mut enter_sent = false;
        for idx in 0..self.frames {
            if let Some(at) = self.enter_at
                && !enter_sent
                && clock >= at
            {
                enter_sent = true;
                if !engine.on_enter_requested() {
                    tracing::warn!(at_ms = at.as_millis() as u64, "enter request was not accepted");
                }
            }

            let fs = engine.tick(dt);
            clock += dt;
            stats.recycled += fs.recycled as u64;
            stats.images_skipped += fs.images_skipped as u64;

            let frame = current_frame(engine)?;
            sink.push_frame(idx, &frame)?;
            stats.frames += 1;

            if fs.gate == GateState::Done {
                stats.entry_accepted = true;
                engine.stop();
                break;
            }
        }
        Ok(())
    }

    /// Advance the engine to `at` and return the frame drawn there.
    pub fn render_at(
        &self,
        engine: &mut FrameScheduler<CpuSurface>,
        at: Duration,
    ) -> SplashResult<FrameRGBA> {
        if !engine.is_running() {
            return Err(SplashError::validation(
                "engine must be started before rendering",
            ));
        }
        let dt = self.frame_dt();
        let mut clock = Duration::ZERO;
        loop {
            engine.tick(dt);
            clock += dt;
            if clock >= at {
                break;
            }
        }
        current_frame(engine)
    }
}

fn current_frame(engine: &FrameScheduler<CpuSurface>) -> SplashResult<FrameRGBA> {
    engine
        .surface()
        .ok_or_else(|| SplashError::render("engine has no surface"))?
        .frame()
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
