//! Stardrift is a procedural splash-screen animation engine.
//!
//! A twinkling star field, periodic shooting stars and a swarm of "falling memories" (phrases,
//! photos and an icon) receding toward the viewer through a single-point perspective. The host
//! owns the clock and the display:
//!
//! - Build a [`FrameScheduler`] from a [`SplashConfig`] and the [`SceneAssets`] it draws
//! - [`start`](FrameScheduler::start) it on any [`DrawSurface`] with the current [`HostEnv`]
//! - Call [`tick`](FrameScheduler::tick) once per display frame, forward resizes and the enter
//!   click, and [`stop`](FrameScheduler::stop) it once the entry callback has run
//!
//! [`CpuSurface`] rasterizes frames with `vello_cpu`; [`OfflineRun`] drives an engine with a
//! fixed clock into a [`FrameSink`] for PNG or MP4 output.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod engine;
mod foundation;
mod render;
mod scene;

/// Frame sinks for offline rendering.
pub mod encode;
pub mod surface;

pub use crate::foundation::core::{
    Affine, BackingSize, DeviceClass, HostEnv, Point, Rect, Rgba8, Vec2, Viewport,
};
pub use crate::foundation::ease::Ease;
pub use crate::foundation::error::{SplashError, SplashResult};

pub use crate::assets::decode::PreparedImage;
pub use crate::assets::store::{AssetHandle, AssetId, AssetStore, SceneAssets};
pub use crate::config::settings::{
    DeviceTunables, FallingStyle, GateTimings, ShootingStyle, SpeedRange, SplashConfig,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::engine::gate::{Affordance, EntryCallback, EntryGate, GateState};
pub use crate::engine::scheduler::{FrameScheduler, FrameStats, Lifecycle};
pub use crate::engine::timer::{IntervalTimer, MAX_CATCH_UP};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::pipeline::{OfflineRun, RunStats};
pub use crate::scene::falling::{
    ElementContent, ElementKind, FallingElement, FallingElementPool, KIND_TABLE, PoolTick,
    select_kind,
};
pub use crate::scene::palette::ColorCycler;
pub use crate::scene::projector::{PerspectiveProjector, Projection};
pub use crate::scene::shooting::{SHOOTING_ANGLE, ShootingStar, ShootingStarSpawner};
pub use crate::scene::stars::{Star, StarField};
pub use crate::surface::recording::{DrawCmd, RecordingSurface};
pub use crate::surface::{CanvasEffect, DrawSurface, Shadow};
