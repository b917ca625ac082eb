use std::time::Duration;

use crate::assets::store::SceneAssets;
use crate::config::settings::SplashConfig;
use crate::engine::gate::{Affordance, EntryGate, GateState};
use crate::engine::timer::IntervalTimer;
use crate::foundation::core::{BackingSize, DeviceClass, HostEnv, Viewport};
use crate::foundation::error::SplashResult;
use crate::scene::falling::FallingElementPool;
use crate::scene::palette::ColorCycler;
use crate::scene::projector::PerspectiveProjector;
use crate::scene::shooting::ShootingStarSpawner;
use crate::scene::stars::StarField;
use crate::surface::DrawSurface;

/// Where a [`FrameScheduler`] is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Constructed; `start` has not succeeded yet.
    NotStarted,
    /// Drawing on every tick.
    Running,
    /// Stopped; ticks, resizes and clicks are ignored.
    Stopped,
}

/// What one [`FrameScheduler::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStats {
    /// Whether a frame was drawn.
    pub drawn: bool,
    /// Frames drawn so far, this one included.
    pub frame: u64,
    /// Background stars.
    pub stars: usize,
    /// Live shooting stars after the draw pass.
    pub shooting_stars: usize,
    /// Live falling elements after the draw pass.
    pub falling: usize,
    /// Shooting stars spawned by the timer this tick.
    pub shooting_spawned: u32,
    /// Falling elements spawned by the timer this tick.
    pub falling_spawned: u32,
    /// Timer spawns dropped because the pool was full.
    pub spawns_dropped: u32,
    /// Falling elements recycled this tick.
    pub recycled: usize,
    /// Image draws skipped because the asset was not ready.
    pub images_skipped: usize,
    /// Gate state after this tick.
    pub gate: GateState,
}

struct Timers {
    shooting: IntervalTimer,
    spawn: IntervalTimer,
}

/// Drives the splash scene: one update and draw pass per [`tick`](FrameScheduler::tick).
///
/// The host owns the clock and calls `tick` once per display frame with the elapsed wall time.
/// Entity motion advances once per draw pass; spawn timers and the entry gate advance by `dt`.
pub struct FrameScheduler<S: DrawSurface> {
    config: SplashConfig,
    assets: SceneAssets,
    rng: fastrand::Rng,
    lifecycle: Lifecycle,
    surface: Option<S>,
    env: Option<HostEnv>,
    device: DeviceClass,
    backing: Option<BackingSize>,
    timers: Option<Timers>,
    frames: u64,
    projector: PerspectiveProjector,
    cycler: ColorCycler,
    stars: StarField,
    shooting: ShootingStarSpawner,
    pool: FallingElementPool,
    gate: EntryGate,
}

impl<S: DrawSurface> FrameScheduler<S> {
    /// Build an engine. Nothing runs until [`start`](Self::start).
    pub fn new(
        config: SplashConfig,
        assets: SceneAssets,
        on_entry_accepted: impl FnOnce() + 'static,
    ) -> SplashResult<Self> {
        config.validate()?;
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let projector = PerspectiveProjector::new(config.focal_length);
        let device = DeviceClass::Desktop;
        let pool = Self::make_pool(&config, projector, device, assets.photos.len());
        Ok(Self {
            cycler: ColorCycler::new(config.palette.clone(), config.palette_step),
            shooting: ShootingStarSpawner::new(config.shooting.clone()),
            gate: EntryGate::new(config.gate.clone(), Box::new(on_entry_accepted)),
            stars: StarField::new(),
            config,
            assets,
            rng,
            lifecycle: Lifecycle::NotStarted,
            surface: None,
            env: None,
            device,
            backing: None,
            timers: None,
            frames: 0,
            projector,
            pool,
        })
    }

    fn make_pool(
        config: &SplashConfig,
        projector: PerspectiveProjector,
        device: DeviceClass,
        photo_count: usize,
    ) -> FallingElementPool {
        FallingElementPool::new(
            projector,
            config.falling.clone(),
            config.tunables(device).clone(),
            config.phrases.len(),
            photo_count,
        )
    }

    /// Begin animating onto `surface`.
    ///
    /// A missing surface leaves the engine untouched. Fails only if the surface cannot be sized
    /// for `env`, in which case the engine stays unstarted.
    #[tracing::instrument(skip_all, fields(width = env.viewport.width, height = env.viewport.height))]
    pub fn start(&mut self, surface: Option<S>, env: HostEnv) -> SplashResult<()> {
        let Some(mut surface) = surface else {
            tracing::debug!("no drawing surface; start skipped");
            return Ok(());
        };
        if self.lifecycle != Lifecycle::NotStarted {
            tracing::warn!(lifecycle = ?self.lifecycle, "start ignored");
            return Ok(());
        }

        let device = DeviceClass::classify(env.viewport, self.config.mobile_max_width);
        let tunables = self.config.tunables(device).clone();
        let backing = BackingSize::for_viewport(
            env.viewport,
            self.config.effective_dpr(device, env.device_pixel_ratio),
        );
        surface.resize(backing)?;

        self.stars
            .regenerate(env.viewport, tunables.star_count, &mut self.rng);
        self.pool = Self::make_pool(
            &self.config,
            self.projector,
            device,
            self.assets.photos.len(),
        );
        self.pool
            .seed(tunables.initial_elements, env.viewport, &mut self.rng);
        self.timers = Some(Timers {
            shooting: IntervalTimer::new(tunables.shooting_interval()),
            spawn: IntervalTimer::new(tunables.spawn_interval()),
        });

        self.device = device;
        self.backing = Some(backing);
        self.env = Some(env);
        self.surface = Some(surface);
        self.lifecycle = Lifecycle::Running;
        tracing::info!(
            device = ?device,
            backing_width = backing.width,
            backing_height = backing.height,
            dpr = backing.dpr,
            "splash engine started"
        );
        Ok(())
    }

    /// Viewport or pixel-ratio change reported by the host.
    ///
    /// Resizes the backing surface and regenerates the star field for the new viewport; falling
    /// elements keep their world positions. If the surface cannot be resized the engine keeps
    /// its previous size and the error is returned.
    #[tracing::instrument(skip_all, fields(width = env.viewport.width, height = env.viewport.height))]
    pub fn on_resize(&mut self, env: HostEnv) -> SplashResult<()> {
        if self.lifecycle != Lifecycle::Running {
            tracing::trace!("resize ignored while not running");
            return Ok(());
        }
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        let device = DeviceClass::classify(env.viewport, self.config.mobile_max_width);
        let tunables = self.config.tunables(device);
        let backing = BackingSize::for_viewport(
            env.viewport,
            self.config.effective_dpr(device, env.device_pixel_ratio),
        );
        if let Err(e) = surface.resize(backing) {
            tracing::warn!(error = %e, "surface resize failed; keeping previous size");
            return Err(e);
        }

        self.stars
            .regenerate(env.viewport, tunables.star_count, &mut self.rng);
        tracing::debug!(
            device = ?device,
            stars = self.stars.len(),
            backing_width = backing.width,
            backing_height = backing.height,
            "star field regenerated"
        );
        self.backing = Some(backing);
        self.env = Some(env);
        Ok(())
    }

    /// Run one frame: advance timers and the gate by `dt`, then update and draw every layer.
    pub fn tick(&mut self, dt: Duration) -> FrameStats {
        let mut stats = self.idle_stats();
        if self.lifecycle != Lifecycle::Running {
            return stats;
        }
        let (Some(surface), Some(env), Some(timers)) =
            (self.surface.as_mut(), self.env, self.timers.as_mut())
        else {
            return stats;
        };
        let viewport = env.viewport;

        self.gate.tick(dt);

        stats.shooting_spawned = timers.shooting.advance(dt);
        for _ in 0..stats.shooting_spawned {
            self.shooting.spawn(viewport, &mut self.rng);
        }
        for _ in 0..timers.spawn.advance(dt) {
            match self.pool.spawn(viewport, &mut self.rng) {
                Some(_) => stats.falling_spawned += 1,
                None => stats.spawns_dropped += 1,
            }
        }

        surface.begin_frame();
        surface.clear();
        let effect = self.gate.canvas_effect();
        let scoped = !effect.is_identity();
        if scoped {
            surface.push_canvas_effect(effect);
        }
        surface.fill_rect(viewport.rect(), self.config.background);

        self.stars.tick();
        self.stars.draw(surface);

        self.shooting.tick();
        self.shooting.draw(surface);
        self.shooting.fade();

        stats.recycled = self.pool.tick(viewport, &mut self.rng).recycled();
        stats.images_skipped = self.pool.draw(
            surface,
            viewport,
            &self.config.phrases,
            &self.assets,
            self.cycler.current_color(),
        );
        self.cycler.tick();

        if scoped {
            surface.pop_canvas_effect();
        }
        surface.end_frame();

        self.frames += 1;
        stats.drawn = true;
        stats.frame = self.frames;
        stats.stars = self.stars.len();
        stats.shooting_stars = self.shooting.len();
        stats.falling = self.pool.len();
        stats.gate = self.gate.state();
        stats
    }

    fn idle_stats(&self) -> FrameStats {
        FrameStats {
            drawn: false,
            frame: self.frames,
            stars: self.stars.len(),
            shooting_stars: self.shooting.len(),
            falling: self.pool.len(),
            shooting_spawned: 0,
            falling_spawned: 0,
            spawns_dropped: 0,
            recycled: 0,
            images_skipped: 0,
            gate: self.gate.state(),
        }
    }

    /// The enter click. Returns `true` when it started the exit transition.
    pub fn on_enter_requested(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Running {
            return false;
        }
        self.gate.on_enter_requested()
    }

    /// Cancel the frame loop, the spawn timers and resize handling. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }
        self.timers = None;
        self.lifecycle = Lifecycle::Stopped;
        tracing::info!(frames = self.frames, "splash engine stopped");
    }

    /// Current lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// `true` while running.
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Gate state.
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Enter button state for the host.
    pub fn affordance(&self) -> Affordance {
        self.gate.affordance()
    }

    /// Device class chosen at start.
    pub fn device_class(&self) -> DeviceClass {
        self.device
    }

    /// Current viewport, once started.
    pub fn viewport(&self) -> Option<Viewport> {
        self.env.map(|e| e.viewport)
    }

    /// Current backing size, once started.
    pub fn backing(&self) -> Option<BackingSize> {
        self.backing
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Configuration in use.
    pub fn config(&self) -> &SplashConfig {
        &self.config
    }

    /// Background stars.
    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    /// Live shooting stars.
    pub fn shooting(&self) -> &ShootingStarSpawner {
        &self.shooting
    }

    /// Falling elements.
    pub fn pool(&self) -> &FallingElementPool {
        &self.pool
    }

    /// Phrase color cycler.
    pub fn cycler(&self) -> &ColorCycler {
        &self.cycler
    }

    /// The surface, once started.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Mutable access to the surface, once started.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Consume the engine and hand the surface back.
    pub fn into_surface(self) -> Option<S> {
        self.surface
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
