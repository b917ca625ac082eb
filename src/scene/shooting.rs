use std::f64::consts::FRAC_PI_4;

use crate::config::settings::ShootingStyle;
use crate::foundation::core::{Point, Rgba8, Vec2, Viewport};
use crate::surface::DrawSurface;

/// Travel direction of every shooting star: 45° down and to the right.
pub const SHOOTING_ANGLE: f64 = FRAC_PI_4;

/// A short-lived diagonal streak.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShootingStar {
    /// Head position in CSS px.
    pub pos: Point,
    /// Streak length behind the head.
    pub length: f64,
    /// Travel per draw.
    pub speed: f64,
    /// Direction of travel in radians.
    pub angle: f64,
    /// Head opacity; the star is dropped once this reaches 0.
    pub opacity: f64,
}

impl ShootingStar {
    fn direction(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }

    /// End of the streak, `length` back along the direction of travel.
    pub fn tail(&self) -> Point {
        self.pos - self.direction() * self.length
    }
}

/// Owns the live shooting stars. The spawn timer lives in the frame scheduler.
#[derive(Clone, Debug)]
pub struct ShootingStarSpawner {
    style: ShootingStyle,
    live: Vec<ShootingStar>,
}

impl ShootingStarSpawner {
    /// Create an empty spawner.
    pub fn new(style: ShootingStyle) -> Self {
        Self {
            style,
            live: Vec::new(),
        }
    }

    /// Insert one star somewhere across the top half of `viewport`.
    pub fn spawn(&mut self, viewport: Viewport, rng: &mut fastrand::Rng) {
        let star = ShootingStar {
            pos: Point::new(
                rng.f64() * viewport.width,
                rng.f64() * (viewport.height / 2.0),
            ),
            length: self.style.length.sample(rng.f64()),
            speed: self.style.speed.sample(rng.f64()),
            angle: SHOOTING_ANGLE,
            opacity: 1.0,
        };
        tracing::trace!(x = star.pos.x, y = star.pos.y, "shooting star spawned");
        self.live.push(star);
    }

    /// Advance every star along its direction of travel.
    pub fn tick(&mut self) {
        for s in &mut self.live {
            s.pos += s.direction() * s.speed;
        }
    }

    /// Fade every star by one step after it was drawn, dropping the ones that reached zero
    /// opacity.
    pub fn fade(&mut self) {
        let fade = self.style.fade_per_draw;
        self.live.retain_mut(|s| {
            s.opacity -= fade;
            s.opacity > 0.0
        });
    }

    /// Stroke each streak from its head back to its tail, fading to transparent.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for s in &self.live {
            surface.stroke_gradient_line(
                s.pos,
                s.tail(),
                self.style.line_width,
                Rgba8::WHITE.with_opacity(s.opacity),
                Rgba8::rgba(255, 255, 255, 0),
            );
        }
    }

    /// Live stars.
    pub fn stars(&self) -> &[ShootingStar] {
        &self.live
    }

    /// Number of live stars.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// `true` when no star is live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/shooting.rs"]
mod tests;
