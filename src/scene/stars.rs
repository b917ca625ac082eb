use crate::foundation::core::{Point, Rgba8, Viewport};
use crate::surface::DrawSurface;

/// One twinkling background star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// Screen position in CSS px.
    pub pos: Point,
    /// Radius in CSS px.
    pub radius: f64,
    /// Current opacity in `[0, 1]`.
    pub alpha: f64,
    /// Signed opacity change per draw.
    pub delta: f64,
}

/// Fixed-count set of twinkling stars, regenerated on every resize.
#[derive(Clone, Debug, Default)]
pub struct StarField {
    stars: Vec<Star>,
    bounds: Option<Viewport>,
}

impl StarField {
    /// Empty field; call [`StarField::regenerate`] before drawing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every star with `count` fresh ones spread uniformly over `viewport`.
    pub fn regenerate(&mut self, viewport: Viewport, count: usize, rng: &mut fastrand::Rng) {
        self.stars.clear();
        self.stars.extend((0..count).map(|_| Star {
            pos: Point::new(rng.f64() * viewport.width, rng.f64() * viewport.height),
            radius: rng.f64() * 1.5 + 0.5,
            alpha: rng.f64(),
            delta: rng.f64() * 0.02 + 0.005,
        }));
        self.bounds = Some(viewport);
    }

    /// Step every star's opacity, reflecting at the `[0, 1]` bounds.
    pub fn tick(&mut self) {
        for s in &mut self.stars {
            s.alpha += s.delta;
            if s.alpha <= 0.0 || s.alpha >= 1.0 {
                s.alpha = s.alpha.clamp(0.0, 1.0);
                s.delta = -s.delta;
            }
        }
    }

    /// Paint every star as a white disc at its current opacity.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for s in &self.stars {
            surface.fill_circle(s.pos, s.radius, Rgba8::WHITE.with_opacity(s.alpha));
        }
    }

    /// Current stars.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Number of stars.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    /// `true` before the first regeneration (or with a zero count).
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Viewport of the last regeneration.
    pub fn bounds(&self) -> Option<Viewport> {
        self.bounds
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stars.rs"]
mod tests;
