use crate::foundation::core::{Point, Rect, Viewport};

/// Result of projecting one world-space entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// `focal_length / z`.
    pub scale: f64,
    /// Screen-space center in CSS px.
    pub screen: Point,
    /// `base_size * scale`.
    pub size: f64,
}

impl Projection {
    /// `true` when the projected point lies more than one projected size outside the viewport on
    /// any side.
    pub fn is_off_screen(&self, viewport: Viewport) -> bool {
        let s = self.size;
        self.screen.x < -s
            || self.screen.x > viewport.width + s
            || self.screen.y < -s
            || self.screen.y > viewport.height + s
    }

    /// Square of edge `size` centered on the projected point.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.screen, (self.size, self.size))
    }
}

/// Single-point perspective with the vanishing point at the viewport center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveProjector {
    focal_length: f64,
}

impl PerspectiveProjector {
    /// Create a projector. `focal_length` is validated by the config layer.
    pub fn new(focal_length: f64) -> Self {
        Self { focal_length }
    }

    /// Focal length; depth at which scale is exactly 1.
    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    /// Perspective scale at depth `z` (`z > 0`).
    pub fn scale_at(&self, z: f64) -> f64 {
        debug_assert!(z > 0.0, "projected depth must be positive, got {z}");
        self.focal_length / z
    }

    /// Project world point `world` at depth `z`.
    pub fn project(&self, world: Point, z: f64, base_size: f64, viewport: Viewport) -> Projection {
        let scale = self.scale_at(z);
        let center = viewport.center();
        Projection {
            scale,
            screen: Point::new(world.x * scale + center.x, world.y * scale + center.y),
            size: base_size * scale,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/projector.rs"]
mod tests;
