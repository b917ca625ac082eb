//! The 2D drawing surface the engine paints onto.
//!
//! All coordinates are CSS pixels. Implementations apply the device pixel ratio themselves, so
//! scene code never sees device pixels.

pub mod recording;

use crate::assets::decode::PreparedImage;
use crate::assets::store::AssetId;
use crate::foundation::core::{BackingSize, Point, Rect, Rgba8};
use crate::foundation::error::SplashResult;

/// Soft shadow drawn behind an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color (straight alpha).
    pub color: Rgba8,
    /// Blur radius in CSS pixels.
    pub blur: f64,
}

/// Whole-canvas effect used by the exit transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasEffect {
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f64,
    /// Uniform scale about the viewport center.
    pub scale: f64,
}

impl CanvasEffect {
    /// No-op effect.
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        scale: 1.0,
    };

    /// `true` when drawing with this effect equals drawing without it.
    pub fn is_identity(self) -> bool {
        self.opacity >= 1.0 && self.scale == 1.0
    }
}

/// A 2D drawing surface.
///
/// Draw calls are infallible: a surface that cannot honor a call drops it. Only reallocation
/// (`resize`) can fail.
pub trait DrawSurface {
    /// Reallocate the backing store for a new viewport/pixel ratio.
    fn resize(&mut self, backing: BackingSize) -> SplashResult<()>;

    /// Start recording a frame.
    fn begin_frame(&mut self);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8);

    /// Stroke a straight line whose color fades linearly from `from_color` to `to_color`.
    fn stroke_gradient_line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        from_color: Rgba8,
        to_color: Rgba8,
    );

    /// Draw `image` stretched into `rect`, clipped to a rounded rectangle of corner `radius`.
    fn draw_image_rounded(
        &mut self,
        id: AssetId,
        image: &PreparedImage,
        rect: Rect,
        radius: f64,
        opacity: f64,
        shadow: Option<Shadow>,
    );

    /// Fill `text` centered on `center` at `font_px`.
    fn fill_text(&mut self, text: &str, center: Point, font_px: f64, color: Rgba8);

    /// Apply `effect` to everything drawn until the matching [`DrawSurface::pop_canvas_effect`].
    fn push_canvas_effect(&mut self, effect: CanvasEffect);

    /// End the innermost canvas effect.
    fn pop_canvas_effect(&mut self);

    /// Finish the frame (rasterize, present, ...).
    fn end_frame(&mut self);
}
