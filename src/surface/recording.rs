//! Surface that records draw calls, for tests and debugging hosts.

use crate::assets::decode::PreparedImage;
use crate::assets::store::AssetId;
use crate::foundation::core::{BackingSize, Point, Rect, Rgba8};
use crate::foundation::error::SplashResult;
use crate::surface::{CanvasEffect, DrawSurface, Shadow};

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    /// [`DrawSurface::clear`].
    Clear,
    /// [`DrawSurface::fill_rect`].
    FillRect {
        /// Target rectangle.
        rect: Rect,
        /// Fill color.
        color: Rgba8,
    },
    /// [`DrawSurface::fill_circle`].
    FillCircle {
        /// Circle center.
        center: Point,
        /// Circle radius.
        radius: f64,
        /// Fill color.
        color: Rgba8,
    },
    /// [`DrawSurface::stroke_gradient_line`].
    GradientLine {
        /// Start point (gradient start).
        from: Point,
        /// End point (gradient end).
        to: Point,
        /// Stroke width.
        width: f64,
        /// Color at `from`.
        from_color: Rgba8,
        /// Color at `to`.
        to_color: Rgba8,
    },
    /// [`DrawSurface::draw_image_rounded`].
    Image {
        /// Asset drawn.
        id: AssetId,
        /// Destination rectangle.
        rect: Rect,
        /// Corner radius.
        radius: f64,
        /// Opacity.
        opacity: f64,
        /// Optional shadow.
        shadow: Option<Shadow>,
    },
    /// [`DrawSurface::fill_text`].
    Text {
        /// Text drawn.
        text: String,
        /// Center point.
        center: Point,
        /// Font size in CSS px.
        font_px: f64,
        /// Fill color.
        color: Rgba8,
    },
    /// [`DrawSurface::push_canvas_effect`].
    PushEffect(CanvasEffect),
    /// [`DrawSurface::pop_canvas_effect`].
    PopEffect,
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Used by tests and for debugging hosts; `commands` holds the calls of the latest frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Commands of the frame in progress (or the last finished one).
    pub commands: Vec<DrawCmd>,
    /// Every backing size the surface was resized to, in order.
    pub resizes: Vec<BackingSize>,
    /// Number of frames begun.
    pub frames_begun: u64,
    /// Number of frames ended.
    pub frames_ended: u64,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl DrawSurface for RecordingSurface {
    fn resize(&mut self, backing: BackingSize) -> SplashResult<()> {
        self.resizes.push(backing);
        Ok(())
    }

    fn begin_frame(&mut self) {
        self.commands.clear();
        self.frames_begun += 1;
    }

    fn clear(&mut self) {
        self.commands.push(DrawCmd::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.commands.push(DrawCmd::FillRect { rect, color });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        self.commands.push(DrawCmd::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_gradient_line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        from_color: Rgba8,
        to_color: Rgba8,
    ) {
        self.commands.push(DrawCmd::GradientLine {
            from,
            to,
            width,
            from_color,
            to_color,
        });
    }

    fn draw_image_rounded(
        &mut self,
        id: AssetId,
        _image: &PreparedImage,
        rect: Rect,
        radius: f64,
        opacity: f64,
        shadow: Option<Shadow>,
    ) {
        self.commands.push(DrawCmd::Image {
            id,
            rect,
            radius,
            opacity,
            shadow,
        });
    }

    fn fill_text(&mut self, text: &str, center: Point, font_px: f64, color: Rgba8) {
        self.commands.push(DrawCmd::Text {
            text: text.to_owned(),
            center,
            font_px,
            color,
        });
    }

    fn push_canvas_effect(&mut self, effect: CanvasEffect) {
        self.commands.push(DrawCmd::PushEffect(effect));
    }

    fn pop_canvas_effect(&mut self) {
        self.commands.push(DrawCmd::PopEffect);
    }

    fn end_frame(&mut self) {
        self.frames_ended += 1;
    }
}
