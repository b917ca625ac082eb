use std::collections::HashMap;
use std::sync::Arc;

use vello_cpu::kurbo::Shape as _;

use crate::assets::decode::PreparedImage;
use crate::assets::store::AssetId;
use crate::foundation::core::{Affine, BackingSize, Point, Rect, Rgba8};
use crate::foundation::error::{SplashError, SplashResult};
use crate::render::frame::FrameRGBA;
use crate::surface::{CanvasEffect, DrawSurface, Shadow};

/// Font size text layouts are shaped at; draws scale from here.
const TEXT_REF_PX: f32 = 64.0;
/// Texels along a cached streak gradient.
const GRADIENT_TEXELS: u32 = 64;
/// Concentric passes used to approximate a soft shadow.
const SHADOW_PASSES: u32 = 4;
const PATH_TOLERANCE: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct GlyphBrush;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    start: [u8; 4],
    end: [u8; 4],
}

struct ShapedText {
    layout: parley::Layout<GlyphBrush>,
    width: f64,
    height: f64,
}

struct TextShaper {
    font: vello_cpu::peniko::FontData,
    family: String,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    cache: HashMap<String, Arc<ShapedText>>,
}

impl TextShaper {
    fn new(font_bytes: &[u8]) -> SplashResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SplashError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SplashError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
                0,
            ),
            family,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            cache: HashMap::new(),
        })
    }

    fn shape(&mut self, text: &str) -> Arc<ShapedText> {
        if let Some(s) = self.cache.get(text) {
            return s.clone();
        }
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(TEXT_REF_PX));
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush));
        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);

        let shaped = Arc::new(ShapedText {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            layout,
        });
        self.cache.insert(text.to_owned(), shaped.clone());
        shaped
    }
}

struct Frame {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    backing: BackingSize,
}

struct EffectScope {
    saved: Affine,
    layer: bool,
}

/// [`DrawSurface`] rasterizing with `vello_cpu`.
///
/// Draw calls are recorded between `begin_frame` and `end_frame`; `end_frame` rasterizes into an
/// internal pixmap that [`CpuSurface::frame`] copies out.
pub struct CpuSurface {
    frame: Option<Frame>,
    transform: Affine,
    effects: Vec<EffectScope>,
    images: HashMap<AssetId, (vello_cpu::Image, u32, u32)>,
    gradients: HashMap<GradientKey, vello_cpu::Image>,
    text: Option<TextShaper>,
    warned_no_font: bool,
}

impl Default for CpuSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSurface {
    /// Surface without a font; phrases are skipped.
    pub fn new() -> Self {
        Self {
            frame: None,
            transform: Affine::IDENTITY,
            effects: Vec::new(),
            images: HashMap::new(),
            gradients: HashMap::new(),
            text: None,
            warned_no_font: false,
        }
    }

    /// Surface that draws phrases with the given TTF/OTF bytes.
    pub fn with_font(font_bytes: &[u8]) -> SplashResult<Self> {
        let mut s = Self::new();
        s.text = Some(TextShaper::new(font_bytes)?);
        Ok(s)
    }

    /// Current backing size, once resized.
    pub fn backing(&self) -> Option<BackingSize> {
        self.frame.as_ref().map(|f| f.backing)
    }

    /// Copy of the last rasterized frame.
    pub fn frame(&self) -> SplashResult<FrameRGBA> {
        let f = self
            .frame
            .as_ref()
            .ok_or_else(|| SplashError::render("surface has not been sized yet"))?;
        Ok(FrameRGBA {
            width: u32::from(f.pixmap.width()),
            height: u32::from(f.pixmap.height()),
            data: f.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn base_transform(&self) -> Affine {
        self.frame
            .as_ref()
            .map_or(Affine::IDENTITY, |f| Affine::scale(f.backing.dpr))
    }

    fn gradient_paint(&mut self, start: Rgba8, end: Rgba8) -> SplashResult<vello_cpu::Image> {
        let key = GradientKey {
            start: start.to_premul_array(),
            end: end.to_premul_array(),
        };
        if let Some(img) = self.gradients.get(&key).cloned() {
            return Ok(img);
        }
        let n = GRADIENT_TEXELS;
        let mut bytes = Vec::with_capacity((n as usize) * 4);
        for x in 0..n {
            let t = f64::from(x) / f64::from(n - 1);
            bytes.extend_from_slice(&start.lerp(end, t).to_premul_array());
        }
        let img = image_from_premul(&bytes, n, 1)?;
        self.gradients.insert(key, img.clone());
        Ok(img)
    }

    fn image_paint(
        &mut self,
        id: AssetId,
        image: &PreparedImage,
    ) -> SplashResult<(vello_cpu::Image, u32, u32)> {
        if let Some(p) = self.images.get(&id).cloned() {
            return Ok(p);
        }
        let paint = image_from_premul(&image.rgba8_premul, image.width, image.height)?;
        let out = (paint, image.width, image.height);
        self.images.insert(id, out.clone());
        Ok(out)
    }

    fn with_opacity(&mut self, opacity: f64, f: impl FnOnce(&mut vello_cpu::RenderContext)) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let layer = opacity < 1.0;
        if layer {
            frame.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0) as f32);
        }
        f(&mut frame.ctx);
        if layer {
            frame.ctx.pop_layer();
        }
    }
}

impl DrawSurface for CpuSurface {
    fn resize(&mut self, backing: BackingSize) -> SplashResult<()> {
        let to_u16 = |v: u32, what: &str| -> SplashResult<u16> {
            let v: u16 = v
                .try_into()
                .map_err(|_| SplashError::render(format!("backing {what} {v} exceeds u16")))?;
            if v == 0 {
                return Err(SplashError::render(format!("backing {what} must be non-zero")));
            }
            Ok(v)
        };
        let w = to_u16(backing.width, "width")?;
        let h = to_u16(backing.height, "height")?;

        self.frame = Some(Frame {
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            backing,
        });
        self.transform = self.base_transform();
        self.effects.clear();
        tracing::debug!(width = w, height = h, dpr = backing.dpr, "cpu surface resized");
        Ok(())
    }

    fn begin_frame(&mut self) {
        if let Some(f) = self.frame.as_mut() {
            f.ctx.reset();
        }
        self.transform = self.base_transform();
        self.effects.clear();
    }

    fn clear(&mut self) {
        if let Some(f) = self.frame.as_mut() {
            f.ctx.reset();
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        let tr = self.transform;
        let Some(f) = self.frame.as_mut() else {
            return;
        };
        f.ctx.set_transform(affine_to_cpu(tr));
        f.ctx.set_paint(color_to_cpu(color));
        f.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        let tr = self.transform;
        let Some(f) = self.frame.as_mut() else {
            return;
        };
        let path = vello_cpu::kurbo::Circle::new((center.x, center.y), radius).to_path(PATH_TOLERANCE);
        f.ctx.set_transform(affine_to_cpu(tr));
        f.ctx.set_paint(color_to_cpu(color));
        f.ctx.fill_path(&path);
    }

    fn stroke_gradient_line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        from_color: Rgba8,
        to_color: Rgba8,
    ) {
        let d = to - from;
        let len = d.hypot();
        if len <= f64::EPSILON || width <= 0.0 || self.frame.is_none() {
            return;
        }
        let paint = match self.gradient_paint(from_color, to_color) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "gradient paint failed");
                return;
            }
        };
        // Streak space: x runs from `from` to `to`, y across the stroke.
        let tr = self.transform * Affine::translate(from.to_vec2()) * Affine::rotate(d.atan2());
        let paint_tr = Affine::translate((0.0, -width / 2.0))
            * Affine::scale_non_uniform(len / f64::from(GRADIENT_TEXELS), width);
        let Some(f) = self.frame.as_mut() else {
            return;
        };
        f.ctx.set_transform(affine_to_cpu(tr));
        f.ctx.set_paint(paint);
        f.ctx.set_paint_transform(affine_to_cpu(paint_tr));
        f.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, -width / 2.0, len, width / 2.0));
        f.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn draw_image_rounded(
        &mut self,
        id: AssetId,
        image: &PreparedImage,
        rect: Rect,
        radius: f64,
        opacity: f64,
        shadow: Option<Shadow>,
    ) {
        if self.frame.is_none() || opacity <= 0.0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let (paint, iw, ih) = match self.image_paint(id, image) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(asset = id.0, error = %e, "image paint failed");
                return;
            }
        };
        let tr = affine_to_cpu(self.transform);
        let rounded = |r: Rect, radius: f64| {
            vello_cpu::kurbo::RoundedRect::new(r.x0, r.y0, r.x1, r.y1, radius)
                .to_path(PATH_TOLERANCE)
        };

        self.with_opacity(opacity, |ctx| {
            ctx.set_transform(tr);
            if let Some(s) = shadow
                && s.blur > 0.0
                && s.color.a > 0
            {
                // Concentric translucent rings stand in for a gaussian blur.
                for i in (1..=SHADOW_PASSES).rev() {
                    let grow = s.blur * f64::from(i) / f64::from(SHADOW_PASSES);
                    let alpha = 1.0 / f64::from(SHADOW_PASSES + 1);
                    ctx.set_paint(color_to_cpu(s.color.with_opacity(alpha)));
                    ctx.fill_path(&rounded(rect.inflate(grow, grow), radius + grow));
                }
            }

            let sx = rect.width() / f64::from(iw.max(1));
            let sy = rect.height() / f64::from(ih.max(1));
            ctx.set_paint(paint);
            ctx.set_paint_transform(affine_to_cpu(
                Affine::translate((rect.x0, rect.y0)) * Affine::scale_non_uniform(sx, sy),
            ));
            ctx.fill_path(&rounded(rect, radius));
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        });
    }

    fn fill_text(&mut self, text: &str, center: Point, font_px: f64, color: Rgba8) {
        if self.frame.is_none() || text.is_empty() || color.a == 0 {
            return;
        }
        let Some(shaper) = self.text.as_mut() else {
            if !self.warned_no_font {
                tracing::warn!("no font configured; phrases are not drawn");
                self.warned_no_font = true;
            }
            return;
        };
        let shaped = shaper.shape(text);
        let font = shaper.font.clone();

        let k = font_px / f64::from(TEXT_REF_PX);
        let tr = self.transform
            * Affine::translate(center.to_vec2())
            * Affine::scale(k)
            * Affine::translate((-shaped.width / 2.0, -shaped.height / 2.0));
        let Some(f) = self.frame.as_mut() else {
            return;
        };
        f.ctx.set_transform(affine_to_cpu(tr));
        f.ctx.set_paint(color_to_cpu(color));
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                f.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    fn push_canvas_effect(&mut self, effect: CanvasEffect) {
        let saved = self.transform;
        let layer = effect.opacity < 1.0 && self.frame.is_some();
        if let Some(f) = self.frame.as_mut() {
            if layer {
                f.ctx.push_opacity_layer(effect.opacity.clamp(0.0, 1.0) as f32);
            }
            let b = f.backing;
            let c = Point::new(
                f64::from(b.width) / b.dpr / 2.0,
                f64::from(b.height) / b.dpr / 2.0,
            );
            self.transform = saved
                * Affine::translate(c.to_vec2())
                * Affine::scale(effect.scale)
                * Affine::translate(-c.to_vec2());
        }
        self.effects.push(EffectScope { saved, layer });
    }

    fn pop_canvas_effect(&mut self) {
        let Some(scope) = self.effects.pop() else {
            return;
        };
        self.transform = scope.saved;
        if scope.layer
            && let Some(f) = self.frame.as_mut()
        {
            f.ctx.pop_layer();
        }
    }

    fn end_frame(&mut self) {
        while !self.effects.is_empty() {
            self.pop_canvas_effect();
        }
        let Some(f) = self.frame.as_mut() else {
            return;
        };
        f.ctx.flush();
        f.pixmap.data_as_u8_slice_mut().fill(0);
        f.ctx.render_to_pixmap(&mut f.pixmap);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn image_from_premul(bytes: &[u8], width: u32, height: u32) -> SplashResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SplashError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SplashError::render("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SplashError::render("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
