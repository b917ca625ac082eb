use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{SplashError, SplashResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Edge length SVG icons are rasterized at. Projected sizes stay well below this.
pub(crate) const SVG_RASTER_EDGE: u32 = 256;

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap already-premultiplied bytes, checking the length.
    pub fn from_premul_bytes(width: u32, height: u32, bytes: Vec<u8>) -> SplashResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if width == 0 || height == 0 || bytes.len() != expected {
            return Err(SplashError::asset(format!(
                "image byte len {} does not match {width}x{height}",
                bytes.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
        })
    }
}

pub(crate) fn decode_image(bytes: &[u8]) -> SplashResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage::from_premul_bytes(width, height, rgba8_premul)
}

/// Parse an SVG and rasterize it so it fits a `edge`x`edge` square, keeping its aspect ratio.
pub(crate) fn rasterize_svg(bytes: &[u8], edge: u32) -> SplashResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let (sw, sh) = (size.width(), size.height());
    if !sw.is_finite() || !sh.is_finite() || sw <= 0.0 || sh <= 0.0 {
        return Err(SplashError::asset("svg has invalid width/height"));
    }
    let fit = (edge as f32) / sw.max(sh);
    let width = ((sw * fit).round() as u32).max(1);
    let height = ((sh * fit).round() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SplashError::asset("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(fit, fit);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    PreparedImage::from_premul_bytes(width, height, pixmap.data().to_vec())
}

/// Decode by file extension: `.svg` is rasterized, everything else goes through `image`.
pub(crate) fn decode_asset(source: &str, bytes: &[u8]) -> SplashResult<PreparedImage> {
    if source.to_ascii_lowercase().ends_with(".svg") {
        rasterize_svg(bytes, SVG_RASTER_EDGE)
    } else {
        decode_image(bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
