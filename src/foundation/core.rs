use crate::foundation::error::{SplashError, SplashResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a validated viewport with finite, non-negative extents.
    pub fn new(width: f64, height: f64) -> SplashResult<Self> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(SplashError::validation(
                "viewport width/height must be finite and >= 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Center of the viewport, the vanishing point of the perspective projection.
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Full viewport rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Coarse device class used to pick per-device tunables.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Narrow viewports; cheaper settings.
    Mobile,
    /// Everything else.
    Desktop,
}

impl DeviceClass {
    /// Classify a viewport: anything narrower than `mobile_max_width` is mobile.
    pub fn classify(viewport: Viewport, mobile_max_width: f64) -> Self {
        if viewport.width < mobile_max_width {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// Return `true` for [`DeviceClass::Mobile`].
    pub fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }
}

/// What the host reports about the display: viewport size and device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostEnv {
    /// Current viewport in CSS pixels.
    pub viewport: Viewport,
    /// Raw device pixel ratio reported by the display.
    pub device_pixel_ratio: f64,
}

impl HostEnv {
    /// Convenience constructor for tests and offline hosts.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> SplashResult<Self> {
        if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
            return Err(SplashError::validation(
                "device pixel ratio must be finite and > 0",
            ));
        }
        Ok(Self {
            viewport: Viewport::new(width, height)?,
            device_pixel_ratio,
        })
    }
}

/// Resolution of the backing pixel buffer behind the CSS-sized viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackingSize {
    /// Backing width in device pixels.
    pub width: u32,
    /// Backing height in device pixels.
    pub height: u32,
    /// Effective pixel ratio (already capped).
    pub dpr: f64,
}

impl BackingSize {
    /// Compute the backing size for `viewport` at the effective ratio `dpr`.
    pub fn for_viewport(viewport: Viewport, dpr: f64) -> Self {
        Self {
            width: (viewport.width * dpr).floor().max(0.0) as u32,
            height: (viewport.height * dpr).floor().max(0.0) as u32,
            dpr,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (not premultiplied into r/g/b).
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color from three channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: ((self.a as f64) * o).round() as u8,
            ..self
        }
    }

    /// Per-channel linear interpolation, rounded to the nearest integer.
    ///
    /// `t == 0` returns `self` exactly and `t == 1` returns `other` exactly.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let af = a as f64;
            let bf = b as f64;
            (af + t * (bf - af)).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Premultiply into `[r, g, b, a]` bytes.
    pub fn to_premul_array(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
