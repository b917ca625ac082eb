use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{DeviceClass, Rgba8};
use crate::foundation::ease::Ease;
use crate::foundation::error::{SplashError, SplashResult};

/// Half-open range `[min, max)` a per-entity value is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    /// Inclusive lower bound.
    pub min: f64,
    /// Exclusive upper bound.
    pub max: f64,
}

impl SpeedRange {
    /// Construct a range; validation happens in [`SplashConfig::validate`].
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Map a uniform sample `u` in `[0, 1)` into this range.
    pub fn sample(self, u: f64) -> f64 {
        self.min + u * (self.max - self.min)
    }

    fn validate(self, what: &str) -> SplashResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SplashError::validation(format!(
                "{what} range must be finite with min <= max"
            )));
        }
        Ok(())
    }
}

/// Tunables that differ between mobile and desktop device classes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceTunables {
    /// Background stars generated on every (re)size.
    pub star_count: usize,
    /// Milliseconds between shooting-star spawns.
    pub shooting_interval_ms: u64,
    /// Milliseconds between falling-element spawns.
    pub spawn_interval_ms: u64,
    /// Falling elements seeded when the engine starts.
    pub initial_elements: usize,
    /// Upper bound on simultaneously live falling elements.
    pub pool_capacity: usize,
    /// Base display size of phrases (font px at scale 1).
    pub phrase_size: f64,
    /// Base display size of photos.
    pub photo_size: f64,
    /// Base display size of the decorative icon.
    pub icon_size: f64,
    /// Depth units a falling element recedes per draw.
    pub recession_speed: SpeedRange,
    /// Pixel ratio of the backing surface: an upper bound on desktop, used as-is on mobile.
    pub dpr_cap: f64,
}

impl DeviceTunables {
    /// Observed mobile values.
    pub fn mobile() -> Self {
        Self {
            star_count: 40,
            shooting_interval_ms: 1500,
            spawn_interval_ms: 150,
            initial_elements: 30,
            pool_capacity: 120,
            phrase_size: 25.0,
            photo_size: 60.0,
            icon_size: 45.0,
            recession_speed: SpeedRange::new(1.0, 2.5),
            dpr_cap: 1.0,
        }
    }

    /// Observed desktop values.
    pub fn desktop() -> Self {
        Self {
            star_count: 100,
            shooting_interval_ms: 900,
            spawn_interval_ms: 100,
            initial_elements: 50,
            pool_capacity: 240,
            phrase_size: 30.0,
            photo_size: 90.0,
            icon_size: 65.0,
            recession_speed: SpeedRange::new(1.0, 3.0),
            dpr_cap: 1.5,
        }
    }

    /// Spawn interval for shooting stars.
    pub fn shooting_interval(&self) -> Duration {
        Duration::from_millis(self.shooting_interval_ms)
    }

    /// Spawn interval for falling elements.
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    fn validate(&self, which: &str) -> SplashResult<()> {
        if self.shooting_interval_ms == 0 || self.spawn_interval_ms == 0 {
            return Err(SplashError::validation(format!(
                "{which}: spawn intervals must be > 0 ms"
            )));
        }
        if self.pool_capacity == 0 {
            return Err(SplashError::validation(format!(
                "{which}: pool_capacity must be > 0"
            )));
        }
        for (name, v) in [
            ("phrase_size", self.phrase_size),
            ("photo_size", self.photo_size),
            ("icon_size", self.icon_size),
            ("dpr_cap", self.dpr_cap),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SplashError::validation(format!(
                    "{which}: {name} must be finite and > 0"
                )));
            }
        }
        self.recession_speed
            .validate(&format!("{which}: recession_speed"))?;
        if self.recession_speed.min <= 0.0 {
            return Err(SplashError::validation(format!(
                "{which}: recession_speed.min must be > 0"
            )));
        }
        Ok(())
    }
}

/// Shooting-star look and motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShootingStyle {
    /// Streak length range in CSS px.
    pub length: SpeedRange,
    /// Travel per draw along the streak angle.
    pub speed: SpeedRange,
    /// Opacity removed per draw.
    pub fade_per_draw: f64,
    /// Stroke width in CSS px.
    pub line_width: f64,
}

impl Default for ShootingStyle {
    fn default() -> Self {
        Self {
            length: SpeedRange::new(100.0, 300.0),
            speed: SpeedRange::new(6.0, 18.0),
            fade_per_draw: 0.02,
            line_width: 2.0,
        }
    }
}

/// Falling-element look.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FallingStyle {
    /// Opacity ramp factor applied to the projected scale of phrases.
    pub phrase_opacity_ramp: f64,
    /// Opacity ramp factor applied to the projected scale of photos and the icon.
    pub image_opacity_ramp: f64,
    /// Smallest font size a phrase is drawn at.
    pub phrase_min_font_px: f64,
    /// Corner radius as a fraction of projected size.
    pub corner_radius_ratio: f64,
    /// Shadow blur as a fraction of projected size.
    pub shadow_blur_ratio: f64,
    /// Shadow color behind photos and the icon.
    pub shadow_color: Rgba8,
}

impl Default for FallingStyle {
    fn default() -> Self {
        Self {
            phrase_opacity_ramp: 1.1,
            image_opacity_ramp: 1.8,
            phrase_min_font_px: 12.0,
            corner_radius_ratio: 0.15,
            shadow_blur_ratio: 0.2,
            shadow_color: Rgba8::rgba(244, 63, 94, 102),
        }
    }
}

/// Wall-clock timings of the entry gate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateTimings {
    /// Delay before the enter affordance becomes interactive.
    pub reveal_delay_ms: u64,
    /// Fade-in time of the affordance once armed.
    pub affordance_fade_ms: u64,
    /// Duration of the exit fade/scale.
    pub transition_ms: u64,
    /// Canvas scale reached at the end of the exit transition.
    pub transition_scale: f64,
    /// Curve applied to the exit transition progress.
    pub transition_ease: Ease,
}

impl Default for GateTimings {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 3000,
            affordance_fade_ms: 800,
            transition_ms: 1000,
            transition_scale: 1.2,
            transition_ease: Ease::OutCubic,
        }
    }
}

/// Full engine configuration.
///
/// `Default` carries the values of the shipped splash screen; JSON files only need to list the
/// fields they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplashConfig {
    /// Phrases drawn as falling text.
    pub phrases: Vec<String>,
    /// Ordered palette the phrase color cycles through.
    pub palette: Vec<Rgba8>,
    /// Palette progress added per draw.
    pub palette_step: f64,
    /// Solid background painted each frame.
    pub background: Rgba8,
    /// Perspective focal length; depth at which scale == 1.
    pub focal_length: f64,
    /// Viewports narrower than this are treated as mobile.
    pub mobile_max_width: f64,
    /// Relative paths of photo images.
    pub photos: Vec<String>,
    /// Relative path of the decorative icon (raster or SVG).
    pub icon: String,
    /// Relative path of the font used for phrases (TTF/OTF). Without it phrases are not drawn by
    /// the CPU surface.
    pub font: Option<String>,
    /// Seed for the engine RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Shooting-star style.
    pub shooting: ShootingStyle,
    /// Falling-element style.
    pub falling: FallingStyle,
    /// Entry gate timings.
    pub gate: GateTimings,
    /// Mobile tunables.
    pub mobile: DeviceTunables,
    /// Desktop tunables.
    pub desktop: DeviceTunables,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            phrases: [
                "Ma Girl",
                "My Princess",
                "Ma sirène",
                "Ma voie",
                "Paty carioca",
                "girl from rio",
                "I love u",
                "Always Us",
                "Vibe Infinita",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            palette: vec![
                Rgba8::rgb(0xFF, 0xD7, 0x00),
                Rgba8::rgb(0xFF, 0xA5, 0x00),
                Rgba8::rgb(0xAD, 0xFF, 0x2F),
                Rgba8::rgb(0x00, 0xFF, 0xFF),
                Rgba8::rgb(0xFF, 0x69, 0xB4),
                Rgba8::rgb(0xFF, 0xFF, 0xFF),
                Rgba8::rgb(0x99, 0x32, 0xCC),
            ],
            palette_step: 0.005,
            background: Rgba8::rgb(0x1F, 0x05, 0x0A),
            focal_length: 300.0,
            mobile_max_width: 768.0,
            photos: ["25.jpeg", "08.jpeg", "15.jpeg", "22.jpeg", "27.jpeg"]
                .into_iter()
                .map(|name| format!("images/{name}"))
                .collect(),
            icon: "images/sparkle.png".to_owned(),
            font: None,
            seed: None,
            shooting: ShootingStyle::default(),
            falling: FallingStyle::default(),
            gate: GateTimings::default(),
            mobile: DeviceTunables::mobile(),
            desktop: DeviceTunables::desktop(),
        }
    }
}

impl SplashConfig {
    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> SplashResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON config string.
    pub fn from_json_str(text: &str) -> SplashResult<Self> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| SplashError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> SplashResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SplashError::serde(e.to_string()))
    }

    /// Tunables for a device class.
    pub fn tunables(&self, device: DeviceClass) -> &DeviceTunables {
        match device {
            DeviceClass::Mobile => &self.mobile,
            DeviceClass::Desktop => &self.desktop,
        }
    }

    /// Backing-surface pixel ratio for a raw device ratio.
    ///
    /// Mobile always renders at its fixed ratio; desktop follows the display up to its cap.
    pub fn effective_dpr(&self, device: DeviceClass, raw: f64) -> f64 {
        match device {
            DeviceClass::Mobile => self.mobile.dpr_cap,
            DeviceClass::Desktop => raw.min(self.desktop.dpr_cap),
        }
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> SplashResult<()> {
        if self.phrases.is_empty() {
            return Err(SplashError::validation("phrases must not be empty"));
        }
        if self.palette.is_empty() {
            return Err(SplashError::validation("palette must not be empty"));
        }
        if self.photos.is_empty() {
            return Err(SplashError::validation("photos must not be empty"));
        }
        if self.icon.trim().is_empty() {
            return Err(SplashError::validation("icon must not be empty"));
        }
        if !self.focal_length.is_finite() || self.focal_length <= 0.0 {
            return Err(SplashError::validation(
                "focal_length must be finite and > 0",
            ));
        }
        if !self.palette_step.is_finite() || self.palette_step <= 0.0 || self.palette_step > 1.0 {
            return Err(SplashError::validation("palette_step must be in (0, 1]"));
        }
        if !self.mobile_max_width.is_finite() || self.mobile_max_width < 0.0 {
            return Err(SplashError::validation(
                "mobile_max_width must be finite and >= 0",
            ));
        }

        self.shooting.length.validate("shooting.length")?;
        self.shooting.speed.validate("shooting.speed")?;
        if !self.shooting.fade_per_draw.is_finite() || self.shooting.fade_per_draw <= 0.0 {
            return Err(SplashError::validation(
                "shooting.fade_per_draw must be finite and > 0",
            ));
        }
        if !self.shooting.line_width.is_finite() || self.shooting.line_width <= 0.0 {
            return Err(SplashError::validation(
                "shooting.line_width must be finite and > 0",
            ));
        }

        let f = &self.falling;
        for (name, v) in [
            ("falling.phrase_opacity_ramp", f.phrase_opacity_ramp),
            ("falling.image_opacity_ramp", f.image_opacity_ramp),
            ("falling.phrase_min_font_px", f.phrase_min_font_px),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SplashError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [
            ("falling.corner_radius_ratio", f.corner_radius_ratio),
            ("falling.shadow_blur_ratio", f.shadow_blur_ratio),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SplashError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }

        if self.gate.transition_ms == 0 {
            return Err(SplashError::validation("gate.transition_ms must be > 0"));
        }
        if !self.gate.transition_scale.is_finite() || self.gate.transition_scale <= 0.0 {
            return Err(SplashError::validation(
                "gate.transition_scale must be finite and > 0",
            ));
        }

        self.mobile.validate("mobile")?;
        self.desktop.validate("desktop")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
