use crate::assets::store::SceneAssets;
use crate::config::settings::{DeviceTunables, FallingStyle};
use crate::foundation::core::{Point, Rgba8, Viewport};
use crate::scene::projector::PerspectiveProjector;
use crate::surface::{DrawSurface, Shadow};

/// What a falling element shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A phrase drawn as text in the cycling palette color.
    Phrase,
    /// One of the configured photos.
    Photo,
    /// The decorative icon.
    Icon,
}

/// Cumulative kind weights, checked in order against one uniform sample.
pub const KIND_TABLE: [(ElementKind, f64); 3] = [
    (ElementKind::Phrase, 0.45),
    (ElementKind::Photo, 0.80),
    (ElementKind::Icon, 1.0),
];

/// Map a uniform sample `r` in `[0, 1)` to a kind through [`KIND_TABLE`].
pub fn select_kind(r: f64) -> ElementKind {
    KIND_TABLE
        .iter()
        .find(|(_, cumulative)| r < *cumulative)
        .map_or(ElementKind::Icon, |(kind, _)| *kind)
}

/// Concrete content of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementContent {
    /// Index into the phrase list.
    Phrase(usize),
    /// Index into the photo handles.
    Photo(usize),
    /// The icon handle.
    Icon,
}

impl ElementContent {
    /// Kind of this content.
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Phrase(_) => ElementKind::Phrase,
            Self::Photo(_) => ElementKind::Photo,
            Self::Icon => ElementKind::Icon,
        }
    }
}

/// One entity receding toward the viewer.
///
/// `world` is fixed for the element's life; only `z` changes, strictly decreasing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallingElement {
    /// What is drawn.
    pub content: ElementContent,
    /// Depth; `> 0` while the element is live.
    pub z: f64,
    /// Display size at scale 1.
    pub base_size: f64,
    /// World-space position relative to the vanishing point.
    pub world: Point,
    /// Depth removed per draw.
    pub speed: f64,
}

impl FallingElement {
    /// Kind of the element.
    pub fn kind(&self) -> ElementKind {
        self.content.kind()
    }
}

/// Counters from one [`FallingElementPool::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolTick {
    /// Elements replaced because they passed the viewer.
    pub passed_viewer: usize,
    /// Elements replaced because they left the frustum while still far away.
    pub left_frustum: usize,
}

impl PoolTick {
    /// Total recycles.
    pub fn recycled(&self) -> usize {
        self.passed_viewer + self.left_frustum
    }
}

/// Fixed-capacity arena of falling elements.
///
/// Slots are reused by index: a recycled element is replaced in place, and timer spawns take a
/// free slot or are dropped when the arena is full. Nothing allocates after construction.
#[derive(Clone, Debug)]
pub struct FallingElementPool {
    slots: Vec<Option<FallingElement>>,
    free: Vec<usize>,
    projector: PerspectiveProjector,
    style: FallingStyle,
    tunables: DeviceTunables,
    phrase_count: usize,
    photo_count: usize,
}

impl FallingElementPool {
    /// Create an empty pool with `tunables.pool_capacity` slots.
    pub fn new(
        projector: PerspectiveProjector,
        style: FallingStyle,
        tunables: DeviceTunables,
        phrase_count: usize,
        photo_count: usize,
    ) -> Self {
        let capacity = tunables.pool_capacity;
        Self {
            slots: vec![None; capacity],
            free: (0..capacity).rev().collect(),
            projector,
            style,
            tunables,
            phrase_count,
            photo_count,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// `true` when no element is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when every slot is taken.
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Live elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &FallingElement> {
        self.slots.iter().flatten()
    }

    /// Tunables the pool spawns with.
    pub fn tunables(&self) -> &DeviceTunables {
        &self.tunables
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.free = (0..self.slots.len()).rev().collect();
    }

    /// Spawn one element into a free slot. Returns the slot, or `None` when the pool is full.
    pub fn spawn(&mut self, viewport: Viewport, rng: &mut fastrand::Rng) -> Option<usize> {
        if self.is_full() {
            tracing::trace!(capacity = self.capacity(), "pool full, spawn dropped");
            return None;
        }
        let el = self.fresh(viewport, rng);
        self.insert(el)
    }

    /// Spawn up to `count` elements; returns how many were placed.
    pub fn seed(&mut self, count: usize, viewport: Viewport, rng: &mut fastrand::Rng) -> usize {
        (0..count)
            .take_while(|_| self.spawn(viewport, rng).is_some())
            .count()
    }

    pub(crate) fn insert(&mut self, el: FallingElement) -> Option<usize> {
        let idx = self.free.pop()?;
        self.slots[idx] = Some(el);
        Some(idx)
    }

    fn fresh(&self, viewport: Viewport, rng: &mut fastrand::Rng) -> FallingElement {
        let content = self.pick_content(select_kind(rng.f64()), rng);
        let base_size = match content.kind() {
            ElementKind::Phrase => self.tunables.phrase_size,
            ElementKind::Photo => self.tunables.photo_size,
            ElementKind::Icon => self.tunables.icon_size,
        };

        let f = self.projector.focal_length();
        let (near, far) = (1.5 * f, 5.0 * f);
        let z = near + rng.f64() * (far - near);

        // Visible extent at the far plane, narrowed to 90%.
        let world_w = (viewport.width / f) * far;
        let world_h = (viewport.height / f) * far;
        let world = Point::new(
            (rng.f64() - 0.5) * world_w * 0.9,
            (rng.f64() - 0.5) * world_h * 0.9,
        );

        FallingElement {
            content,
            z,
            base_size,
            world,
            speed: self.tunables.recession_speed.sample(rng.f64()),
        }
    }

    fn pick_content(&self, kind: ElementKind, rng: &mut fastrand::Rng) -> ElementContent {
        match kind {
            ElementKind::Phrase if self.phrase_count > 0 => {
                ElementContent::Phrase(rng.usize(..self.phrase_count))
            }
            ElementKind::Photo if self.photo_count > 0 => {
                ElementContent::Photo(rng.usize(..self.photo_count))
            }
            _ => ElementContent::Icon,
        }
    }

    /// Move every element one step toward the viewer and recycle the ones that are done.
    ///
    /// A replacement takes the recycled element's slot and is first moved on the next tick.
    pub fn tick(&mut self, viewport: Viewport, rng: &mut fastrand::Rng) -> PoolTick {
        let mut out = PoolTick::default();
        let f = self.projector.focal_length();
        for idx in 0..self.slots.len() {
            let Some(el) = self.slots[idx].as_mut() else {
                continue;
            };
            el.z -= el.speed;

            let passed = el.z <= 0.0;
            let left = !passed
                && el.z > f
                && self
                    .projector
                    .project(el.world, el.z, el.base_size, viewport)
                    .is_off_screen(viewport);
            if !(passed || left) {
                continue;
            }

            if passed {
                out.passed_viewer += 1;
            } else {
                out.left_frustum += 1;
            }
            tracing::trace!(slot = idx, passed, "falling element recycled");
            let replacement = self.fresh(viewport, rng);
            self.slots[idx] = Some(replacement);
        }
        out
    }

    /// Paint every element, back to front by slot order.
    ///
    /// Photos and the icon are skipped while their handle is not ready. Returns how many image
    /// draws were skipped.
    pub fn draw(
        &self,
        surface: &mut dyn DrawSurface,
        viewport: Viewport,
        phrases: &[String],
        assets: &SceneAssets,
        phrase_color: Rgba8,
    ) -> usize {
        let mut skipped = 0;
        for el in self.iter() {
            let p = self
                .projector
                .project(el.world, el.z, el.base_size, viewport);
            match el.content {
                ElementContent::Phrase(i) => {
                    let Some(text) = phrases.get(i) else {
                        continue;
                    };
                    let opacity = (p.scale * self.style.phrase_opacity_ramp).min(1.0);
                    let font_px = p.size.max(self.style.phrase_min_font_px);
                    surface.fill_text(text, p.screen, font_px, phrase_color.with_opacity(opacity));
                }
                ElementContent::Photo(_) | ElementContent::Icon => {
                    let handle = match el.content {
                        ElementContent::Photo(i) => assets.photos.get(i),
                        _ => Some(&assets.icon),
                    };
                    let Some((handle, image)) = handle.and_then(|h| h.get().map(|img| (h, img)))
                    else {
                        skipped += 1;
                        continue;
                    };
                    let opacity = (p.scale * self.style.image_opacity_ramp).min(1.0);
                    surface.draw_image_rounded(
                        handle.id(),
                        image,
                        p.bounds(),
                        p.size * self.style.corner_radius_ratio,
                        opacity,
                        Some(Shadow {
                            color: self.style.shadow_color,
                            blur: p.size * self.style.shadow_blur_ratio,
                        }),
                    );
                }
            }
        }
        skipped
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/falling.rs"]
mod tests;
