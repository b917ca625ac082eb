use crate::foundation::core::Rgba8;

/// Walks an ordered palette, interpolating between consecutive entries.
///
/// `progress` advances by a fixed step per draw; on reaching 1 it resets to 0 and both indices
/// move forward by one, wrapping at the palette length.
#[derive(Clone, Debug)]
pub struct ColorCycler {
    palette: Vec<Rgba8>,
    current: usize,
    next: usize,
    progress: f64,
    step: f64,
}

impl ColorCycler {
    /// Create a cycler at the first palette entry. An empty palette falls back to white.
    pub fn new(palette: Vec<Rgba8>, step: f64) -> Self {
        let palette = if palette.is_empty() {
            vec![Rgba8::WHITE]
        } else {
            palette
        };
        let next = 1 % palette.len();
        Self {
            palette,
            current: 0,
            next,
            progress: 0.0,
            step,
        }
    }

    /// Advance by one draw.
    pub fn tick(&mut self) {
        self.progress += self.step;
        if self.progress >= 1.0 {
            self.progress = 0.0;
            self.current = self.next;
            self.next = (self.next + 1) % self.palette.len();
        }
    }

    /// Interpolated color for the current progress.
    pub fn current_color(&self) -> Rgba8 {
        self.palette[self.current].lerp(self.palette[self.next], self.progress)
    }

    /// Index of the color being left.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Index of the color being approached.
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Interpolation factor in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.progress
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/palette.rs"]
mod tests;
