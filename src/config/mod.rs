//! Engine configuration: palette, phrases, asset sources and per-device tunables.

pub(crate) mod color;
pub(crate) mod settings;
