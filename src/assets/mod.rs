//! Image/SVG/font assets and their non-blocking readiness handles.

pub(crate) mod decode;
pub(crate) mod store;
