//! Frame sinks for offline rendering.
//!
//! Sinks consume rendered frames in order; see [`OfflineRun`](crate::OfflineRun).

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// PNG-sequence sink.
pub mod png;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
