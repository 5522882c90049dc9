//! GIF output-size projection.
//!
//! The video tool shows a live size estimate while the user drags the
//! resolution, frame-rate and trim sliders. [`estimate`] is the pure
//! function behind that readout: no I/O, no side effects, cheap enough to
//! call on every input change.

use serde::{Deserialize, Serialize};

/// Empirical bytes of encoded GIF per pixel per frame.
///
/// Calibrated against typical screen-capture footage at quality 3; real
/// output varies with palette complexity and dithering. Recalibrate here,
/// not at call sites.
pub const BYTES_PER_PIXEL_FRAME: f64 = 0.12;

/// A projected GIF export: size, clip length and frame count.
///
/// Purely derived from the slider values; recomputed on every change and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GifEstimate {
    /// Projected file size in mebibytes.
    pub estimated_size_mb: f64,
    /// Clip length in seconds, clamped to zero when the trim handles cross.
    pub duration_seconds: f64,
    /// Number of frames the export will contain.
    pub frame_count: u32,
}

/// Project the output size of a GIF export.
///
/// `duration = max(0, end_time − start_time)`,
/// `frame_count = round(duration × fps)`,
/// `size = width × height × BYTES_PER_PIXEL_FRAME × frame_count`.
pub fn estimate(width: u32, height: u32, fps: u32, start_time: f64, end_time: f64) -> GifEstimate {
    let duration_seconds = (end_time - start_time).max(0.0);
    let frame_count = (duration_seconds * f64::from(fps)).round() as u32;
    let estimated_size_mb = f64::from(width) * f64::from(height) * BYTES_PER_PIXEL_FRAME
        * f64::from(frame_count)
        / (1024.0 * 1024.0);
    GifEstimate {
        estimated_size_mb,
        duration_seconds,
        frame_count,
    }
}
