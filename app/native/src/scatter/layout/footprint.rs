//! Footprint sizing: how large each scattered thumbnail should be.
//!
//! Footprints are produced as an unordered bag of sizes. They are bound to
//! concrete windows only after packing, see [`super::assign`].

use rand::Rng;

use super::{
    CANVAS_PADDING, JITTER_MAX, JITTER_MIN, MAX_FOOTPRINT, MAX_SCALE, MIN_FOOTPRINT, MIN_SCALE,
    TARGET_FILL_RATIO,
};
use crate::scatter::geometry::Size;
use crate::scatter::window::SourceWindow;

/// Computes the isotropic scale factor for a set of windows on a canvas.
///
/// The factor targets a total occupied area of 65% of the padded canvas and is
/// always clamped to `[MIN_SCALE, MAX_SCALE]`, including for degenerate input
/// (no area at all, or a canvas smaller than its padding).
#[must_use]
pub fn scale_factor(windows: &[SourceWindow], canvas: Size) -> f64 {
    let total_area: f64 = windows.iter().map(|w| w.width() * w.height()).sum();
    let available = padded_area(canvas);

    if total_area <= 0.0 {
        return MAX_SCALE;
    }

    let factor = (available * TARGET_FILL_RATIO / total_area).sqrt();
    if factor.is_finite() {
        factor.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        MIN_SCALE
    }
}

/// Area of the canvas once the padding is removed from every side.
fn padded_area(canvas: Size) -> f64 {
    let width = 2.0f64.mul_add(-CANVAS_PADDING, canvas.width).max(0.0);
    let height = 2.0f64.mul_add(-CANVAS_PADDING, canvas.height).max(0.0);
    width * height
}

/// Builds one jittered, clamped footprint per window.
///
/// Each axis gets its own multiplicative jitter so footprints do not all share
/// their source's aspect ratio.
pub fn scaled_footprints<R: Rng>(windows: &[SourceWindow], scale: f64, rng: &mut R) -> Vec<Size> {
    windows
        .iter()
        .map(|window| {
            let width = window.width() * scale * rng.random_range(JITTER_MIN..=JITTER_MAX);
            let height = window.height() * scale * rng.random_range(JITTER_MIN..=JITTER_MAX);

            Size::new(
                width.clamp(MIN_FOOTPRINT.width, MAX_FOOTPRINT.width),
                height.clamp(MIN_FOOTPRINT.height, MAX_FOOTPRINT.height),
            )
        })
        .collect()
}
