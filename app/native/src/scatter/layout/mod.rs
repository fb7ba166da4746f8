//! Layout calculator for scattered thumbnails.
//!
//! Given the enumerated windows and the canvas size, produces one target
//! rectangle per window such that no two rectangles (grown by a fixed buffer)
//! overlap. The calculation never fails: when the canvas is too crowded a
//! window is centered on top of the others and the fallback is counted.
//!
//! # Pipeline
//!
//! 1. [`footprint::scale_factor`] derives one isotropic scale for all windows.
//! 2. [`footprint::scaled_footprints`] jitters and clamps one size per window.
//! 3. Footprints are sorted largest first and placed by [`packer::Packer`].
//! 4. [`assign::nearest_slots`] binds placed footprints to windows by
//!    proximity, and [`assign::fit_aspect`] restores each window's aspect.
//!
//! The result is ordered bottom-most first (reverse enumeration order), so
//! the foreground window ends up registered, and therefore drawn, last.

pub mod assign;
pub mod footprint;
pub mod packer;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub use self::footprint::scale_factor;
pub use self::packer::overlaps_with_buffer;
use self::packer::Packer;
use super::geometry::{Rect, Size};
use super::window::SourceWindow;

// ============================================================================
// Constants
// ============================================================================

/// Empty margin kept around the canvas edges.
pub const CANVAS_PADDING: f64 = 50.0;

/// Share of the padded canvas the footprints should cover together.
pub const TARGET_FILL_RATIO: f64 = 0.65;

/// Smallest allowed isotropic scale factor.
pub const MIN_SCALE: f64 = 0.15;

/// Largest allowed isotropic scale factor.
pub const MAX_SCALE: f64 = 0.5;

/// Lower bound of the per-axis size jitter.
pub const JITTER_MIN: f64 = 0.85;

/// Upper bound of the per-axis size jitter.
pub const JITTER_MAX: f64 = 1.15;

/// Smallest footprint produced by scaling.
pub const MIN_FOOTPRINT: Size = Size::new(180.0, 120.0);

/// Largest footprint produced by scaling.
pub const MAX_FOOTPRINT: Size = Size::new(600.0, 450.0);

/// Horizontal gap between the two footprints of a pair layout.
pub const PAIR_GAP: f64 = 40.0;

/// Number of grid steps per axis when searching a free slot.
pub const GRID_STEPS: u32 = 50;

/// Minimum clearance between two placed rectangles.
pub const COLLISION_BUFFER: f64 = 15.0;

/// Overlap tolerated on an axis before it counts as a collision.
pub const COLLISION_EPSILON: f64 = 0.1;

/// Fraction removed from a footprint per shrink attempt.
pub const SHRINK_STEP: f64 = 0.1;

/// Number of shrink attempts after the full size search fails.
pub const MAX_SHRINK_ATTEMPTS: u32 = 5;

/// Footprints never shrink below this size.
pub const SHRINK_FLOOR: Size = Size::new(120.0, 80.0);

// ============================================================================
// Types
// ============================================================================

/// A window bound to its computed target rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedLayout {
    /// Window this placement belongs to.
    pub window: SourceWindow,
    /// Target rectangle on the canvas.
    pub rect: Rect,
    /// Width of the window when it was enumerated.
    pub original_width: f64,
    /// Height of the window when it was enumerated.
    pub original_height: f64,
}

/// Output of one layout calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutPlan {
    /// One placement per input window, bottom-most window first.
    pub layouts: Vec<PlacedLayout>,
    /// Scale factor used to size the footprints.
    pub scale: f64,
    /// Number of windows that had to be centered over other placements.
    pub fallbacks: usize,
}

// ============================================================================
// Calculator
// ============================================================================

/// Computes scatter layouts.
///
/// Randomness (size jitter, first placement offset, score tie breaks) comes
/// from the owned generator, so a seeded generator yields reproducible plans.
#[derive(Debug)]
pub struct LayoutCalculator<R = StdRng> {
    rng: R,
}

impl LayoutCalculator<StdRng> {
    /// Creates a calculator seeded from the thread-local generator.
    #[must_use]
    pub fn from_entropy() -> Self { Self::new(StdRng::from_rng(&mut rand::rng())) }

    /// Creates a calculator with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self { Self::new(StdRng::seed_from_u64(seed)) }
}

impl<R: Rng> LayoutCalculator<R> {
    /// Creates a calculator drawing randomness from `rng`.
    pub const fn new(rng: R) -> Self { Self { rng } }

    /// Calculates the scatter layout for `windows` on a canvas of `canvas`.
    ///
    /// # Arguments
    ///
    /// * `windows` - Windows in enumeration order (foreground first).
    /// * `canvas` - Size of the overlay surface.
    ///
    /// # Returns
    ///
    /// A plan with one placement per window, ordered bottom-most first.
    pub fn calculate(&mut self, windows: &[SourceWindow], canvas: Size) -> LayoutPlan {
        if windows.is_empty() {
            return LayoutPlan::default();
        }

        let scale = scale_factor(windows, canvas);
        let mut footprints = footprint::scaled_footprints(windows, scale, &mut self.rng);
        footprints.sort_by(|a, b| b.area().total_cmp(&a.area()));

        let outcome = Packer::new(canvas).pack(&footprints, &mut self.rng);
        let slots = assign::nearest_slots(windows, &outcome.rects);

        let mut layouts: Vec<PlacedLayout> = windows
            .iter()
            .zip(slots)
            .filter_map(|(window, slot)| {
                let slot = outcome.rects[slot?];
                Some(PlacedLayout {
                    window: window.clone(),
                    rect: assign::fit_aspect(slot, window.width(), window.height()),
                    original_width: window.width(),
                    original_height: window.height(),
                })
            })
            .collect();
        layouts.reverse();

        tracing::debug!(
            windows = windows.len(),
            scale,
            fallbacks = outcome.fallbacks,
            "scatter: layout calculated"
        );

        LayoutPlan {
            layouts,
            scale,
            fallbacks: outcome.fallbacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scatter::geometry::ScreenRect;
    use crate::scatter::window::WindowHandle;

    const CANVAS: Size = Size::new(1920.0, 1080.0);

    fn windows(sizes: &[(i32, i32, i32, i32)]) -> Vec<SourceWindow> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(x, y, w, h))| {
                SourceWindow::new(
                    WindowHandle(isize::try_from(i).unwrap() + 1),
                    format!("Window {i}"),
                    ScreenRect::from_origin_size(x, y, w, h),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_input_yields_empty_plan() {
        let plan = LayoutCalculator::with_seed(1).calculate(&[], CANVAS);
        assert!(plan.layouts.is_empty());
        assert_eq!(plan.fallbacks, 0);
    }

    #[test]
    fn test_one_layout_per_window_in_reverse_order() {
        let input = windows(&[
            (0, 0, 1200, 800),
            (300, 200, 900, 700),
            (800, 100, 1000, 900),
            (100, 400, 640, 480),
        ]);
        let plan = LayoutCalculator::with_seed(3).calculate(&input, CANVAS);

        let handles: Vec<_> = plan.layouts.iter().map(|l| l.window.handle).collect();
        let mut expected: Vec<_> = input.iter().map(|w| w.handle).collect();
        expected.reverse();
        assert_eq!(handles, expected);
    }

    #[test]
    fn test_layouts_preserve_aspect_ratio() {
        let input = windows(&[(0, 0, 1600, 900), (0, 0, 800, 1200), (0, 0, 1024, 768)]);
        let plan = LayoutCalculator::with_seed(11).calculate(&input, CANVAS);

        for layout in &plan.layouts {
            let expected = layout.original_width / layout.original_height;
            let actual = layout.rect.width / layout.rect.height;
            assert!((expected - actual).abs() < 1e-9, "{expected} != {actual}");
        }
    }

    #[test]
    fn test_layouts_do_not_overlap() {
        let input = windows(&[
            (0, 0, 800, 600),
            (100, 100, 1024, 640),
            (200, 50, 800, 600),
            (1000, 300, 900, 700),
            (50, 500, 700, 500),
            (600, 600, 640, 480),
        ]);
        let plan = LayoutCalculator::with_seed(99).calculate(&input, CANVAS);

        assert_eq!(plan.fallbacks, 0);
        for (i, a) in plan.layouts.iter().enumerate() {
            for b in &plan.layouts[i + 1..] {
                assert!(!overlaps_with_buffer(&a.rect, &b.rect));
            }
        }
    }

    #[test]
    fn test_same_seed_same_plan() {
        let input = windows(&[(0, 0, 1200, 800), (500, 500, 900, 700), (50, 60, 700, 500)]);
        let first = LayoutCalculator::with_seed(5).calculate(&input, CANVAS);
        let second = LayoutCalculator::with_seed(5).calculate(&input, CANVAS);
        assert_eq!(first, second);
    }

    #[test]
    fn test_scale_is_reported() {
        let input = windows(&[(0, 0, 100, 100), (0, 0, 100, 100), (0, 0, 100, 100)]);
        let plan = LayoutCalculator::with_seed(0).calculate(&input, CANVAS);
        assert!((plan.scale - MAX_SCALE).abs() < f64::EPSILON);
    }
}
