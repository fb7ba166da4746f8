//! Greedy grid packer.
//!
//! Places footprints (largest first) on the canvas one at a time. Every
//! placement after the first searches a discretized grid of top-left
//! positions, rejects the ones that collide with what is already placed and
//! keeps the lowest scoring survivor.

use rand::Rng;

use super::{
    CANVAS_PADDING, COLLISION_BUFFER, COLLISION_EPSILON, GRID_STEPS, MAX_SHRINK_ATTEMPTS,
    PAIR_GAP, SHRINK_FLOOR, SHRINK_STEP,
};
use crate::scatter::geometry::{Point, Rect, Size};

// ============================================================================
// Score weights
// ============================================================================

/// Reward per window of imbalance when landing on the emptier horizontal half.
const HORIZONTAL_BALANCE_WEIGHT: f64 = 600.0;

/// Reward per window of imbalance when landing on the emptier vertical half.
const VERTICAL_BALANCE_WEIGHT: f64 = 400.0;

/// Reward for landing in one of the least populated quadrants.
const QUADRANT_BONUS: f64 = 1000.0;

/// Attraction toward the nearest padded canvas corner.
const CORNER_WEIGHT: f64 = 0.5;

/// Attraction toward the nearest padded canvas edge.
const EDGE_WEIGHT: f64 = 0.05;

/// Push away from the canvas center.
const CENTER_WEIGHT: f64 = 0.2;

/// Push away from the closest placed rectangle.
const SPACING_WEIGHT: f64 = 0.05;

/// Upper bound of the random tie breaker.
const JITTER_WEIGHT: f64 = 3.0;

/// Horizontal spread of the first placement's random offset.
const FIRST_OFFSET_X: f64 = 150.0;

/// Vertical spread of the first placement's random offset.
const FIRST_OFFSET_Y: f64 = 100.0;

/// Result of packing a list of footprints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackOutcome {
    /// One rectangle per input footprint, in input order.
    pub rects: Vec<Rect>,
    /// Number of footprints that could not be placed without overlap and were
    /// centered on the canvas instead.
    pub fallbacks: usize,
}

/// Places footprints on a fixed canvas.
#[derive(Debug, Clone, Copy)]
pub struct Packer {
    canvas: Size,
}

impl Packer {
    /// Creates a packer for the given canvas.
    #[must_use]
    pub const fn new(canvas: Size) -> Self { Self { canvas } }

    /// Packs footprints that are already sorted largest first.
    pub fn pack<R: Rng>(&self, footprints: &[Size], rng: &mut R) -> PackOutcome {
        if let [first, second] = footprints {
            return PackOutcome {
                rects: self.place_pair(*first, *second).to_vec(),
                fallbacks: 0,
            };
        }

        let mut outcome = PackOutcome {
            rects: Vec::with_capacity(footprints.len()),
            fallbacks: 0,
        };

        for (index, &footprint) in footprints.iter().enumerate() {
            let rect = if index == 0 {
                self.place_first(footprint, rng)
            } else if let Some(rect) = self.place_with_shrinking(footprint, &outcome.rects, rng) {
                rect
            } else {
                outcome.fallbacks += 1;
                tracing::warn!(
                    width = footprint.width,
                    height = footprint.height,
                    placed = outcome.rects.len(),
                    "scatter: no free slot left, centering window over existing placements"
                );
                Rect::centered_at(self.center(), self.shrunk(footprint, MAX_SHRINK_ATTEMPTS))
            };
            outcome.rects.push(rect);
        }

        outcome
    }

    fn center(&self) -> Point { Point::new(self.canvas.width / 2.0, self.canvas.height / 2.0) }

    // ========================================================================
    // Fixed placements
    // ========================================================================

    /// Two footprints side by side, centered as a pair.
    fn place_pair(&self, first: Size, second: Size) -> [Rect; 2] {
        let total_width = first.width + PAIR_GAP + second.width;
        let max_height = first.height.max(second.height);

        let start_x = (self.canvas.width - total_width) / 2.0;
        let start_y = (self.canvas.height - max_height) / 2.0;

        [
            Rect::new(
                start_x,
                start_y + (max_height - first.height) / 2.0,
                first.width,
                first.height,
            ),
            Rect::new(
                start_x + first.width + PAIR_GAP,
                start_y + (max_height - second.height) / 2.0,
                second.width,
                second.height,
            ),
        ]
    }

    /// First footprint near the center, nudged left by a random offset and
    /// kept inside the padded canvas.
    fn place_first<R: Rng>(&self, footprint: Size, rng: &mut R) -> Rect {
        let offset_x = (0.3 - rng.random::<f64>()) * FIRST_OFFSET_X;
        let offset_y = (rng.random::<f64>() - 0.5) * FIRST_OFFSET_Y;

        let x = (self.canvas.width - footprint.width) / 2.0 + offset_x;
        let y = (self.canvas.height - footprint.height) / 2.0 + offset_y;

        let x = x.min(self.canvas.width - CANVAS_PADDING - footprint.width).max(CANVAS_PADDING);
        let y = y.min(self.canvas.height - CANVAS_PADDING - footprint.height).max(CANVAS_PADDING);

        Rect::new(x, y, footprint.width, footprint.height)
    }

    // ========================================================================
    // Grid search
    // ========================================================================

    fn shrunk(&self, footprint: Size, attempt: u32) -> Size {
        if attempt == 0 {
            return footprint;
        }
        let factor = f64::from(attempt).mul_add(-SHRINK_STEP, 1.0);
        Size::new(
            (footprint.width * factor).max(SHRINK_FLOOR.width),
            (footprint.height * factor).max(SHRINK_FLOOR.height),
        )
    }

    /// Runs the grid search at full size, then shrinks and retries.
    fn place_with_shrinking<R: Rng>(
        &self,
        footprint: Size,
        placed: &[Rect],
        rng: &mut R,
    ) -> Option<Rect> {
        let occupancy = Occupancy::new(placed, self.center());
        (0..=MAX_SHRINK_ATTEMPTS)
            .find_map(|attempt| self.best_slot(self.shrunk(footprint, attempt), placed, &occupancy, rng))
    }

    /// Lowest scoring collision-free grid position for `size`.
    fn best_slot<R: Rng>(
        &self,
        size: Size,
        placed: &[Rect],
        occupancy: &Occupancy,
        rng: &mut R,
    ) -> Option<Rect> {
        let available_width = 2.0f64.mul_add(-CANVAS_PADDING, self.canvas.width);
        let available_height = 2.0f64.mul_add(-CANVAS_PADDING, self.canvas.height);
        let steps = f64::from(GRID_STEPS);
        let step_x = ((available_width - size.width) / steps).max(1.0);
        let step_y = ((available_height - size.height) / steps).max(1.0);

        let max_right = self.canvas.width - CANVAS_PADDING;
        let max_bottom = self.canvas.height - CANVAS_PADDING;

        let mut best: Option<(f64, Rect)> = None;
        for ix in 0..=GRID_STEPS {
            for iy in 0..=GRID_STEPS {
                let x = f64::from(ix).mul_add(step_x, CANVAS_PADDING);
                let y = f64::from(iy).mul_add(step_y, CANVAS_PADDING);
                if x + size.width > max_right || y + size.height > max_bottom {
                    continue;
                }

                let candidate = Rect::new(x, y, size.width, size.height);
                if collides(&candidate, placed) {
                    continue;
                }

                let score = self.score(&candidate, placed, occupancy, rng);
                if best.is_none_or(|(best_score, _)| score < best_score) {
                    best = Some((score, candidate));
                }
            }
        }

        best.map(|(_, rect)| rect)
    }

    // ========================================================================
    // Scoring
    // ========================================================================

    /// Scalar cost of a candidate; lower is better.
    fn score<R: Rng>(
        &self,
        candidate: &Rect,
        placed: &[Rect],
        occupancy: &Occupancy,
        rng: &mut R,
    ) -> f64 {
        let center = self.center();
        let point = candidate.center();

        let mut score = occupancy.balance_bonus(point, center);
        if occupancy.is_least_populated_quadrant(quadrant_of(point, center)) {
            score -= QUADRANT_BONUS;
        }

        score += self.nearest_corner_distance(candidate) * CORNER_WEIGHT;
        score += self.nearest_edge_distance(candidate) * EDGE_WEIGHT;
        score -= point.distance(center) * CENTER_WEIGHT;

        let min_gap = placed.iter().map(|rect| candidate.gap_to(rect)).fold(f64::INFINITY, f64::min);
        if min_gap.is_finite() {
            score -= min_gap * SPACING_WEIGHT;
        }

        score + rng.random::<f64>() * JITTER_WEIGHT
    }

    fn nearest_corner_distance(&self, rect: &Rect) -> f64 {
        let left = rect.x - CANVAS_PADDING;
        let top = rect.y - CANVAS_PADDING;
        let right = rect.right() - (self.canvas.width - CANVAS_PADDING);
        let bottom = rect.bottom() - (self.canvas.height - CANVAS_PADDING);

        [left.hypot(top), right.hypot(top), left.hypot(bottom), right.hypot(bottom)]
            .into_iter()
            .fold(f64::INFINITY, f64::min)
    }

    fn nearest_edge_distance(&self, rect: &Rect) -> f64 {
        [
            (rect.x - CANVAS_PADDING).abs(),
            (rect.right() - (self.canvas.width - CANVAS_PADDING)).abs(),
            (rect.y - CANVAS_PADDING).abs(),
            (rect.bottom() - (self.canvas.height - CANVAS_PADDING)).abs(),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
    }
}

/// Returns whether two rectangles, each grown by half the collision buffer,
/// overlap by more than the tolerance on both axes.
#[must_use]
pub fn overlaps_with_buffer(a: &Rect, b: &Rect) -> bool {
    let half = COLLISION_BUFFER / 2.0;
    a.inflate(half)
        .intersection(&b.inflate(half))
        .is_some_and(|overlap| overlap.width > COLLISION_EPSILON && overlap.height > COLLISION_EPSILON)
}

fn collides(candidate: &Rect, placed: &[Rect]) -> bool {
    placed.iter().any(|rect| overlaps_with_buffer(candidate, rect))
}

/// Quadrant index: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right.
fn quadrant_of(point: Point, center: Point) -> usize {
    usize::from(point.x >= center.x) + 2 * usize::from(point.y >= center.y)
}

// ============================================================================
// Occupancy
// ============================================================================

/// How already-placed rectangles are spread across the canvas halves and
/// quadrants. Computed once per footprint since it does not depend on the
/// candidate being scored.
#[derive(Debug, Clone, Copy, Default)]
struct Occupancy {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    quadrants: [u32; 4],
}

impl Occupancy {
    fn new(placed: &[Rect], center: Point) -> Self {
        let mut occupancy = Self::default();
        for rect in placed {
            let point = rect.center();
            if point.x < center.x {
                occupancy.left += 1.0;
            } else {
                occupancy.right += 1.0;
            }
            if point.y < center.y {
                occupancy.top += 1.0;
            } else {
                occupancy.bottom += 1.0;
            }
            occupancy.quadrants[quadrant_of(point, center)] += 1;
        }
        occupancy
    }

    /// Negative score when `point` lands on the emptier half of either axis.
    fn balance_bonus(&self, point: Point, center: Point) -> f64 {
        let mut bonus = 0.0;

        if self.left > self.right && point.x >= center.x {
            bonus -= HORIZONTAL_BALANCE_WEIGHT * (self.left - self.right);
        } else if self.right > self.left && point.x < center.x {
            bonus -= HORIZONTAL_BALANCE_WEIGHT * (self.right - self.left);
        }

        if self.top > self.bottom && point.y >= center.y {
            bonus -= VERTICAL_BALANCE_WEIGHT * (self.top - self.bottom);
        } else if self.bottom > self.top && point.y < center.y {
            bonus -= VERTICAL_BALANCE_WEIGHT * (self.bottom - self.top);
        }

        bonus
    }

    fn is_least_populated_quadrant(&self, quadrant: usize) -> bool {
        let min = self.quadrants.iter().copied().min().unwrap_or(0);
        self.quadrants[quadrant] == min
    }
}
