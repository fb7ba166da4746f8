//! Animation primitives for scatter transitions.
//!
//! Progress is driven by wall-clock time rather than frame count, so the
//! animation plays at the same speed on every refresh rate. Compositor updates
//! are throttled separately by [`UpdateThrottle`].

use std::time::{Duration, Instant};

use super::geometry::Rect;

// ============================================================================
// Constants
// ============================================================================

/// Minimum animation duration in milliseconds.
pub const MIN_DURATION_MS: u64 = 50;

/// Maximum animation duration in milliseconds.
pub const MAX_DURATION_MS: u64 = 1000;

/// Default animation duration in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 250;

/// Minimum interval between two compositor updates.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// Easing
// ============================================================================

/// Cubic ease-out: fast start, gentle landing.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    (inv * inv).mul_add(-inv, 1.0)
}

/// Linear interpolation between two values.
#[inline]
#[must_use]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 { (end - start).mul_add(t, start) }

/// Interpolates every component of a rectangle.
///
/// Returns `from` exactly at `t <= 0` and `to` exactly at `t >= 1`, so settled
/// thumbnails land on their target without floating point drift.
#[must_use]
pub fn interpolate(from: &Rect, to: &Rect, t: f64) -> Rect {
    if t <= 0.0 {
        return *from;
    }
    if t >= 1.0 {
        return *to;
    }
    Rect::new(
        lerp(from.x, to.x, t),
        lerp(from.y, to.y, t),
        lerp(from.width, to.width, t),
        lerp(from.height, to.height, t),
    )
}

// ============================================================================
// Clock
// ============================================================================

/// Direction an animation plays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationDirection {
    /// From the live window positions to the scattered layout.
    Forward,
    /// From the scattered layout back to the live window positions.
    Reverse,
}

/// Wall-clock driven progress of a single animation run.
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    started: Instant,
    duration: Duration,
    direction: AnimationDirection,
}

impl AnimationClock {
    /// Starts a clock at `now`.
    ///
    /// The duration is clamped to the supported range.
    #[must_use]
    pub fn start(now: Instant, duration: Duration, direction: AnimationDirection) -> Self {
        Self {
            started: now,
            duration: clamp_duration(duration),
            direction,
        }
    }

    /// Direction of this run.
    #[must_use]
    pub const fn direction(&self) -> AnimationDirection { self.direction }

    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub fn raw_progress(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Eased progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f64 { ease_out_cubic(self.raw_progress(now)) }

    /// Whether the run has reached the end.
    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool { self.raw_progress(now) >= 1.0 }
}

/// Clamps a duration to `MIN_DURATION_MS..=MAX_DURATION_MS`.
#[must_use]
pub fn clamp_duration(duration: Duration) -> Duration {
    duration.clamp(
        Duration::from_millis(MIN_DURATION_MS),
        Duration::from_millis(MAX_DURATION_MS),
    )
}

// ============================================================================
// Throttle
// ============================================================================

/// Rate limiter for compositor updates.
///
/// The final frame of an animation must always be pushed, so callers pass
/// `force = true` for it.
#[derive(Debug, Clone, Copy)]
pub struct UpdateThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl UpdateThrottle {
    /// Creates a throttle allowing at most one update per `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self { Self { interval, last: None } }

    /// Returns whether an update may be pushed at `now`, recording it if so.
    pub fn permit(&mut self, now: Instant, force: bool) -> bool {
        let allowed = force
            || self.last.is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if allowed {
            self.last = Some(now);
        }
        allowed
    }

    /// Forgets the last update.
    pub const fn reset(&mut self) { self.last = None; }
}

impl Default for UpdateThrottle {
    fn default() -> Self { Self::new(DEFAULT_UPDATE_INTERVAL) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_bounds() {
        assert!(ease_out_cubic(0.0).abs() < f64::EPSILON);
        assert!((ease_out_cubic(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert!((ease_out_cubic(2.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ease_out_is_monotonic() {
        let mut previous = 0.0;
        for step in 1..=100 {
            let value = ease_out_cubic(f64::from(step) / 100.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn test_interpolate_endpoints_are_exact() {
        let from = Rect::new(0.1, 0.2, 0.3, 0.7);
        let to = Rect::new(1234.567, 89.01, 333.3, 222.2);
        assert_eq!(interpolate(&from, &to, 0.0), from);
        assert_eq!(interpolate(&from, &to, 1.0), to);
        assert_eq!(interpolate(&from, &to, -1.0), from);
        assert_eq!(interpolate(&from, &to, 1.5), to);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let from = Rect::new(0.0, 0.0, 100.0, 100.0);
        let to = Rect::new(100.0, 200.0, 300.0, 500.0);
        assert_eq!(interpolate(&from, &to, 0.5), Rect::new(50.0, 100.0, 200.0, 300.0));
    }

    #[test]
    fn test_clock_progress() {
        let start = Instant::now();
        let clock =
            AnimationClock::start(start, Duration::from_millis(200), AnimationDirection::Forward);

        assert!(clock.progress(start).abs() < f64::EPSILON);
        assert!((clock.raw_progress(start + Duration::from_millis(100)) - 0.5).abs() < 1e-9);
        assert!(!clock.is_finished(start + Duration::from_millis(199)));
        assert!(clock.is_finished(start + Duration::from_millis(200)));
        assert!((clock.progress(start + Duration::from_secs(5)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clock_clamps_duration() {
        let start = Instant::now();
        let clock = AnimationClock::start(start, Duration::ZERO, AnimationDirection::Reverse);
        assert!(!clock.is_finished(start + Duration::from_millis(MIN_DURATION_MS - 1)));
        assert!(clock.is_finished(start + Duration::from_millis(MIN_DURATION_MS)));
        assert_eq!(clock.direction(), AnimationDirection::Reverse);

        assert_eq!(clamp_duration(Duration::from_secs(10)), Duration::from_millis(MAX_DURATION_MS));
    }

    #[test]
    fn test_throttle() {
        let start = Instant::now();
        let mut throttle = UpdateThrottle::new(Duration::from_millis(5));

        assert!(throttle.permit(start, false));
        assert!(!throttle.permit(start + Duration::from_millis(2), false));
        assert!(throttle.permit(start + Duration::from_millis(3), true));
        assert!(!throttle.permit(start + Duration::from_millis(7), false));
        assert!(throttle.permit(start + Duration::from_millis(8), false));

        throttle.reset();
        assert!(throttle.permit(start + Duration::from_millis(8), false));
    }
}
