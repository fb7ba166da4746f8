//! Hot corner detection.
//!
//! The cursor is polled on a background thread. Resting it in the configured
//! screen corner for the dwell delay queues a scatter request through the
//! same [`EngineHandle`] the keyboard hook uses. After firing, the corner is
//! inert for [`COOLDOWN`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::{HotCornerConfig, HotCornerPosition};
use crate::scatter::geometry::{Point, Size};
use crate::scatter::{EngineHandle, TriggerSource};

/// How often the cursor position is sampled.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Distance from the screen edges, in pixels, that still counts as the corner.
pub const CORNER_THRESHOLD: f64 = 5.0;

/// Time after a trigger during which the corner does not fire again.
pub const COOLDOWN: Duration = Duration::from_secs(2);

/// Dwell-timer state machine for a single screen corner.
#[derive(Debug, Clone)]
pub struct HotCornerDetector {
    config: HotCornerConfig,
    entered_at: Option<Instant>,
    cooldown_until: Option<Instant>,
}

impl HotCornerDetector {
    #[must_use]
    pub const fn new(config: HotCornerConfig) -> Self {
        Self { config, entered_at: None, cooldown_until: None }
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &HotCornerConfig { &self.config }

    /// Replaces the configuration and forgets any dwell in progress.
    pub fn set_config(&mut self, config: HotCornerConfig) {
        self.config = config;
        self.reset();
    }

    /// Whether the cursor is currently resting in the corner.
    #[must_use]
    pub const fn is_dwelling(&self) -> bool { self.entered_at.is_some() }

    /// Whether a recent trigger still blocks the corner at `now`.
    #[must_use]
    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Forgets the dwell timer.
    pub fn reset(&mut self) { self.entered_at = None; }

    /// Feeds one cursor sample taken at `now`.
    ///
    /// Returns `true` when the dwell delay has elapsed and a scatter should be
    /// requested.
    pub fn poll(&mut self, cursor: Point, screen: Size, now: Instant) -> bool {
        if !self.config.is_enabled() {
            self.reset();
            return false;
        }

        if !in_corner(self.config.position, cursor, screen) {
            self.reset();
            return false;
        }

        let Some(entered_at) = self.entered_at else {
            self.entered_at = Some(now);
            return false;
        };

        if now.saturating_duration_since(entered_at) < self.config.delay() {
            return false;
        }

        // Still in the corner but cooling down: keep dwelling without firing.
        if self.is_cooling_down(now) {
            return false;
        }

        self.entered_at = None;
        self.cooldown_until = Some(now + COOLDOWN);
        true
    }
}

/// Whether `cursor` lies within [`CORNER_THRESHOLD`] of the given corner of a
/// screen of size `screen`.
#[must_use]
pub fn in_corner(position: HotCornerPosition, cursor: Point, screen: Size) -> bool {
    let near_left = cursor.x <= CORNER_THRESHOLD;
    let near_top = cursor.y <= CORNER_THRESHOLD;
    let near_right = cursor.x >= screen.width - CORNER_THRESHOLD;
    let near_bottom = cursor.y >= screen.height - CORNER_THRESHOLD;

    match position {
        HotCornerPosition::TopLeft => near_left && near_top,
        HotCornerPosition::TopRight => near_right && near_top,
        HotCornerPosition::BottomLeft => near_left && near_bottom,
        HotCornerPosition::BottomRight => near_right && near_bottom,
    }
}

/// Starts the polling thread.
///
/// `sample` returns the cursor position and the primary screen size, or
/// `None` when the cursor cannot be read. The thread exits once `stop` is set
/// or the engine queue is closed.
///
/// Returns `None` without spawning when the hot corner is disabled.
pub fn spawn_poller<F>(
    config: HotCornerConfig,
    engine: EngineHandle,
    stop: Arc<AtomicBool>,
    mut sample: F,
) -> Option<JoinHandle<()>>
where
    F: FnMut() -> Option<(Point, Size)> + Send + 'static,
{
    if !config.is_enabled() {
        tracing::debug!("scatter: hot corner disabled");
        return None;
    }

    let position = config.position;
    let mut detector = HotCornerDetector::new(config);

    let spawned = thread::Builder::new().name("scatter-hot-corner".to_string()).spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            let fired = sample()
                .is_some_and(|(cursor, screen)| detector.poll(cursor, screen, Instant::now()));
            if fired {
                tracing::debug!(?position, "scatter: hot corner triggered");
                if engine.trigger(TriggerSource::HotCorner).is_err() {
                    break;
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    });

    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::error!(error = %err, "scatter: failed to spawn hot corner thread");
            None
        }
    }
}
