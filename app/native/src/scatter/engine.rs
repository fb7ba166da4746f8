//! The scatter engine.
//!
//! Runs on the UI context and owns everything a scatter cycle touches: the
//! platform collaborators, thumbnail records, the layout cache and the
//! animation clock. Other contexts talk to it only through its message queue
//! (see [`super::messages`]); the phase itself is kept in a shared
//! [`TransitionGuard`].
//!
//! The host loop calls [`ScatterEngine::drain`] to process queued requests and
//! [`ScatterEngine::tick`] once per frame while [`ScatterEngine::needs_frames`]
//! is true.

use std::time::{Duration, Instant};

use rand::Rng;
use rand::rngs::StdRng;

use super::animation::{AnimationClock, AnimationDirection, UpdateThrottle, lerp};
use super::cache::ScatterSessionCache;
use super::geometry::{Point, Rect};
use super::layout::{LayoutCalculator, PlacedLayout};
use super::messages::{self, EngineHandle, EngineMessage, EngineQueue};
use super::thumbnail::{ThumbnailId, ThumbnailManager};
use super::transition::{ScatterPhase, TransitionGuard, TransitionKind, TransitionTicket};
use super::window::{DEFAULT_MAX_WINDOWS, SourceWindow, WindowHandle};
use crate::config::ScatterConfig;
use crate::platform::{HostSurface, Platform, PlatformError, ZOrder};

/// Delay between raising the picked window and re-reading window positions.
pub const SWITCH_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Delay between showing the overlay and releasing held modifier keys.
pub const MODIFIER_RELEASE_DELAY: Duration = Duration::from_millis(250);

/// Default backdrop blur radius in pixels.
pub const DEFAULT_BLUR_RADIUS: f64 = 40.0;

// ============================================================================
// Settings
// ============================================================================

/// Tunables of the engine, usually derived from [`ScatterConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Duration of one forward or reverse animation.
    pub animation_duration: Duration,
    /// Blur radius of the backdrop once fully scattered.
    pub backdrop_blur: f64,
    /// Maximum number of windows per cycle.
    pub max_windows: usize,
    /// Extra title fragments excluded from enumeration.
    pub excluded_titles: Vec<String>,
    /// Delay between raising the picked window and animating back.
    pub switch_settle: Duration,
    /// Delay between showing the overlay and releasing modifier keys.
    pub modifier_release_delay: Duration,
    /// Minimum interval between compositor updates.
    pub update_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            animation_duration: Duration::from_millis(super::animation::DEFAULT_DURATION_MS),
            backdrop_blur: DEFAULT_BLUR_RADIUS,
            max_windows: DEFAULT_MAX_WINDOWS,
            excluded_titles: Vec::new(),
            switch_settle: SWITCH_SETTLE_DELAY,
            modifier_release_delay: MODIFIER_RELEASE_DELAY,
            update_interval: super::animation::DEFAULT_UPDATE_INTERVAL,
        }
    }
}

impl From<&ScatterConfig> for EngineSettings {
    fn from(config: &ScatterConfig) -> Self {
        Self {
            animation_duration: config.animation.duration(),
            backdrop_blur: f64::from(config.backdrop.blur),
            max_windows: config.max_windows,
            excluded_titles: config.excluded_titles.clone(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// What a request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    /// The overlay is now showing `windows` thumbnails.
    Scattered { windows: usize, reused_layout: bool },
    /// A switch or cancel transition started.
    Transitioning,
    /// The request conflicted with the current phase and was dropped.
    Ignored,
    /// There was nothing to scatter; the user has been told.
    NothingToShow,
}

#[derive(Debug)]
enum AnimationPurpose {
    Reveal,
    SwitchBack { window: WindowHandle, ticket: TransitionTicket },
    CancelBack { ticket: TransitionTicket },
}

#[derive(Debug)]
struct ActiveAnimation {
    clock: AnimationClock,
    purpose: AnimationPurpose,
}

#[derive(Debug)]
struct PendingSwitch {
    window: WindowHandle,
    due: Instant,
    ticket: TransitionTicket,
}

// ============================================================================
// Engine
// ============================================================================

/// Scatter orchestration engine.
pub struct ScatterEngine<P, R = StdRng> {
    platform: P,
    settings: EngineSettings,
    guard: TransitionGuard,
    calculator: LayoutCalculator<R>,
    cache: ScatterSessionCache,
    thumbnails: ThumbnailManager,
    throttle: UpdateThrottle,
    animation: Option<ActiveAnimation>,
    pending_switch: Option<PendingSwitch>,
    modifier_release_at: Option<Instant>,
    host: Option<HostSurface>,
    handle: EngineHandle,
    queue: EngineQueue,
}

impl<P: Platform> ScatterEngine<P, StdRng> {
    /// Creates an engine with an entropy-seeded layout calculator.
    #[must_use]
    pub fn new(platform: P, settings: EngineSettings) -> Self {
        Self::with_calculator(platform, settings, LayoutCalculator::from_entropy())
    }
}

impl<P: Platform, R: Rng> ScatterEngine<P, R> {
    /// Creates an engine with the given layout calculator.
    pub fn with_calculator(
        platform: P,
        settings: EngineSettings,
        calculator: LayoutCalculator<R>,
    ) -> Self {
        let (handle, queue) = messages::channel();
        Self {
            throttle: UpdateThrottle::new(settings.update_interval),
            platform,
            settings,
            guard: TransitionGuard::new(),
            calculator,
            cache: ScatterSessionCache::new(),
            thumbnails: ThumbnailManager::new(),
            animation: None,
            pending_switch: None,
            modifier_release_at: None,
            host: None,
            handle,
            queue,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Sender for requests from other contexts.
    #[must_use]
    pub fn handle(&self) -> EngineHandle { self.handle.clone() }

    /// Shared transition guard.
    #[must_use]
    pub fn guard(&self) -> TransitionGuard { self.guard.clone() }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ScatterPhase { self.guard.phase() }

    /// The platform collaborators.
    pub const fn platform(&self) -> &P { &self.platform }

    /// Mutable access to the platform collaborators.
    pub const fn platform_mut(&mut self) -> &mut P { &mut self.platform }

    /// Thumbnail records of the current cycle.
    pub const fn thumbnails(&self) -> &ThumbnailManager { &self.thumbnails }

    /// Replaces the settings; takes effect on the next cycle.
    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.throttle = UpdateThrottle::new(settings.update_interval);
        self.settings = settings;
    }

    /// Whether the host loop should keep ticking every frame.
    #[must_use]
    pub const fn needs_frames(&self) -> bool {
        self.animation.is_some() || self.pending_switch.is_some() || self.modifier_release_at.is_some()
    }

    // ========================================================================
    // Message loop integration
    // ========================================================================

    /// Processes every queued message.
    ///
    /// Returns `false` once a shutdown was requested.
    pub fn drain(&mut self, now: Instant) -> bool {
        while let Some(msg) = self.queue.try_next() {
            if !self.handle_message(msg, now) {
                return false;
            }
        }
        true
    }

    /// Handles a single message. Returns `false` for shutdown.
    pub fn handle_message(&mut self, msg: EngineMessage, now: Instant) -> bool {
        tracing::trace!(message = msg.name(), phase = %self.phase(), "scatter: handling message");
        match msg {
            EngineMessage::Trigger(source) => match self.trigger(now) {
                Ok(outcome) => tracing::debug!(%source, ?outcome, "scatter: trigger handled"),
                Err(err) => tracing::error!(%source, error = %err, "scatter: trigger failed"),
            },
            EngineMessage::Select(window) => {
                self.select(window, now);
            }
            EngineMessage::Click(point) => {
                self.click(point, now);
            }
            EngineMessage::Cancel => {
                self.cancel(now);
            }
            EngineMessage::Shutdown => {
                self.shutdown();
                return false;
            }
        }
        true
    }

    // ========================================================================
    // Scatter
    // ========================================================================

    /// Starts a scatter cycle.
    ///
    /// Silently ignored unless idle. Finding no window, or acquiring no
    /// thumbnail, notifies the user and returns to idle.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoHostSurface`] if the overlay surface does
    /// not exist; the cycle is aborted.
    pub fn trigger(&mut self, now: Instant) -> Result<EngineOutcome, PlatformError> {
        let ticket = match self.guard.begin(TransitionKind::Scatter) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                tracing::debug!(%rejected, "scatter: trigger ignored");
                return Ok(EngineOutcome::Ignored);
            }
        };

        let Some(host) = self.platform.host_surface() else {
            self.platform.notify("Window Scatter could not create its overlay window.");
            self.guard.abort(ticket);
            return Err(PlatformError::NoHostSurface);
        };
        self.host = Some(host);

        // Leftovers of an interrupted cycle
        self.thumbnails.release_all(&mut self.platform);

        let mut windows = self.platform.enumerate_visible_windows(&self.settings.excluded_titles);
        windows.truncate(self.settings.max_windows);
        if windows.is_empty() {
            self.platform.notify("No windows to scatter.");
            self.guard.abort(ticket);
            return Ok(EngineOutcome::NothingToShow);
        }

        let (layouts, reused_layout) = self.layouts_for(&windows);
        let registration = self.thumbnails.register(&mut self.platform, host, &layouts);
        if registration.registered == 0 {
            self.platform.notify("Could not capture any window.");
            self.guard.abort(ticket);
            return Ok(EngineOutcome::NothingToShow);
        }

        self.thumbnails.update_all(&mut self.platform);
        self.platform.set_backdrop_blur(0.0);
        self.platform.show();

        self.throttle.reset();
        self.animation = Some(ActiveAnimation {
            clock: AnimationClock::start(
                now,
                self.settings.animation_duration,
                AnimationDirection::Forward,
            ),
            purpose: AnimationPurpose::Reveal,
        });
        self.modifier_release_at = Some(now + self.settings.modifier_release_delay);
        self.guard.finish_scatter(ticket);

        tracing::info!(
            windows = registration.registered,
            skipped = registration.skipped,
            reused_layout,
            "scatter: overlay shown"
        );

        Ok(EngineOutcome::Scattered {
            windows: registration.registered,
            reused_layout,
        })
    }

    /// Cached layouts when the window sequence is unchanged, fresh ones
    /// otherwise.
    fn layouts_for(&mut self, windows: &[SourceWindow]) -> (Vec<PlacedLayout>, bool) {
        if let Some(layouts) = self.cache.lookup(windows) {
            return (layouts, true);
        }

        let plan = self.calculator.calculate(windows, self.platform.canvas_size());
        if plan.fallbacks > 0 {
            tracing::warn!(fallbacks = plan.fallbacks, "scatter: some windows overlap");
        }
        self.cache.store(windows, &plan.layouts);
        (plan.layouts, false)
    }

    // ========================================================================
    // Switch
    // ========================================================================

    /// Picks the window under `point`, if any.
    pub fn click(&mut self, point: Point, now: Instant) -> EngineOutcome {
        match self.thumbnails.hit_test(point) {
            Some(window) => self.select(window, now),
            None => EngineOutcome::Ignored,
        }
    }

    /// Switches to `window`.
    ///
    /// The real window is raised right away; the reverse animation starts
    /// after a short settle delay on a later [`tick`](Self::tick).
    pub fn select(&mut self, window: WindowHandle, now: Instant) -> EngineOutcome {
        let ticket = match self.guard.begin(TransitionKind::Switch) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                tracing::debug!(%rejected, window = %window, "scatter: switch ignored");
                return EngineOutcome::Ignored;
            }
        };

        if self.thumbnails.find(window).is_none() {
            self.guard.revert(ticket);
            return EngineOutcome::Ignored;
        }

        if let Err(err) = self.platform.restore_and_focus(window) {
            tracing::warn!(error = %err, window = %window, "scatter: failed to focus window");
        }
        self.thumbnails.bring_to_front(window);
        for order in [ZOrder::Topmost, ZOrder::NotTopmost] {
            if let Err(err) = self.platform.set_z_order(window, order) {
                tracing::warn!(error = %err, window = %window, "scatter: failed to reorder window");
            }
        }

        self.pending_switch = Some(PendingSwitch {
            window,
            due: now + self.settings.switch_settle,
            ticket,
        });
        EngineOutcome::Transitioning
    }

    fn start_switch_back(&mut self, pending: PendingSwitch, now: Instant) {
        let host = self.host.or_else(|| self.platform.host_surface());
        let ids: Vec<ThumbnailId> = self.thumbnails.iter().map(|(id, _)| id).collect();

        for id in ids {
            let Some(window) = self.thumbnails.get(id).map(|state| state.window.handle) else {
                continue;
            };
            let live = self.platform.live_rect(window).ok().map(Rect::from);
            self.thumbnails.reverse_to(id, live);

            let Some(host) = host else {
                continue;
            };
            if let Err(err) = self.thumbnails.reacquire(&mut self.platform, host, id) {
                tracing::warn!(error = %err, window = %window, "scatter: dropping thumbnail");
            }
        }

        self.thumbnails.update_all(&mut self.platform);
        self.throttle.reset();
        self.animation = Some(ActiveAnimation {
            clock: AnimationClock::start(
                now,
                self.settings.animation_duration,
                AnimationDirection::Reverse,
            ),
            purpose: AnimationPurpose::SwitchBack {
                window: pending.window,
                ticket: pending.ticket,
            },
        });
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    /// Animates every thumbnail back and hides the overlay.
    pub fn cancel(&mut self, now: Instant) -> EngineOutcome {
        let ticket = match self.guard.begin(TransitionKind::Cancel) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                tracing::debug!(%rejected, "scatter: cancel ignored");
                return EngineOutcome::Ignored;
            }
        };

        self.thumbnails.reverse_all();
        self.thumbnails.update_all(&mut self.platform);
        self.throttle.reset();
        self.animation = Some(ActiveAnimation {
            clock: AnimationClock::start(
                now,
                self.settings.animation_duration,
                AnimationDirection::Reverse,
            ),
            purpose: AnimationPurpose::CancelBack { ticket },
        });
        EngineOutcome::Transitioning
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Advances timers and the running animation.
    ///
    /// Returns whether more frames are needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.modifier_release_at.is_some_and(|at| now >= at) {
            self.modifier_release_at = None;
            self.platform.release_modifier_keys();
        }

        let due = self.pending_switch.as_ref().is_some_and(|pending| now >= pending.due);
        if let Some(pending) = self.pending_switch.take_if(|_| due) {
            self.start_switch_back(pending, now);
        }

        self.step_animation(now);
        self.needs_frames()
    }

    fn step_animation(&mut self, now: Instant) {
        let Some(active) = &self.animation else {
            return;
        };

        let progress = active.clock.progress(now);
        let finished = active.clock.is_finished(now);
        let blur = match active.clock.direction() {
            AnimationDirection::Forward => lerp(0.0, self.settings.backdrop_blur, progress),
            AnimationDirection::Reverse => lerp(self.settings.backdrop_blur, 0.0, progress),
        };

        self.thumbnails.advance(if finished { 1.0 } else { progress });
        self.platform.set_backdrop_blur(blur);
        if self.throttle.permit(now, finished) {
            self.thumbnails.update_all(&mut self.platform);
        }

        if !finished {
            return;
        }
        if let Some(active) = self.animation.take() {
            self.finish_animation(active.purpose);
        }
    }

    fn finish_animation(&mut self, purpose: AnimationPurpose) {
        match purpose {
            AnimationPurpose::Reveal => {
                self.guard.settle();
                tracing::debug!("scatter: thumbnails settled");
            }
            AnimationPurpose::SwitchBack { window, ticket } => {
                self.platform.hide();
                self.release_resources();
                if let Err(err) = self.platform.restore_and_focus(window) {
                    tracing::warn!(error = %err, window = %window, "scatter: failed to focus window");
                }
                self.guard.complete(ticket);
                tracing::info!(window = %window, "scatter: switched");
            }
            AnimationPurpose::CancelBack { ticket } => {
                self.platform.hide();
                self.release_resources();
                self.guard.complete(ticket);
                tracing::info!("scatter: canceled");
            }
        }
    }

    fn release_resources(&mut self) {
        self.thumbnails.release_all(&mut self.platform);
        self.platform.set_backdrop_blur(0.0);
    }

    /// Releases everything and hides the overlay regardless of phase.
    pub fn shutdown(&mut self) {
        self.animation = None;
        self.pending_switch = None;
        self.modifier_release_at = None;
        self.release_resources();
        self.platform.hide();
        self.cache.clear();
    }
}
