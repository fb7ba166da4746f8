//! Thumbnail lifecycle manager.
//!
//! Owns every live compositor thumbnail of a scatter cycle together with the
//! rectangles driving its animation. Records are kept in a slot map keyed by
//! a stable [`ThumbnailId`]; the window handle inside each record is treated
//! as untrusted and checked before any window-system call.
//!
//! Invariants:
//! - at most one record (and thus one live thumbnail) per source window;
//! - a record's thumbnail is released before a replacement is acquired;
//! - [`ThumbnailManager::release_all`] leaves no live thumbnail behind.

use slotmap::{SlotMap, new_key_type};

use super::animation::interpolate;
use super::geometry::{Point, Rect};
use super::layout::PlacedLayout;
use super::window::{SourceWindow, WindowHandle};
use crate::platform::{Compositor, HostSurface, PlatformError, ThumbnailHandle, WindowSystem};

/// Opacity used for every thumbnail update.
const THUMBNAIL_OPACITY: u8 = 255;

new_key_type! {
    /// Stable identifier of a thumbnail record within one cycle.
    pub struct ThumbnailId;
}

/// Live per-window animation record.
#[derive(Debug)]
pub struct ThumbnailState {
    /// Window mirrored by this thumbnail.
    pub window: SourceWindow,
    /// Where the current animation starts.
    pub start: Rect,
    /// Where the current animation ends.
    pub target: Rect,
    /// Last interpolated rectangle.
    pub current: Rect,
    /// Whether the window was minimized when it was captured. A snapshot
    /// only: enumeration skips minimized windows, and neither cancel nor
    /// switch restores this state.
    pub was_minimized: bool,
    /// Clickable area on the overlay.
    pub hit_region: Rect,
    thumbnail: Option<ThumbnailHandle>,
}

impl ThumbnailState {
    /// Whether the record currently owns a live thumbnail.
    #[must_use]
    pub const fn is_live(&self) -> bool { self.thumbnail.is_some() }

    /// Swaps start and target and rewinds to the new start.
    fn reverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.target);
        self.current = self.start;
        self.hit_region = self.start;
    }
}

/// Result of registering a batch of layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOutcome {
    /// Thumbnails acquired.
    pub registered: usize,
    /// Windows skipped because acquisition failed or the window vanished.
    pub skipped: usize,
}

/// Owner of all thumbnail records of the current cycle.
#[derive(Debug, Default)]
pub struct ThumbnailManager {
    records: SlotMap<ThumbnailId, ThumbnailState>,
    /// Processing order; the last entry is drawn on top.
    order: Vec<ThumbnailId>,
}

impl ThumbnailManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize { self.order.len() }

    /// Whether no record exists.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// Number of thumbnails currently held.
    #[must_use]
    pub fn live_count(&self) -> usize { self.records.values().filter(|s| s.is_live()).count() }

    /// Records in processing order (top-most last).
    pub fn iter(&self) -> impl Iterator<Item = (ThumbnailId, &ThumbnailState)> {
        self.order.iter().filter_map(|&id| self.records.get(id).map(|state| (id, state)))
    }

    /// Record for the given window, if any.
    #[must_use]
    pub fn find(&self, window: WindowHandle) -> Option<ThumbnailId> {
        self.order
            .iter()
            .copied()
            .find(|&id| self.records.get(id).is_some_and(|s| s.window.handle == window))
    }

    /// Record by id.
    #[must_use]
    pub fn get(&self, id: ThumbnailId) -> Option<&ThumbnailState> { self.records.get(id) }

    // ========================================================================
    // Acquisition
    // ========================================================================

    /// Acquires one thumbnail per layout, in layout order.
    ///
    /// Windows that vanished or whose thumbnail cannot be acquired are
    /// skipped; the rest of the batch is still registered. A window that is
    /// already registered has its old thumbnail released first.
    pub fn register<P>(
        &mut self,
        platform: &mut P,
        host: HostSurface,
        layouts: &[PlacedLayout],
    ) -> RegisterOutcome
    where
        P: WindowSystem + Compositor,
    {
        let mut outcome = RegisterOutcome::default();

        for layout in layouts {
            let handle = layout.window.handle;
            if let Some(existing) = self.find(handle) {
                self.remove(platform, existing);
            }

            if !platform.is_window(handle) {
                tracing::debug!(window = %handle, "scatter: window vanished before registration");
                outcome.skipped += 1;
                continue;
            }

            let was_minimized = platform.is_minimized(handle);
            match platform.acquire_thumbnail(host, handle) {
                Ok(thumbnail) => {
                    let start = layout.window.frame();
                    let id = self.records.insert(ThumbnailState {
                        window: layout.window.clone(),
                        start,
                        target: layout.rect,
                        current: start,
                        was_minimized,
                        hit_region: layout.rect,
                        thumbnail: Some(thumbnail),
                    });
                    self.order.push(id);
                    outcome.registered += 1;
                }
                Err(err) => {
                    tracing::warn!(error = %err, window = %handle, "scatter: skipping window");
                    outcome.skipped += 1;
                }
            }
        }

        outcome
    }

    /// Replaces a record's thumbnail with a fresh one, releasing the old one
    /// first. On failure the record is dropped from the cycle.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error after the record has been removed.
    pub fn reacquire<P>(
        &mut self,
        platform: &mut P,
        host: HostSurface,
        id: ThumbnailId,
    ) -> Result<(), PlatformError>
    where
        P: WindowSystem + Compositor,
    {
        let Some(state) = self.records.get_mut(id) else {
            return Ok(());
        };

        if let Some(old) = state.thumbnail.take() {
            platform.release_thumbnail(old);
        }

        let handle = state.window.handle;
        let result = if platform.is_window(handle) {
            platform.acquire_thumbnail(host, handle)
        } else {
            Err(PlatformError::InvalidWindow(handle))
        };

        match result {
            Ok(thumbnail) => {
                state.thumbnail = Some(thumbnail);
                Ok(())
            }
            Err(err) => {
                self.remove(platform, id);
                Err(err)
            }
        }
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Moves every record to `progress` between its start and target.
    pub fn advance(&mut self, progress: f64) {
        for state in self.records.values_mut() {
            state.current = interpolate(&state.start, &state.target, progress);
            state.hit_region = state.current;
        }
    }

    /// Reverses every record in place (cancel path).
    pub fn reverse_all(&mut self) { self.records.values_mut().for_each(ThumbnailState::reverse); }

    /// Prepares a record for the switch-back animation: it starts where it
    /// is drawn now and returns to `live`, the window's current rectangle.
    ///
    /// When the live rectangle is unknown the original rectangle is used.
    pub fn reverse_to(&mut self, id: ThumbnailId, live: Option<Rect>) {
        if let Some(state) = self.records.get_mut(id) {
            if let Some(live) = live {
                state.start = live;
            }
            state.reverse();
        }
    }

    /// Pushes a record's current rectangle to its thumbnail.
    ///
    /// # Errors
    ///
    /// Returns an error if the compositor rejects the update.
    pub fn update_position<C: Compositor>(
        &self,
        compositor: &mut C,
        id: ThumbnailId,
    ) -> Result<(), PlatformError> {
        match self.records.get(id) {
            Some(ThumbnailState { thumbnail: Some(thumbnail), current, .. }) => {
                compositor.update_thumbnail_rect(thumbnail, current.round(), THUMBNAIL_OPACITY)
            }
            _ => Ok(()),
        }
    }

    /// Pushes every record. A failing record is logged and skipped.
    pub fn update_all<C: Compositor>(&self, compositor: &mut C) {
        for &id in &self.order {
            if let Err(err) = self.update_position(compositor, id) {
                tracing::warn!(error = %err, "scatter: thumbnail update failed");
            }
        }
    }

    // ========================================================================
    // Ordering and hit testing
    // ========================================================================

    /// Moves a window's record to the end of the processing order, which
    /// also makes it the top-most hit region.
    pub fn bring_to_front(&mut self, window: WindowHandle) -> bool {
        let Some(position) = self
            .order
            .iter()
            .position(|&id| self.records.get(id).is_some_and(|s| s.window.handle == window))
        else {
            return false;
        };
        let id = self.order.remove(position);
        self.order.push(id);
        true
    }

    /// Window whose hit region contains `point`, top-most first.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<WindowHandle> {
        self.order
            .iter()
            .rev()
            .filter_map(|&id| self.records.get(id))
            .find(|state| state.hit_region.contains(point))
            .map(|state| state.window.handle)
    }

    // ========================================================================
    // Release
    // ========================================================================

    fn remove<C: Compositor>(&mut self, compositor: &mut C, id: ThumbnailId) {
        if let Some(thumbnail) = self.records.remove(id).and_then(|mut s| s.thumbnail.take()) {
            compositor.release_thumbnail(thumbnail);
        }
        self.order.retain(|&other| other != id);
    }

    /// Releases every thumbnail and forgets all records.
    ///
    /// Safe to call when nothing is registered.
    pub fn release_all<C: Compositor>(&mut self, compositor: &mut C) {
        for (_, mut state) in self.records.drain() {
            if let Some(thumbnail) = state.thumbnail.take() {
                compositor.release_thumbnail(thumbnail);
            }
        }
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scatter::geometry::ScreenRect;
    use crate::scatter::testing::FakePlatform;

    fn layout(id: isize, rect: Rect) -> PlacedLayout {
        let window = SourceWindow::new(
            WindowHandle(id),
            format!("Window {id}"),
            ScreenRect::from_origin_size(0, 0, 800, 600),
        );
        PlacedLayout {
            original_width: window.width(),
            original_height: window.height(),
            window,
            rect,
        }
    }

    const HOST: HostSurface = HostSurface(1);

    #[test]
    fn test_register_seeds_rectangles() {
        let mut platform = FakePlatform::with_windows(&[1]);
        let mut manager = ThumbnailManager::new();
        let target = Rect::new(100.0, 100.0, 400.0, 300.0);

        let outcome = manager.register(&mut platform, HOST, &[layout(1, target)]);

        assert_eq!(outcome, RegisterOutcome { registered: 1, skipped: 0 });
        let (_, state) = manager.iter().next().unwrap();
        assert_eq!(state.start, Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(state.current, state.start);
        assert_eq!(state.target, target);
        assert_eq!(platform.live_thumbnails(), 1);
    }

    #[test]
    fn test_register_skips_failed_windows() {
        let mut platform = FakePlatform::with_windows(&[1, 2, 3]);
        platform.fail_acquire_for(2);
        let mut manager = ThumbnailManager::new();

        let layouts = [
            layout(1, Rect::default()),
            layout(2, Rect::default()),
            layout(3, Rect::default()),
            layout(4, Rect::default()),
        ];
        let outcome = manager.register(&mut platform, HOST, &layouts);

        assert_eq!(outcome, RegisterOutcome { registered: 2, skipped: 2 });
        assert_eq!(manager.len(), 2);
        assert_eq!(platform.live_thumbnails(), 2);
    }

    #[test]
    fn test_register_twice_keeps_one_thumbnail_per_window() {
        let mut platform = FakePlatform::with_windows(&[1]);
        let mut manager = ThumbnailManager::new();

        manager.register(&mut platform, HOST, &[layout(1, Rect::default())]);
        manager.register(&mut platform, HOST, &[layout(1, Rect::default())]);

        assert_eq!(manager.len(), 1);
        assert_eq!(platform.live_thumbnails(), 1);
        assert!(!platform.acquired_while_live());
    }

    #[test]
    fn test_release_all_is_idempotent() {
        let mut platform = FakePlatform::with_windows(&[1, 2]);
        let mut manager = ThumbnailManager::new();
        manager.register(&mut platform, HOST, &[layout(1, Rect::default()), layout(2, Rect::default())]);

        manager.release_all(&mut platform);
        manager.release_all(&mut platform);

        assert!(manager.is_empty());
        assert_eq!(platform.live_thumbnails(), 0);
        assert_eq!(platform.release_count(), 2);
    }

    #[test]
    fn test_reacquire_releases_before_acquiring() {
        let mut platform = FakePlatform::with_windows(&[1]);
        let mut manager = ThumbnailManager::new();
        manager.register(&mut platform, HOST, &[layout(1, Rect::default())]);
        let id = manager.find(WindowHandle(1)).unwrap();

        manager.reacquire(&mut platform, HOST, id).unwrap();

        assert_eq!(platform.live_thumbnails(), 1);
        assert_eq!(platform.release_count(), 1);
        assert!(!platform.acquired_while_live());
    }

    #[test]
    fn test_reacquire_failure_drops_record() {
        let mut platform = FakePlatform::with_windows(&[1, 2]);
        let mut manager = ThumbnailManager::new();
        manager.register(&mut platform, HOST, &[layout(1, Rect::default()), layout(2, Rect::default())]);
        let id = manager.find(WindowHandle(2)).unwrap();

        platform.close_window(2);
        assert!(manager.reacquire(&mut platform, HOST, id).is_err());

        assert_eq!(manager.len(), 1);
        assert!(manager.find(WindowHandle(2)).is_none());
        assert_eq!(platform.live_thumbnails(), 1);
    }

    #[test]
    fn test_advance_hits_endpoints_exactly() {
        let mut platform = FakePlatform::with_windows(&[1]);
        let mut manager = ThumbnailManager::new();
        let target = Rect::new(123.4, 56.7, 321.0, 240.75);
        manager.register(&mut platform, HOST, &[layout(1, target)]);

        manager.advance(0.0);
        let (_, state) = manager.iter().next().unwrap();
        assert_eq!(state.current, state.start);

        manager.advance(1.0);
        let (_, state) = manager.iter().next().unwrap();
        assert_eq!(state.current, target);
    }

    #[test]
    fn test_reverse_all_swaps() {
        let mut platform = FakePlatform::with_windows(&[1]);
        let mut manager = ThumbnailManager::new();
        let target = Rect::new(10.0, 10.0, 100.0, 75.0);
        manager.register(&mut platform, HOST, &[layout(1, target)]);

        manager.reverse_all();

        let (_, state) = manager.iter().next().unwrap();
        assert_eq!(state.start, target);
        assert_eq!(state.current, target);
        assert_eq!(state.target, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_reverse_to_live_rect() {
        let mut platform = FakePlatform::with_windows(&[1]);
        let mut manager = ThumbnailManager::new();
        let target = Rect::new(10.0, 10.0, 100.0, 75.0);
        manager.register(&mut platform, HOST, &[layout(1, target)]);
        let id = manager.find(WindowHandle(1)).unwrap();

        let live = Rect::new(300.0, 200.0, 800.0, 600.0);
        manager.reverse_to(id, Some(live));

        let state = manager.get(id).unwrap();
        assert_eq!(state.start, target);
        assert_eq!(state.target, live);
    }

    #[test]
    fn test_hit_test_prefers_top_most() {
        let mut platform = FakePlatform::with_windows(&[1, 2]);
        let mut manager = ThumbnailManager::new();
        let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        manager.register(&mut platform, HOST, &[layout(1, rect), layout(2, rect)]);

        assert_eq!(manager.hit_test(Point::new(50.0, 50.0)), Some(WindowHandle(2)));
        assert!(manager.bring_to_front(WindowHandle(1)));
        assert_eq!(manager.hit_test(Point::new(50.0, 50.0)), Some(WindowHandle(1)));
        assert_eq!(manager.hit_test(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_bring_to_front_unknown_window() {
        let mut manager = ThumbnailManager::new();
        assert!(!manager.bring_to_front(WindowHandle(9)));
    }

    #[test]
    fn test_update_all_skips_failures() {
        let mut platform = FakePlatform::with_windows(&[1, 2]);
        let mut manager = ThumbnailManager::new();
        manager.register(&mut platform, HOST, &[layout(1, Rect::default()), layout(2, Rect::default())]);
        platform.fail_updates(true);

        manager.update_all(&mut platform);

        assert_eq!(platform.update_count(), 0);
        platform.fail_updates(false);
        manager.update_all(&mut platform);
        assert_eq!(platform.update_count(), 2);
    }
}
