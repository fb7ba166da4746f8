//! Layout reuse between consecutive scatter cycles.
//!
//! When the enumerated window sequence is identical to the previous one
//! (same handles, same order) the previous placements are reused so the
//! packer does not run again and thumbnails land in the same spots.

use super::layout::PlacedLayout;
use super::window::{SourceWindow, WindowHandle};

/// The last computed layouts and the window sequence that produced them.
#[derive(Debug, Default, Clone)]
pub struct ScatterSessionCache {
    handles: Vec<WindowHandle>,
    layouts: Vec<PlacedLayout>,
}

impl ScatterSessionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.handles.is_empty() }

    /// Returns the cached layouts if `windows` has exactly the cached handle
    /// sequence.
    ///
    /// Geometry is reused as-is; each layout's window snapshot is replaced by
    /// the fresh one so titles and rectangles stay current.
    #[must_use]
    pub fn lookup(&self, windows: &[SourceWindow]) -> Option<Vec<PlacedLayout>> {
        if self.handles.is_empty() || !self.handles.iter().copied().eq(windows.iter().map(|w| w.handle))
        {
            return None;
        }

        self.layouts
            .iter()
            .map(|layout| {
                let fresh = windows.iter().find(|w| w.handle == layout.window.handle)?;
                Some(PlacedLayout { window: fresh.clone(), ..layout.clone() })
            })
            .collect()
    }

    /// Replaces the cache with a new computation.
    pub fn store(&mut self, windows: &[SourceWindow], layouts: &[PlacedLayout]) {
        self.handles = windows.iter().map(|w| w.handle).collect();
        self.layouts = layouts.to_vec();
    }

    /// Forgets the cached layouts.
    pub fn clear(&mut self) {
        self.handles.clear();
        self.layouts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scatter::geometry::{Rect, ScreenRect};

    fn window(id: isize, title: &str) -> SourceWindow {
        SourceWindow::new(WindowHandle(id), title, ScreenRect::from_origin_size(0, 0, 640, 480))
    }

    fn layouts(windows: &[SourceWindow]) -> Vec<PlacedLayout> {
        windows
            .iter()
            .zip(0i32..)
            .map(|(w, i)| PlacedLayout {
                window: w.clone(),
                rect: Rect::new(f64::from(i) * 10.0, 0.0, 320.0, 240.0),
                original_width: 640.0,
                original_height: 480.0,
            })
            .collect()
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = ScatterSessionCache::new();
        assert!(cache.lookup(&[]).is_none());
        assert!(cache.lookup(&[window(1, "a")]).is_none());
    }

    #[test]
    fn test_identical_sequence_hits() {
        let windows = vec![window(1, "a"), window(2, "b")];
        let mut cache = ScatterSessionCache::new();
        cache.store(&windows, &layouts(&windows));

        assert_eq!(cache.lookup(&windows), Some(layouts(&windows)));
    }

    #[test]
    fn test_reordered_sequence_misses() {
        let windows = vec![window(1, "a"), window(2, "b")];
        let mut cache = ScatterSessionCache::new();
        cache.store(&windows, &layouts(&windows));

        assert!(cache.lookup(&[window(2, "b"), window(1, "a")]).is_none());
        assert!(cache.lookup(&[window(1, "a")]).is_none());
        assert!(cache.lookup(&[window(1, "a"), window(2, "b"), window(3, "c")]).is_none());
    }

    #[test]
    fn test_hit_refreshes_metadata_only() {
        let windows = vec![window(1, "a"), window(2, "b")];
        let mut cache = ScatterSessionCache::new();
        let stored = layouts(&windows);
        cache.store(&windows, &stored);

        let renamed = vec![window(1, "a (edited)"), window(2, "b")];
        let hit = cache.lookup(&renamed).unwrap();

        assert_eq!(hit[0].window.title, "a (edited)");
        assert_eq!(hit[0].rect, stored[0].rect);
        assert_eq!(hit[1].rect, stored[1].rect);
    }

    #[test]
    fn test_clear() {
        let windows = vec![window(1, "a")];
        let mut cache = ScatterSessionCache::new();
        cache.store(&windows, &layouts(&windows));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.lookup(&windows).is_none());
    }
}
