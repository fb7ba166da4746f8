//! Binding packed footprints to concrete windows.

use crate::scatter::geometry::Rect;
use crate::scatter::window::SourceWindow;

/// Matches each window (in enumeration order) with the unclaimed slot whose
/// center is closest to the window's own center.
///
/// Returns, for every window, the index of the slot it claimed. When there are
/// fewer slots than windows the trailing windows get `None`.
#[must_use]
pub fn nearest_slots(windows: &[SourceWindow], slots: &[Rect]) -> Vec<Option<usize>> {
    let mut available: Vec<usize> = (0..slots.len()).collect();

    windows
        .iter()
        .map(|window| {
            let origin = window.rect.center();
            let (position, _) = available.iter().enumerate().fold(
                (None, f64::INFINITY),
                |(best, best_distance), (position, &slot)| {
                    let distance = slots[slot].center().distance(origin);
                    if distance < best_distance {
                        (Some(position), distance)
                    } else {
                        (best, best_distance)
                    }
                },
            );
            position.map(|position| available.remove(position))
        })
        .collect()
}

/// Shrinks `slot` so it has exactly the aspect ratio of `width`×`height`
/// while fitting inside it. The top-left corner is kept.
#[must_use]
pub fn fit_aspect(slot: Rect, width: f64, height: f64) -> Rect {
    if width <= 0.0 || height <= 0.0 || slot.width <= 0.0 || slot.height <= 0.0 {
        return slot;
    }

    let window_ratio = width / height;
    let slot_ratio = slot.width / slot.height;

    if window_ratio > slot_ratio {
        Rect::new(slot.x, slot.y, slot.width, slot.width / window_ratio)
    } else {
        Rect::new(slot.x, slot.y, slot.height * window_ratio, slot.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scatter::geometry::ScreenRect;
    use crate::scatter::window::WindowHandle;

    fn window(id: isize, x: i32, y: i32) -> SourceWindow {
        SourceWindow::new(WindowHandle(id), "w", ScreenRect::from_origin_size(x, y, 200, 200))
    }

    #[test]
    fn test_nearest_slots_prefers_closest() {
        let windows = vec![window(1, 1500, 100), window(2, 100, 100)];
        let slots = vec![Rect::new(50.0, 50.0, 300.0, 200.0), Rect::new(1400.0, 50.0, 300.0, 200.0)];

        assert_eq!(nearest_slots(&windows, &slots), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_nearest_slots_first_window_wins_contention() {
        // Both windows are closest to slot 0; the first one in enumeration order claims it.
        let windows = vec![window(1, 0, 0), window(2, 10, 10)];
        let slots = vec![Rect::new(0.0, 0.0, 200.0, 200.0), Rect::new(1500.0, 900.0, 200.0, 200.0)];

        assert_eq!(nearest_slots(&windows, &slots), vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_nearest_slots_with_missing_slots() {
        let windows = vec![window(1, 0, 0), window(2, 10, 10)];
        let slots = vec![Rect::new(0.0, 0.0, 200.0, 200.0)];

        assert_eq!(nearest_slots(&windows, &slots), vec![Some(0), None]);
    }

    #[test]
    fn test_fit_aspect_wide_window_pins_width() {
        let fitted = fit_aspect(Rect::new(10.0, 20.0, 400.0, 400.0), 1600.0, 900.0);
        assert_eq!(fitted, Rect::new(10.0, 20.0, 400.0, 225.0));
    }

    #[test]
    fn test_fit_aspect_tall_window_pins_height() {
        let fitted = fit_aspect(Rect::new(0.0, 0.0, 400.0, 300.0), 600.0, 900.0);
        assert_eq!(fitted, Rect::new(0.0, 0.0, 200.0, 300.0));
    }

    #[test]
    fn test_fit_aspect_degenerate_window_keeps_slot() {
        let slot = Rect::new(0.0, 0.0, 400.0, 300.0);
        assert_eq!(fit_aspect(slot, 0.0, 900.0), slot);
    }
}
