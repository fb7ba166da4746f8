//! Source window snapshots and the enumeration filter.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Rect, ScreenRect};

/// Smallest window edge (in pixels) that is worth scattering.
pub const MIN_WINDOW_EDGE: i32 = 100;

/// Default cap on the number of scattered windows.
pub const DEFAULT_MAX_WINDOWS: usize = 20;

/// Title fragments that mark helper or shell windows (case-insensitive).
const EXCLUDED_TITLE_FRAGMENTS: &[&str] = &[
    "window scatter",
    "program manager",
    "microsoft text input",
    "windows input",
    "nvidia geforce",
];

/// Titles of input-method helper windows, matched exactly.
const EXCLUDED_EXACT_TITLES: &[&str] = &["Default IME", "MSCTFIME UI", "GDI+ Window"];

/// Opaque identifier of a top-level window, owned by the window system.
///
/// The value may become stale at any time (windows close mid-cycle), so
/// platform calls must validate it before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

/// Immutable snapshot of a window taken during one enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWindow {
    /// Window-system handle.
    pub handle: WindowHandle,
    /// Title at enumeration time.
    pub title: String,
    /// On-screen rectangle at enumeration time.
    pub rect: ScreenRect,
}

impl SourceWindow {
    /// Creates a new snapshot.
    #[must_use]
    pub fn new(handle: WindowHandle, title: impl Into<String>, rect: ScreenRect) -> Self {
        Self { handle, title: title.into(), rect }
    }

    /// Original rectangle as floating point geometry.
    #[must_use]
    pub fn frame(&self) -> Rect { Rect::from(self.rect) }

    /// Original width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 { f64::from(self.rect.width()) }

    /// Original height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 { f64::from(self.rect.height()) }
}

/// Raw attributes of an enumerated window, before filtering.
#[derive(Debug, Clone)]
pub struct WindowProbe<'a> {
    pub title: &'a str,
    pub visible: bool,
    pub minimized: bool,
    pub rect: ScreenRect,
}

/// Returns whether an enumerated window should take part in a scatter cycle.
///
/// `extra_exclusions` are user-configured title fragments, matched
/// case-insensitively like the built-in list.
#[must_use]
pub fn is_scatter_candidate(probe: &WindowProbe<'_>, extra_exclusions: &[String]) -> bool {
    if !probe.visible || probe.minimized {
        return false;
    }

    let title = probe.title.trim();
    if title.is_empty() || EXCLUDED_EXACT_TITLES.contains(&title) {
        return false;
    }

    let lowered = title.to_lowercase();
    let excluded = EXCLUDED_TITLE_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment))
        || extra_exclusions
            .iter()
            .filter(|fragment| !fragment.trim().is_empty())
            .any(|fragment| lowered.contains(&fragment.to_lowercase()));
    if excluded {
        return false;
    }

    probe.rect.width() >= MIN_WINDOW_EDGE && probe.rect.height() >= MIN_WINDOW_EDGE
}
