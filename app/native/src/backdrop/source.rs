//! Locating the current desktop wallpaper.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How often the wallpaper path is re-checked while the app runs.
pub const WALLPAPER_CHECK_INTERVAL: Duration = Duration::from_secs(2);

/// Location of the theme cache below the roaming application data folder.
const THEMES_DIR: [&str; 3] = ["Microsoft", "Windows", "Themes"];

/// Returns the current wallpaper file, if one can be found.
///
/// Asks the desktop first, then falls back to the transcoded copy Windows
/// keeps in the theme folder, then to the first cached theme file.
#[must_use]
pub fn wallpaper_path() -> Option<PathBuf> {
    let reported = wallpaper::get()
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .filter(|path| path.is_file());

    reported.or_else(|| dirs::config_dir().and_then(|app_data| fallback_wallpaper(&app_data)))
}

/// Looks for a wallpaper in the theme folder below `app_data`.
#[must_use]
pub fn fallback_wallpaper(app_data: &Path) -> Option<PathBuf> {
    let themes = THEMES_DIR.iter().fold(app_data.to_path_buf(), |dir, part| dir.join(part));

    let transcoded = themes.join("TranscodedWallpaper");
    if transcoded.is_file() {
        return Some(transcoded);
    }

    let mut cached: Vec<PathBuf> = fs::read_dir(themes.join("CachedFiles"))
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    cached.sort();
    cached.into_iter().next()
}

/// Detects wallpaper changes so the backdrop can be rebuilt.
#[derive(Debug, Default)]
pub struct WallpaperWatcher {
    current: Option<PathBuf>,
    last_check: Option<Instant>,
}

impl WallpaperWatcher {
    /// Creates a watcher that knows `current` as the wallpaper in use.
    #[must_use]
    pub const fn new(current: Option<PathBuf>) -> Self { Self { current, last_check: None } }

    /// The wallpaper path last seen.
    #[must_use]
    pub fn current(&self) -> Option<&Path> { self.current.as_deref() }

    /// Re-reads the wallpaper path through `lookup` when the check interval
    /// has elapsed or `force` is set (settings-change notification).
    ///
    /// Returns the new path when it differs from the last one seen.
    pub fn poll<F>(&mut self, now: Instant, force: bool, lookup: F) -> Option<Option<PathBuf>>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        let due = self
            .last_check
            .is_none_or(|last| now.saturating_duration_since(last) >= WALLPAPER_CHECK_INTERVAL);
        if !force && !due {
            return None;
        }
        self.last_check = Some(now);

        let found = lookup();
        if found == self.current {
            return None;
        }

        tracing::debug!(path = ?found, "scatter: wallpaper changed");
        self.current.clone_from(&found);
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes(root: &Path) -> PathBuf { root.join("Microsoft").join("Windows").join("Themes") }

    #[test]
    fn test_fallback_prefers_transcoded_wallpaper() {
        let dir = tempfile::tempdir().unwrap();
        let themes = themes(dir.path());
        fs::create_dir_all(themes.join("CachedFiles")).unwrap();
        fs::write(themes.join("TranscodedWallpaper"), b"x").unwrap();
        fs::write(themes.join("CachedFiles").join("a.jpg"), b"x").unwrap();

        assert_eq!(fallback_wallpaper(dir.path()), Some(themes.join("TranscodedWallpaper")));
    }

    #[test]
    fn test_fallback_uses_first_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        let cached = themes(dir.path()).join("CachedFiles");
        fs::create_dir_all(&cached).unwrap();
        fs::write(cached.join("b.jpg"), b"x").unwrap();
        fs::write(cached.join("a.jpg"), b"x").unwrap();

        assert_eq!(fallback_wallpaper(dir.path()), Some(cached.join("a.jpg")));
    }

    #[test]
    fn test_fallback_without_theme_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(fallback_wallpaper(dir.path()), None);
    }

    #[test]
    fn test_watcher_reports_changes_only() {
        let start = Instant::now();
        let mut watcher = WallpaperWatcher::new(Some(PathBuf::from("a.jpg")));

        assert_eq!(watcher.poll(start, false, || Some(PathBuf::from("a.jpg"))), None);
        let later = start + WALLPAPER_CHECK_INTERVAL;
        assert_eq!(
            watcher.poll(later, false, || Some(PathBuf::from("b.jpg"))),
            Some(Some(PathBuf::from("b.jpg")))
        );
        assert_eq!(watcher.current(), Some(Path::new("b.jpg")));
    }

    #[test]
    fn test_watcher_respects_interval_unless_forced() {
        let start = Instant::now();
        let mut watcher = WallpaperWatcher::new(None);
        watcher.poll(start, false, || None);

        let soon = start + Duration::from_millis(500);
        assert_eq!(watcher.poll(soon, false, || Some(PathBuf::from("new.jpg"))), None);
        assert_eq!(
            watcher.poll(soon, true, || Some(PathBuf::from("new.jpg"))),
            Some(Some(PathBuf::from("new.jpg")))
        );
    }

    #[test]
    fn test_watcher_reports_removal() {
        let start = Instant::now();
        let mut watcher = WallpaperWatcher::new(Some(PathBuf::from("a.jpg")));
        assert_eq!(watcher.poll(start, true, || None), Some(None));
        assert_eq!(watcher.current(), None);
    }
}
