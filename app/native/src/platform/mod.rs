//! Platform abstractions for the scatter engine.
//!
//! The engine never talks to the operating system directly. Everything it
//! needs is expressed by the traits in this module:
//!
//! - [`WindowSystem`] - enumerate, inspect, focus and reorder real windows
//! - [`Compositor`] - live thumbnail resources mirroring another window
//! - [`Overlay`] - the full-screen surface that hosts the thumbnails
//! - [`InputSynthesizer`] - synthetic key releases after the overlay shows
//!
//! [`Platform`] is implemented for any type providing all four.
//!
//! The Win32 backend lives in [`windows`] and is only compiled on Windows.

#[cfg(windows)]
pub mod windows;

use thiserror::Error;

use crate::scatter::geometry::{Rect, ScreenRect, Size};
use crate::scatter::window::{SourceWindow, WindowHandle};

/// Errors reported by platform collaborators.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The window handle no longer refers to a live window.
    #[error("window {0} no longer exists")]
    InvalidWindow(WindowHandle),

    /// The overlay's own surface could not be established.
    #[error("overlay surface is not available")]
    NoHostSurface,

    /// The compositor refused to create a thumbnail.
    #[error("failed to register thumbnail for window {window}: {reason}")]
    ThumbnailRegistration { window: WindowHandle, reason: String },

    /// The compositor refused to update a thumbnail.
    #[error("failed to update thumbnail: {0}")]
    ThumbnailUpdate(String),

    /// Any other operating system failure.
    #[error("{0}")]
    Os(String),

    /// The desktop overlay is not available on this platform.
    #[error("the desktop overlay is only supported on Windows")]
    Unsupported,
}

/// Handle of the overlay surface thumbnails are drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostSurface(pub isize);

/// A live compositor thumbnail.
///
/// Deliberately neither `Clone` nor `Copy`: the handle is owned by exactly one
/// thumbnail record and releasing it consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ThumbnailHandle(isize);

impl ThumbnailHandle {
    /// Wraps a raw compositor handle.
    #[must_use]
    pub const fn from_raw(raw: isize) -> Self { Self(raw) }

    /// The raw compositor handle.
    #[must_use]
    pub const fn raw(&self) -> isize { self.0 }
}

/// Window-system stacking requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// Above every non-topmost window.
    Topmost,
    /// Back into the regular stacking band.
    NotTopmost,
}

/// Access to the real top-level windows.
pub trait WindowSystem {
    /// Lists scatter candidates in z-order, foreground first.
    ///
    /// Windows whose attributes cannot be read are skipped silently.
    fn enumerate_visible_windows(&self, excluded_titles: &[String]) -> Vec<SourceWindow>;

    /// Whether the handle still refers to a live window.
    fn is_window(&self, window: WindowHandle) -> bool;

    /// Whether the window is currently minimized.
    fn is_minimized(&self, window: WindowHandle) -> bool;

    /// Current on-screen rectangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is gone or its rectangle cannot be read.
    fn live_rect(&self, window: WindowHandle) -> Result<ScreenRect, PlatformError>;

    /// Restores the window if minimized and brings it to the foreground.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is gone.
    fn restore_and_focus(&mut self, window: WindowHandle) -> Result<(), PlatformError>;

    /// Changes the window's stacking band without activating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is gone.
    fn set_z_order(&mut self, window: WindowHandle, order: ZOrder) -> Result<(), PlatformError>;
}

/// Live thumbnail resources.
pub trait Compositor {
    /// Creates a thumbnail of `window` drawn into `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the compositor refuses the registration.
    fn acquire_thumbnail(
        &mut self,
        host: HostSurface,
        window: WindowHandle,
    ) -> Result<ThumbnailHandle, PlatformError>;

    /// Moves and resizes a thumbnail on the host surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the compositor rejects the update.
    fn update_thumbnail_rect(
        &mut self,
        thumbnail: &ThumbnailHandle,
        rect: Rect,
        opacity: u8,
    ) -> Result<(), PlatformError>;

    /// Releases a thumbnail. Failures are not reported: the handle is gone
    /// either way.
    fn release_thumbnail(&mut self, thumbnail: ThumbnailHandle);
}

/// The overlay surface.
pub trait Overlay {
    /// The surface thumbnails are registered against, if it exists.
    fn host_surface(&self) -> Option<HostSurface>;

    /// Size of the drawable canvas.
    fn canvas_size(&self) -> Size;

    /// Makes the overlay visible and focused.
    fn show(&mut self);

    /// Hides the overlay.
    fn hide(&mut self);

    /// Sets the backdrop blur radius in pixels.
    fn set_backdrop_blur(&mut self, radius: f64);

    /// Shows an informational message to the user.
    fn notify(&mut self, message: &str);
}

/// Synthetic keyboard input.
pub trait InputSynthesizer {
    /// Clears tracked modifier state and sends key-up events for every
    /// modifier key.
    fn release_modifier_keys(&mut self);
}

/// Everything the scatter engine needs from the host system.
pub trait Platform: WindowSystem + Compositor + Overlay + InputSynthesizer {}

impl<T> Platform for T where T: WindowSystem + Compositor + Overlay + InputSynthesizer {}
