//! Win32 backend.
//!
//! - `system` - window enumeration, focus and stacking
//! - `dwm` - live thumbnails through the desktop window manager
//! - `overlay` - the full-screen overlay window and its backdrop
//! - `hook` - the low-level keyboard hook and synthetic key releases
//! - `desktop` - the [`Win32Platform`] bundle and the message loop
//!
//! Everything here runs on the thread that called [`run_desktop`]. The
//! keyboard hook and the overlay window procedure are invoked on that same
//! thread from inside the message loop, so their state lives in
//! thread-locals.

mod desktop;
mod dwm;
mod hook;
mod overlay;
mod system;

use std::ffi::c_void;

use windows::Win32::Foundation::HWND;

pub use desktop::{Win32Platform, run_desktop};

use crate::platform::{HostSurface, PlatformError};
use crate::scatter::window::WindowHandle;

/// Converts a window handle into the Win32 type.
const fn hwnd(window: WindowHandle) -> HWND { HWND(window.0 as *mut c_void) }

/// Converts the overlay surface into the Win32 type.
const fn host_hwnd(host: HostSurface) -> HWND { HWND(host.0 as *mut c_void) }

/// Converts a Win32 window into the platform-neutral handle.
fn window_handle(hwnd: HWND) -> WindowHandle { WindowHandle(hwnd.0 as isize) }

/// Wraps a Win32 error.
fn os_error(err: &windows::core::Error) -> PlatformError { PlatformError::Os(err.message()) }

/// Encodes a string as a nul-terminated UTF-16 buffer.
fn wide(value: &str) -> Vec<u16> { value.encode_utf16().chain(std::iter::once(0)).collect() }
