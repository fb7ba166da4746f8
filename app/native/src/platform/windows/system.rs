//! Top-level window queries and manipulation.

use std::ffi::c_void;

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Dwm::{DWMWA_CLOAKED, DwmGetWindowAttribute};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowRect, GetWindowTextLengthW, GetWindowTextW, HWND_NOTOPMOST,
    HWND_TOPMOST, IsIconic, IsWindow, IsWindowVisible, SW_RESTORE, SWP_NOACTIVATE, SWP_NOMOVE,
    SWP_NOSIZE, SetForegroundWindow, SetWindowPos, ShowWindow,
};

use super::{hwnd, os_error, window_handle};
use crate::platform::{PlatformError, ZOrder};
use crate::scatter::geometry::ScreenRect;
use crate::scatter::window::{SourceWindow, WindowHandle, WindowProbe, is_scatter_candidate};

struct EnumContext<'a> {
    excluded: &'a [String],
    found: Vec<SourceWindow>,
}

/// Lists scatter candidates in z-order, foreground first.
pub fn enumerate_windows(excluded: &[String]) -> Vec<SourceWindow> {
    let mut context = EnumContext { excluded, found: Vec::new() };

    let result = unsafe {
        EnumWindows(Some(collect_window), LPARAM(std::ptr::addr_of_mut!(context) as isize))
    };
    if let Err(err) = result {
        tracing::warn!(error = %err.message(), "scatter: window enumeration stopped early");
    }

    tracing::debug!(count = context.found.len(), "scatter: enumerated windows");
    context.found
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let context = unsafe { &mut *(lparam.0 as *mut EnumContext<'_>) };
    if let Some(window) = probe_window(hwnd, context.excluded) {
        context.found.push(window);
    }
    TRUE
}

fn probe_window(hwnd: HWND, excluded: &[String]) -> Option<SourceWindow> {
    let rect = read_rect(hwnd).ok()?;
    let title = window_title(hwnd);
    let probe = WindowProbe {
        title: &title,
        visible: unsafe { IsWindowVisible(hwnd) }.as_bool() && !is_cloaked(hwnd),
        minimized: unsafe { IsIconic(hwnd) }.as_bool(),
        rect,
    };

    if !is_scatter_candidate(&probe, excluded) {
        return None;
    }
    Some(SourceWindow::new(window_handle(hwnd), title, rect))
}

fn window_title(hwnd: HWND) -> String {
    let length = unsafe { GetWindowTextLengthW(hwnd) };
    let Ok(length) = usize::try_from(length) else {
        return String::new();
    };
    if length == 0 {
        return String::new();
    }

    let mut buffer = vec![0u16; length + 1];
    let copied = unsafe { GetWindowTextW(hwnd, &mut buffer) };
    let copied = usize::try_from(copied).unwrap_or(0).min(length);
    String::from_utf16_lossy(&buffer[..copied])
}

/// Windows hidden by the shell (suspended store apps, other virtual
/// desktops) report as visible but are cloaked.
#[allow(clippy::cast_possible_truncation)]
fn is_cloaked(hwnd: HWND) -> bool {
    let mut cloaked = 0u32;
    let result = unsafe {
        DwmGetWindowAttribute(
            hwnd,
            DWMWA_CLOAKED,
            std::ptr::addr_of_mut!(cloaked).cast::<c_void>(),
            size_of::<u32>() as u32,
        )
    };
    result.is_ok() && cloaked != 0
}

fn read_rect(hwnd: HWND) -> Result<ScreenRect, PlatformError> {
    let mut rect = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut rect) }.map_err(|err| os_error(&err))?;
    Ok(ScreenRect::new(rect.left, rect.top, rect.right, rect.bottom))
}

pub fn is_window(window: WindowHandle) -> bool { unsafe { IsWindow(hwnd(window)) }.as_bool() }

pub fn is_minimized(window: WindowHandle) -> bool { unsafe { IsIconic(hwnd(window)) }.as_bool() }

pub fn live_rect(window: WindowHandle) -> Result<ScreenRect, PlatformError> {
    if !is_window(window) {
        return Err(PlatformError::InvalidWindow(window));
    }
    read_rect(hwnd(window))
}

pub fn restore_and_focus(window: WindowHandle) -> Result<(), PlatformError> {
    if !is_window(window) {
        return Err(PlatformError::InvalidWindow(window));
    }

    let target = hwnd(window);
    unsafe {
        if IsIconic(target).as_bool() {
            let _ = ShowWindow(target, SW_RESTORE);
        }
        if !SetForegroundWindow(target).as_bool() {
            tracing::debug!(window = %window, "scatter: foreground request refused");
        }
    }
    Ok(())
}

pub fn set_z_order(window: WindowHandle, order: ZOrder) -> Result<(), PlatformError> {
    if !is_window(window) {
        return Err(PlatformError::InvalidWindow(window));
    }

    let insert_after = match order {
        ZOrder::Topmost => HWND_TOPMOST,
        ZOrder::NotTopmost => HWND_NOTOPMOST,
    };
    unsafe {
        SetWindowPos(
            hwnd(window),
            insert_after,
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
        )
    }
    .map_err(|err| os_error(&err))
}
