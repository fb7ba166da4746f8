//! DWM thumbnails.

use windows::Win32::Foundation::{FALSE, RECT, TRUE};
use windows::Win32::Graphics::Dwm::{
    DWM_THUMBNAIL_PROPERTIES, DWM_TNP_OPACITY, DWM_TNP_RECTDESTINATION,
    DWM_TNP_SOURCECLIENTAREAONLY, DWM_TNP_VISIBLE, DwmRegisterThumbnail,
    DwmUnregisterThumbnail, DwmUpdateThumbnailProperties,
};

use super::{host_hwnd, hwnd};
use crate::platform::{HostSurface, PlatformError, ThumbnailHandle};
use crate::scatter::geometry::Rect;
use crate::scatter::window::WindowHandle;

pub fn register(host: HostSurface, window: WindowHandle) -> Result<ThumbnailHandle, PlatformError> {
    let raw = unsafe { DwmRegisterThumbnail(host_hwnd(host), hwnd(window)) }.map_err(|err| {
        PlatformError::ThumbnailRegistration { window, reason: err.message() }
    })?;
    Ok(ThumbnailHandle::from_raw(raw))
}

#[allow(clippy::cast_possible_truncation)]
pub fn update(thumbnail: &ThumbnailHandle, rect: Rect, opacity: u8) -> Result<(), PlatformError> {
    let rect = rect.round();
    let properties = DWM_THUMBNAIL_PROPERTIES {
        dwFlags: DWM_TNP_RECTDESTINATION
            | DWM_TNP_OPACITY
            | DWM_TNP_VISIBLE
            | DWM_TNP_SOURCECLIENTAREAONLY,
        rcDestination: RECT {
            left: rect.x as i32,
            top: rect.y as i32,
            right: rect.right() as i32,
            bottom: rect.bottom() as i32,
        },
        opacity,
        fVisible: TRUE,
        fSourceClientAreaOnly: FALSE,
        ..Default::default()
    };

    unsafe { DwmUpdateThumbnailProperties(thumbnail.raw(), &properties) }
        .map_err(|err| PlatformError::ThumbnailUpdate(err.message()))
}

pub fn unregister(thumbnail: ThumbnailHandle) {
    if let Err(err) = unsafe { DwmUnregisterThumbnail(thumbnail.raw()) } {
        tracing::debug!(error = %err.message(), "scatter: failed to unregister thumbnail");
    }
}
