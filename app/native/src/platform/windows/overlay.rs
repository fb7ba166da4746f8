//! The overlay window.
//!
//! A borderless topmost popup covering the primary screen. Thumbnails are
//! composited on top of it by the DWM; the window itself only paints the
//! backdrop: the sharp wallpaper with the blurred copy alpha-blended over it.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbImage;
use windows::Win32::Foundation::{HANDLE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    AlphaBlend, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLACK_BRUSH, BLENDFUNCTION, BeginPaint,
    BitBlt, CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS, DeleteDC, DeleteObject,
    EndPaint, FillRect, GetStockObject, HBITMAP, HBRUSH, HDC, InvalidateRect, PAINTSTRUCT,
    SRCCOPY, SelectObject,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::SetFocus;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetSystemMetrics, HMENU, IDC_ARROW,
    LoadCursorW, RegisterClassW, SM_CXSCREEN, SM_CYSCREEN, SW_HIDE, SW_SHOW, SetForegroundWindow,
    ShowWindow, WM_APP, WM_CLOSE, WM_ERASEBKGND, WM_KEYDOWN, WM_LBUTTONUP, WM_PAINT,
    WM_SETTINGCHANGE, WNDCLASSW, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};
use windows::core::{PCWSTR, w};

use super::{os_error, window_handle};
use crate::backdrop::{Backdrop, to_bgra};
use crate::hotkey::vk;
use crate::platform::{HostSurface, PlatformError};
use crate::scatter::geometry::{Point, Size};
use crate::scatter::{EngineHandle, EngineMessage};

/// Posted to the overlay to make the message loop drain the engine queue.
pub const WM_APP_WAKE: u32 = WM_APP + 1;

const CLASS_NAME: PCWSTR = w!("WindowScatterOverlay");
const WINDOW_TITLE: PCWSTR = w!("Window Scatter");

static REGISTER_CLASS: Once = Once::new();

/// Set by the window procedure when the system broadcasts a settings change
/// (which includes wallpaper changes).
static SETTINGS_CHANGED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static ENGINE: RefCell<Option<EngineHandle>> = const { RefCell::new(None) };
    static BACKDROP: RefCell<Option<BackdropBitmaps>> = const { RefCell::new(None) };
    static BLUR_ALPHA: Cell<u8> = const { Cell::new(0) };
}

/// GDI copies of a prepared [`Backdrop`].
struct BackdropBitmaps {
    sharp: HBITMAP,
    blurred: HBITMAP,
    width: i32,
    height: i32,
}

impl BackdropBitmaps {
    fn create(backdrop: &Backdrop) -> Result<Self, PlatformError> {
        let sharp = create_bitmap(backdrop.sharp())?;
        let blurred = match create_bitmap(backdrop.blurred()) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                unsafe {
                    let _ = DeleteObject(sharp);
                }
                return Err(err);
            }
        };

        Ok(Self {
            sharp,
            blurred,
            width: dimension(backdrop.sharp().width())?,
            height: dimension(backdrop.sharp().height())?,
        })
    }

    fn draw(&self, hdc: HDC, alpha: u8) {
        unsafe {
            let memory = CreateCompatibleDC(hdc);
            if memory.is_invalid() {
                return;
            }

            let previous = SelectObject(memory, self.sharp);
            let _ = BitBlt(hdc, 0, 0, self.width, self.height, memory, 0, 0, SRCCOPY);

            if alpha > 0 {
                SelectObject(memory, self.blurred);
                let blend = BLENDFUNCTION {
                    BlendOp: 0, // AC_SRC_OVER
                    BlendFlags: 0,
                    SourceConstantAlpha: alpha,
                    AlphaFormat: 0,
                };
                let _ = AlphaBlend(
                    hdc,
                    0,
                    0,
                    self.width,
                    self.height,
                    memory,
                    0,
                    0,
                    self.width,
                    self.height,
                    blend,
                );
            }

            SelectObject(memory, previous);
            let _ = DeleteDC(memory);
        }
    }
}

impl Drop for BackdropBitmaps {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.sharp);
            let _ = DeleteObject(self.blurred);
        }
    }
}

fn dimension(value: u32) -> Result<i32, PlatformError> {
    i32::try_from(value).map_err(|_| PlatformError::Os(format!("bitmap too large: {value}")))
}

/// Creates a top-down 32-bit DIB section holding `image`.
#[allow(clippy::cast_possible_truncation)]
fn create_bitmap(image: &RgbImage) -> Result<HBITMAP, PlatformError> {
    let info = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: dimension(image.width())?,
            biHeight: -dimension(image.height())?,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut bits: *mut c_void = std::ptr::null_mut();
    let bitmap = unsafe {
        CreateDIBSection(HDC::default(), &info, DIB_RGB_COLORS, &mut bits, HANDLE::default(), 0)
    }
    .map_err(|err| os_error(&err))?;
    if bits.is_null() {
        unsafe {
            let _ = DeleteObject(bitmap);
        }
        return Err(PlatformError::Os("bitmap has no pixel storage".to_string()));
    }

    let pixels = to_bgra(image);
    unsafe { std::ptr::copy_nonoverlapping(pixels.as_ptr(), bits.cast::<u8>(), pixels.len()) };
    Ok(bitmap)
}

/// Size of the primary screen in pixels.
#[must_use]
pub fn primary_screen_size() -> Size {
    let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    Size::new(f64::from(width), f64::from(height))
}

/// Routes overlay input to the engine queue.
pub fn connect(engine: EngineHandle) { ENGINE.with(|slot| *slot.borrow_mut() = Some(engine)); }

/// Whether a settings change was broadcast since the last call.
pub fn take_settings_changed() -> bool { SETTINGS_CHANGED.swap(false, Ordering::Relaxed) }

/// The overlay window.
#[derive(Debug)]
pub struct OverlayWindow {
    hwnd: HWND,
    size: Size,
}

impl OverlayWindow {
    /// Registers the window class and creates the hidden overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created.
    #[allow(clippy::cast_possible_truncation)]
    pub fn create() -> Result<Self, PlatformError> {
        let instance = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(|err| os_error(&err))?;

        REGISTER_CLASS.call_once(|| unsafe {
            let class = WNDCLASSW {
                hInstance: instance.into(),
                lpszClassName: CLASS_NAME,
                lpfnWndProc: Some(overlay_proc),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                ..Default::default()
            };
            if RegisterClassW(&class) == 0 {
                tracing::error!("scatter: failed to register overlay window class");
            }
        });

        let size = primary_screen_size();
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOOLWINDOW | WS_EX_TOPMOST,
                CLASS_NAME,
                WINDOW_TITLE,
                WS_POPUP,
                0,
                0,
                size.width as i32,
                size.height as i32,
                HWND::default(),
                HMENU::default(),
                instance,
                None,
            )
        }
        .map_err(|_| PlatformError::NoHostSurface)?;

        tracing::debug!(
            width = size.width,
            height = size.height,
            "scatter: overlay window created"
        );
        Ok(Self { hwnd, size })
    }

    #[must_use]
    pub const fn hwnd(&self) -> HWND { self.hwnd }

    /// The overlay as a thumbnail destination.
    #[must_use]
    pub fn host(&self) -> HostSurface { HostSurface(window_handle(self.hwnd).0) }

    #[must_use]
    pub const fn size(&self) -> Size { self.size }

    pub fn show(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_SHOW);
            let _ = SetForegroundWindow(self.hwnd);
            let _ = SetFocus(self.hwnd);
        }
    }

    pub fn hide(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_HIDE);
        }
    }

    /// Sets the opacity of the blurred layer and repaints when it changed.
    pub fn set_blur_alpha(&self, alpha: u8) {
        if BLUR_ALPHA.replace(alpha) != alpha {
            self.invalidate();
        }
    }

    /// Replaces the painted backdrop.
    ///
    /// # Errors
    ///
    /// Returns an error if the bitmaps cannot be created; the previous
    /// backdrop stays in place.
    pub fn set_backdrop(&self, backdrop: &Backdrop) -> Result<(), PlatformError> {
        let bitmaps = BackdropBitmaps::create(backdrop)?;
        let previous = BACKDROP.with(|slot| slot.replace(Some(bitmaps)));
        drop(previous);
        self.invalidate();
        Ok(())
    }

    fn invalidate(&self) {
        unsafe {
            let _ = InvalidateRect(self.hwnd, None, false);
        }
    }
}

impl Drop for OverlayWindow {
    fn drop(&mut self) {
        BACKDROP.with(|slot| slot.borrow_mut().take());
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

fn send(msg: EngineMessage) {
    ENGINE.with(|slot| {
        let Ok(slot) = slot.try_borrow() else {
            return;
        };
        if let Some(engine) = slot.as_ref() {
            if let Err(err) = engine.send(msg) {
                tracing::warn!(error = %err, "scatter: overlay input dropped");
            }
        }
    });
}

fn paint(hwnd: HWND) {
    let mut paint = PAINTSTRUCT::default();
    let hdc = unsafe { BeginPaint(hwnd, &mut paint) };
    if !hdc.is_invalid() {
        let alpha = BLUR_ALPHA.get();
        let drawn = BACKDROP.with(|slot| {
            slot.try_borrow().ok().and_then(|bitmaps| bitmaps.as_ref().map(|b| b.draw(hdc, alpha)))
        });
        if drawn.is_none() {
            let rect: RECT = paint.rcPaint;
            unsafe {
                FillRect(hdc, &rect, HBRUSH(GetStockObject(BLACK_BRUSH).0));
            }
        }
    }
    unsafe {
        let _ = EndPaint(hwnd, &paint);
    }
}

/// Signed client coordinates packed into a mouse message.
#[allow(clippy::cast_possible_truncation)]
fn client_point(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xffff) as u16 as i16;
    let y = ((lparam.0 >> 16) & 0xffff) as u16 as i16;
    Point::new(f64::from(x), f64::from(y))
}

unsafe extern "system" fn overlay_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            paint(hwnd);
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            send(EngineMessage::Click(client_point(lparam)));
            LRESULT(0)
        }
        WM_KEYDOWN if wparam.0 == usize::from(vk::ESCAPE) => {
            send(EngineMessage::Cancel);
            LRESULT(0)
        }
        WM_CLOSE => {
            send(EngineMessage::Shutdown);
            LRESULT(0)
        }
        WM_SETTINGCHANGE => {
            SETTINGS_CHANGED.store(true, Ordering::Relaxed);
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}
