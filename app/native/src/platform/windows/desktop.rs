//! The Win32 platform bundle and the desktop message loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetCursorPos, GetMessageW, KillTimer, MB_ICONINFORMATION, MB_OK, MSG,
    MessageBoxW, SetTimer, TranslateMessage,
};
use windows::core::{PCWSTR, w};

use super::overlay::{self, OverlayWindow};
use super::{dwm, hook, system, wide};
use crate::backdrop::{Backdrop, ScreenSize, WallpaperWatcher, blend_alpha, wallpaper_path};
use crate::config::ScatterConfig;
use crate::error::ScatterError;
use crate::hot_corner;
use crate::hotkey::HotkeyInterceptor;
use crate::hotkey::interceptor::SharedModifierState;
use crate::platform::{
    Compositor, HostSurface, InputSynthesizer, Overlay, PlatformError, ThumbnailHandle,
    WindowSystem, ZOrder,
};
use crate::scatter::geometry::{Point, Rect, ScreenRect, Size};
use crate::scatter::window::{SourceWindow, WindowHandle};
use crate::scatter::{EngineSettings, ScatterEngine, ScatterPhase};

/// Frame timer while something is animating.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Timer while idle; drives wallpaper checks.
const IDLE_INTERVAL: Duration = Duration::from_millis(50);

const TIMER_ID: usize = 1;

// ============================================================================
// Platform bundle
// ============================================================================

/// Everything the engine needs, backed by Win32 and the DWM.
#[derive(Debug)]
pub struct Win32Platform {
    overlay: OverlayWindow,
    modifiers: Option<SharedModifierState>,
    max_blur: u32,
    notices: Vec<String>,
}

impl Win32Platform {
    #[must_use]
    pub const fn new(overlay: OverlayWindow, max_blur: u32) -> Self {
        Self { overlay, modifiers: None, max_blur, notices: Vec::new() }
    }

    /// Shares the hook's modifier state so releases also clear it.
    pub fn attach_modifier_state(&mut self, state: SharedModifierState) {
        self.modifiers = Some(state);
    }

    #[must_use]
    pub const fn overlay_hwnd(&self) -> HWND { self.overlay.hwnd() }

    /// Messages queued by [`Overlay::notify`] since the last call.
    pub fn take_notices(&mut self) -> Vec<String> { std::mem::take(&mut self.notices) }

    /// Replaces the painted backdrop.
    ///
    /// # Errors
    ///
    /// Returns an error if the backdrop bitmaps cannot be created.
    pub fn set_backdrop(&mut self, backdrop: &Backdrop) -> Result<(), PlatformError> {
        self.max_blur = backdrop.max_blur();
        self.overlay.set_backdrop(backdrop)
    }
}

impl WindowSystem for Win32Platform {
    fn enumerate_visible_windows(&self, excluded_titles: &[String]) -> Vec<SourceWindow> {
        system::enumerate_windows(excluded_titles)
    }

    fn is_window(&self, window: WindowHandle) -> bool { system::is_window(window) }

    fn is_minimized(&self, window: WindowHandle) -> bool { system::is_minimized(window) }

    fn live_rect(&self, window: WindowHandle) -> Result<ScreenRect, PlatformError> {
        system::live_rect(window)
    }

    fn restore_and_focus(&mut self, window: WindowHandle) -> Result<(), PlatformError> {
        system::restore_and_focus(window)
    }

    fn set_z_order(&mut self, window: WindowHandle, order: ZOrder) -> Result<(), PlatformError> {
        system::set_z_order(window, order)
    }
}

impl Compositor for Win32Platform {
    fn acquire_thumbnail(
        &mut self,
        host: HostSurface,
        window: WindowHandle,
    ) -> Result<ThumbnailHandle, PlatformError> {
        dwm::register(host, window)
    }

    fn update_thumbnail_rect(
        &mut self,
        thumbnail: &ThumbnailHandle,
        rect: Rect,
        opacity: u8,
    ) -> Result<(), PlatformError> {
        dwm::update(thumbnail, rect, opacity)
    }

    fn release_thumbnail(&mut self, thumbnail: ThumbnailHandle) { dwm::unregister(thumbnail); }
}

impl Overlay for Win32Platform {
    fn host_surface(&self) -> Option<HostSurface> { Some(self.overlay.host()) }

    fn canvas_size(&self) -> Size { self.overlay.size() }

    fn show(&mut self) { self.overlay.show(); }

    fn hide(&mut self) { self.overlay.hide(); }

    fn set_backdrop_blur(&mut self, radius: f64) {
        self.overlay.set_blur_alpha(blend_alpha(radius, self.max_blur));
    }

    fn notify(&mut self, message: &str) {
        tracing::warn!(message, "scatter: notice");
        self.notices.push(message.to_string());
    }
}

impl InputSynthesizer for Win32Platform {
    fn release_modifier_keys(&mut self) {
        match &self.modifiers {
            Some(state) => hook::release_modifier_keys(state),
            None => hook::release_modifier_keys(&SharedModifierState::default()),
        }
    }
}

// ============================================================================
// Message loop
// ============================================================================

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn screen_size(size: Size) -> ScreenSize {
    ScreenSize::new(size.width.max(0.0) as u32, size.height.max(0.0) as u32)
}

fn sample_cursor() -> Option<(Point, Size)> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point) }.ok()?;
    Some((Point::new(f64::from(point.x), f64::from(point.y)), overlay::primary_screen_size()))
}

fn show_notice(message: &str) {
    let text = wide(message);
    unsafe {
        MessageBoxW(
            HWND::default(),
            PCWSTR(text.as_ptr()),
            w!("Window Scatter"),
            MB_OK | MB_ICONINFORMATION,
        );
    }
}

#[allow(clippy::cast_possible_truncation)]
fn arm_timer(hwnd: HWND, interval: Duration) {
    unsafe {
        let _ = SetTimer(hwnd, TIMER_ID, interval.as_millis() as u32, None);
    }
}

/// Creates the overlay, installs the hook and runs the message loop until the
/// overlay is closed.
///
/// # Errors
///
/// Returns an error if the overlay window or the keyboard hook cannot be
/// created.
pub fn run_desktop(config: &ScatterConfig) -> Result<(), ScatterError> {
    let window = OverlayWindow::create()?;
    let screen = screen_size(window.size());

    let mut watcher = WallpaperWatcher::new(wallpaper_path());
    let backdrop = Backdrop::prepare(watcher.current(), screen, config.backdrop.blur);

    let mut platform = Win32Platform::new(window, backdrop.max_blur());
    if let Err(err) = platform.set_backdrop(&backdrop) {
        tracing::warn!(error = %err, "scatter: failed to paint backdrop");
    }

    let mut engine = ScatterEngine::new(platform, EngineSettings::from(config));
    let interceptor = HotkeyInterceptor::new(config.hotkey_spec(), engine.handle());
    engine.platform_mut().attach_modifier_state(interceptor.shared_state());
    overlay::connect(engine.handle());

    let hwnd = engine.platform().overlay_hwnd();
    let keyboard = hook::KeyboardHook::install(interceptor, hwnd)?;

    let stop = Arc::new(AtomicBool::new(false));
    let poller = hot_corner::spawn_poller(
        config.hot_corner.clone(),
        engine.handle(),
        Arc::clone(&stop),
        sample_cursor,
    );

    tracing::info!("scatter: ready");
    let result = message_loop(&mut engine, &mut watcher, screen, config.backdrop.blur);

    stop.store(true, Ordering::Relaxed);
    if let Some(poller) = poller {
        let _ = poller.join();
    }
    drop(keyboard);
    engine.shutdown();
    tracing::info!("scatter: stopped");
    result
}

fn message_loop(
    engine: &mut ScatterEngine<Win32Platform>,
    watcher: &mut WallpaperWatcher,
    screen: ScreenSize,
    max_blur: u32,
) -> Result<(), ScatterError> {
    let hwnd = engine.platform().overlay_hwnd();
    let mut interval = IDLE_INTERVAL;
    arm_timer(hwnd, interval);

    let mut msg = MSG::default();
    loop {
        let status = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        if status.0 == 0 {
            break;
        }
        if status.0 == -1 {
            unsafe {
                let _ = KillTimer(hwnd, TIMER_ID);
            }
            return Err(PlatformError::Os("message loop failed".to_string()).into());
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        let now = Instant::now();
        if !engine.drain(now) {
            tracing::info!("scatter: shutdown requested");
            break;
        }
        let animating = engine.tick(now);

        for notice in engine.platform_mut().take_notices() {
            show_notice(&notice);
        }

        let wanted = if animating { FRAME_INTERVAL } else { IDLE_INTERVAL };
        if wanted != interval {
            interval = wanted;
            arm_timer(hwnd, interval);
        }

        if engine.phase() == ScatterPhase::Idle {
            let changed = watcher.poll(now, overlay::take_settings_changed(), wallpaper_path);
            if let Some(path) = changed {
                let backdrop = Backdrop::prepare(path.as_deref(), screen, max_blur);
                if let Err(err) = engine.platform_mut().set_backdrop(&backdrop) {
                    tracing::warn!(error = %err, "scatter: failed to refresh backdrop");
                }
            }
        }
    }

    unsafe {
        let _ = KillTimer(hwnd, TIMER_ID);
    }
    Ok(())
}
