//! In-memory platform used by the unit tests.

use std::collections::{HashMap, HashSet};

use crate::platform::{
    Compositor, HostSurface, InputSynthesizer, Overlay, PlatformError, ThumbnailHandle,
    WindowSystem, ZOrder,
};
use crate::scatter::geometry::{Rect, ScreenRect, Size};
use crate::scatter::window::{SourceWindow, WindowHandle};

/// Records every collaborator call and lets tests inject failures.
#[derive(Debug)]
pub struct FakePlatform {
    pub windows: Vec<SourceWindow>,
    pub live_rects: HashMap<WindowHandle, ScreenRect>,
    pub host: Option<HostSurface>,
    pub canvas: Size,
    pub visible: bool,
    pub shows: usize,
    pub hides: usize,
    pub blur: Vec<f64>,
    pub notifications: Vec<String>,
    pub modifier_releases: usize,
    pub focused: Vec<WindowHandle>,
    pub z_orders: Vec<(WindowHandle, ZOrder)>,
    closed: HashSet<WindowHandle>,
    acquire_failures: HashSet<WindowHandle>,
    live: HashMap<isize, WindowHandle>,
    next_thumbnail: isize,
    acquires: usize,
    releases: usize,
    updates: usize,
    failing_updates: bool,
    acquired_while_live: bool,
}

impl FakePlatform {
    /// A desktop with one 800x600 window per id, staggered diagonally.
    pub fn with_windows(ids: &[isize]) -> Self {
        let windows = ids
            .iter()
            .zip(0i32..)
            .map(|(&id, offset)| {
                SourceWindow::new(
                    WindowHandle(id),
                    format!("Window {id}"),
                    ScreenRect::from_origin_size(offset * 90, offset * 60, 800, 600),
                )
            })
            .collect();

        Self {
            windows,
            live_rects: HashMap::new(),
            host: Some(HostSurface(0xbeef)),
            canvas: Size::new(1920.0, 1080.0),
            visible: false,
            shows: 0,
            hides: 0,
            blur: Vec::new(),
            notifications: Vec::new(),
            modifier_releases: 0,
            focused: Vec::new(),
            z_orders: Vec::new(),
            closed: HashSet::new(),
            acquire_failures: HashSet::new(),
            live: HashMap::new(),
            next_thumbnail: 1,
            acquires: 0,
            releases: 0,
            updates: 0,
            failing_updates: false,
            acquired_while_live: false,
        }
    }

    pub fn fail_acquire_for(&mut self, id: isize) { self.acquire_failures.insert(WindowHandle(id)); }

    pub fn close_window(&mut self, id: isize) {
        self.closed.insert(WindowHandle(id));
        self.windows.retain(|w| w.handle != WindowHandle(id));
    }

    pub const fn fail_updates(&mut self, fail: bool) { self.failing_updates = fail; }

    pub fn live_thumbnails(&self) -> usize { self.live.len() }

    pub const fn acquire_count(&self) -> usize { self.acquires }

    pub const fn release_count(&self) -> usize { self.releases }

    pub const fn update_count(&self) -> usize { self.updates }

    /// Whether a thumbnail was ever acquired for a window that still had one.
    pub const fn acquired_while_live(&self) -> bool { self.acquired_while_live }

    fn exists(&self, window: WindowHandle) -> bool {
        !self.closed.contains(&window)
            && (self.windows.iter().any(|w| w.handle == window)
                || self.live_rects.contains_key(&window))
    }
}

impl WindowSystem for FakePlatform {
    fn enumerate_visible_windows(&self, _excluded_titles: &[String]) -> Vec<SourceWindow> {
        self.windows.clone()
    }

    fn is_window(&self, window: WindowHandle) -> bool { self.exists(window) }

    fn is_minimized(&self, _window: WindowHandle) -> bool { false }

    fn live_rect(&self, window: WindowHandle) -> Result<ScreenRect, PlatformError> {
        if !self.exists(window) {
            return Err(PlatformError::InvalidWindow(window));
        }
        self.live_rects
            .get(&window)
            .copied()
            .or_else(|| self.windows.iter().find(|w| w.handle == window).map(|w| w.rect))
            .ok_or(PlatformError::InvalidWindow(window))
    }

    fn restore_and_focus(&mut self, window: WindowHandle) -> Result<(), PlatformError> {
        if !self.exists(window) {
            return Err(PlatformError::InvalidWindow(window));
        }
        self.focused.push(window);
        Ok(())
    }

    fn set_z_order(&mut self, window: WindowHandle, order: ZOrder) -> Result<(), PlatformError> {
        self.z_orders.push((window, order));
        Ok(())
    }
}

impl Compositor for FakePlatform {
    fn acquire_thumbnail(
        &mut self,
        _host: HostSurface,
        window: WindowHandle,
    ) -> Result<ThumbnailHandle, PlatformError> {
        if self.acquire_failures.contains(&window) || !self.exists(window) {
            return Err(PlatformError::ThumbnailRegistration {
                window,
                reason: "refused".to_string(),
            });
        }
        if self.live.values().any(|&w| w == window) {
            self.acquired_while_live = true;
        }
        let raw = self.next_thumbnail;
        self.next_thumbnail += 1;
        self.acquires += 1;
        self.live.insert(raw, window);
        Ok(ThumbnailHandle::from_raw(raw))
    }

    fn update_thumbnail_rect(
        &mut self,
        thumbnail: &ThumbnailHandle,
        _rect: Rect,
        _opacity: u8,
    ) -> Result<(), PlatformError> {
        if self.failing_updates || !self.live.contains_key(&thumbnail.raw()) {
            return Err(PlatformError::ThumbnailUpdate("rejected".to_string()));
        }
        self.updates += 1;
        Ok(())
    }

    fn release_thumbnail(&mut self, thumbnail: ThumbnailHandle) {
        assert!(self.live.remove(&thumbnail.raw()).is_some(), "double release");
        self.releases += 1;
    }
}

impl Overlay for FakePlatform {
    fn host_surface(&self) -> Option<HostSurface> { self.host }

    fn canvas_size(&self) -> Size { self.canvas }

    fn show(&mut self) {
        self.visible = true;
        self.shows += 1;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hides += 1;
    }

    fn set_backdrop_blur(&mut self, radius: f64) { self.blur.push(radius); }

    fn notify(&mut self, message: &str) { self.notifications.push(message.to_string()); }
}

impl InputSynthesizer for FakePlatform {
    fn release_modifier_keys(&mut self) { self.modifier_releases += 1; }
}
