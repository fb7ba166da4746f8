//! Low-level keyboard hook and synthetic key releases.
//!
//! The hook procedure hands every key event to the [`HotkeyInterceptor`] and
//! swallows it when told to. A consumed chord also posts [`WM_APP_WAKE`] to
//! the overlay so the message loop drains the engine queue promptly.

use std::cell::{Cell, RefCell};
use std::time::Instant;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP, SendInput,
    VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, HHOOK, KBDLLHOOKSTRUCT, PostMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
};
use windows::core::PCWSTR;

use super::os_error;
use super::overlay::WM_APP_WAKE;
use crate::hotkey::interceptor::{HotkeyInterceptor, KeyDisposition, KeyEvent, SharedModifierState};
use crate::hotkey::vk;
use crate::platform::PlatformError;

/// Unassigned virtual key pressed before the Windows key is released, so the
/// shell does not treat the release as a lone Win tap.
const MASK_KEY: u16 = 0xE8;

/// Modifier keys released after the overlay shows.
const MODIFIER_KEYS: [u16; 5] = [vk::LWIN, vk::RWIN, vk::CONTROL, vk::MENU, vk::SHIFT];

thread_local! {
    static INTERCEPTOR: RefCell<Option<HotkeyInterceptor>> = const { RefCell::new(None) };
    static WAKE_TARGET: Cell<HWND> = Cell::new(HWND::default());
}

/// An installed `WH_KEYBOARD_LL` hook. Uninstalled on drop.
#[derive(Debug)]
pub struct KeyboardHook {
    hook: HHOOK,
}

impl KeyboardHook {
    /// Installs the hook on the calling thread.
    ///
    /// The calling thread must pump messages for the hook to be invoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the hook cannot be installed.
    pub fn install(interceptor: HotkeyInterceptor, wake: HWND) -> Result<Self, PlatformError> {
        INTERCEPTOR.with(|slot| *slot.borrow_mut() = Some(interceptor));
        WAKE_TARGET.set(wake);

        let installed = unsafe {
            GetModuleHandleW(PCWSTR::null()).and_then(|module| {
                SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), module, 0)
            })
        };

        match installed {
            Ok(hook) => {
                tracing::info!("scatter: keyboard hook installed");
                Ok(Self { hook })
            }
            Err(err) => {
                INTERCEPTOR.with(|slot| slot.borrow_mut().take());
                Err(os_error(&err))
            }
        }
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        if let Err(err) = unsafe { UnhookWindowsHookEx(self.hook) } {
            tracing::debug!(error = %err.message(), "scatter: failed to remove keyboard hook");
        }
        INTERCEPTOR.with(|slot| slot.borrow_mut().take());
        WAKE_TARGET.set(HWND::default());
    }
}

fn classify(msg: u32, key: u16) -> Option<KeyEvent> {
    match msg {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyEvent::down(key)),
        WM_KEYUP | WM_SYSKEYUP => Some(KeyEvent::up(key)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        let event = classify(wparam.0 as u32, info.vkCode as u16);

        let disposition = event.and_then(|event| {
            INTERCEPTOR.with(|slot| {
                slot.try_borrow()
                    .ok()
                    .and_then(|interceptor| {
                        interceptor.as_ref().map(|i| i.handle(event, Instant::now()))
                    })
            })
        });

        if disposition == Some(KeyDisposition::Consume) {
            let wake = WAKE_TARGET.get();
            if !wake.is_invalid() {
                let _ = unsafe { PostMessageW(wake, WM_APP_WAKE, WPARAM(0), LPARAM(0)) };
            }
            return LRESULT(1);
        }
    }

    unsafe { CallNextHookEx(HHOOK::default(), code, wparam, lparam) }
}

fn key_input(key: u16, up: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(key),
                wScan: 0,
                dwFlags: if up { KEYEVENTF_KEYUP } else { KEYBD_EVENT_FLAGS(0) },
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Forgets tracked modifiers and injects key-ups for every modifier key.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn release_modifier_keys(state: &SharedModifierState) {
    state.lock().clear();

    let mut inputs = vec![key_input(MASK_KEY, false), key_input(MASK_KEY, true)];
    inputs.extend(MODIFIER_KEYS.iter().map(|&key| key_input(key, true)));

    let sent = unsafe { SendInput(&inputs, size_of::<INPUT>() as i32) };
    if (sent as usize) < inputs.len() {
        tracing::warn!(
            sent,
            expected = inputs.len(),
            "scatter: not all modifier releases were sent"
        );
    } else {
        tracing::debug!("scatter: modifier keys released");
    }
}
