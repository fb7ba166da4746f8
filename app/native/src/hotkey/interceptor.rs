//! Hotkey input state machine.
//!
//! Fed with every key event seen by the system-wide keyboard hook. It tracks
//! the four modifiers, recognizes the configured chord and decides per event
//! whether the event may continue to the rest of the system.
//!
//! Releasing the Windows key right after a `Win+<key>` chord would open the
//! Start menu. To prevent that, modifier key-ups are swallowed for
//! [`SUPPRESSION_WINDOW`] after the chord fired.
//!
//! The hook callback must return quickly: matching is a few comparisons under
//! an uncontended lock, and the trigger itself is only queued for the UI
//! context.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bitflags::bitflags;
use parking_lot::Mutex;

use super::{HotkeySpec, Modifiers, vk};
use crate::scatter::messages::{EngineHandle, TriggerSource};

/// How long modifier key-ups are swallowed after the chord fired.
pub const SUPPRESSION_WINDOW: Duration = Duration::from_millis(500);

/// Direction of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// One raw keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Virtual key code.
    pub key: u16,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    #[must_use]
    pub const fn down(key: u16) -> Self { Self { key, kind: KeyEventKind::Down } }

    #[must_use]
    pub const fn up(key: u16) -> Self { Self { key, kind: KeyEventKind::Up } }
}

/// What the hook should do with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Pass the event on to the next hook.
    Forward,
    /// Swallow the event.
    Consume,
}

bitflags! {
    /// Physical modifier keys currently down, one bit per virtual key.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct HeldKeys: u16 {
        const CONTROL = 1 << 0;
        const LCONTROL = 1 << 1;
        const RCONTROL = 1 << 2;
        const MENU = 1 << 3;
        const LMENU = 1 << 4;
        const RMENU = 1 << 5;
        const SHIFT = 1 << 6;
        const LSHIFT = 1 << 7;
        const RSHIFT = 1 << 8;
        const LWIN = 1 << 9;
        const RWIN = 1 << 10;

        const ANY_CONTROL = Self::CONTROL.bits() | Self::LCONTROL.bits() | Self::RCONTROL.bits();
        const ANY_MENU = Self::MENU.bits() | Self::LMENU.bits() | Self::RMENU.bits();
        const ANY_SHIFT = Self::SHIFT.bits() | Self::LSHIFT.bits() | Self::RSHIFT.bits();
        const ANY_WIN = Self::LWIN.bits() | Self::RWIN.bits();
    }
}

impl HeldKeys {
    /// The bit of a modifier virtual key.
    #[must_use]
    pub const fn from_virtual_key(key: u16) -> Option<Self> {
        match key {
            vk::CONTROL => Some(Self::CONTROL),
            vk::LCONTROL => Some(Self::LCONTROL),
            vk::RCONTROL => Some(Self::RCONTROL),
            vk::MENU => Some(Self::MENU),
            vk::LMENU => Some(Self::LMENU),
            vk::RMENU => Some(Self::RMENU),
            vk::SHIFT => Some(Self::SHIFT),
            vk::LSHIFT => Some(Self::LSHIFT),
            vk::RSHIFT => Some(Self::RSHIFT),
            vk::LWIN => Some(Self::LWIN),
            vk::RWIN => Some(Self::RWIN),
            _ => None,
        }
    }

    /// Every key that belongs to the same modifier as `self`.
    const fn family(self) -> Self {
        if self.intersects(Self::ANY_CONTROL) {
            Self::ANY_CONTROL
        } else if self.intersects(Self::ANY_MENU) {
            Self::ANY_MENU
        } else if self.intersects(Self::ANY_SHIFT) {
            Self::ANY_SHIFT
        } else {
            Self::ANY_WIN
        }
    }

    /// Modifier mask for the keys in the set.
    #[must_use]
    pub fn modifiers(self) -> Modifiers {
        [
            (Self::ANY_CONTROL, Modifiers::CTRL),
            (Self::ANY_MENU, Modifiers::ALT),
            (Self::ANY_SHIFT, Modifiers::SHIFT),
            (Self::ANY_WIN, Modifiers::WIN),
        ]
        .into_iter()
        .filter(|(keys, _)| self.intersects(*keys))
        .fold(Modifiers::empty(), |mask, (_, modifier)| mask | modifier)
    }
}

/// Held modifier keys plus Start-menu suppression bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierKeyState {
    keys: HeldKeys,
    suppression_started: Option<Instant>,
}

impl ModifierKeyState {
    /// Modifiers currently held down. A modifier stays held while either of
    /// its left or right keys is down.
    #[must_use]
    pub fn held(&self) -> Modifiers { self.keys.modifiers() }

    /// Physical modifier keys currently down.
    #[must_use]
    pub const fn keys(&self) -> HeldKeys { self.keys }

    /// Whether suppression was activated and has not been cleared yet.
    #[must_use]
    pub const fn is_suppression_active(&self) -> bool { self.suppression_started.is_some() }

    /// Whether suppression is active and still within its window at `now`.
    #[must_use]
    pub fn suppresses_at(&self, now: Instant) -> bool {
        self.suppression_started
            .is_some_and(|started| now.saturating_duration_since(started) < SUPPRESSION_WINDOW)
    }

    fn press(&mut self, key: HeldKeys) { self.keys.insert(key); }

    /// A generic code (`VK_SHIFT`) releases the whole family; a sided code
    /// also drops the generic bit, since hooks may report either.
    fn release(&mut self, key: HeldKeys) {
        let generic = key.family() & (HeldKeys::CONTROL | HeldKeys::MENU | HeldKeys::SHIFT);
        if key.intersects(generic) {
            self.keys.remove(key.family());
        } else {
            self.keys.remove(key | generic);
        }
    }

    fn start_suppression(&mut self, now: Instant) { self.suppression_started = Some(now); }

    fn end_suppression(&mut self) { self.suppression_started = None; }

    /// Forgets every held modifier and ends suppression.
    pub fn clear(&mut self) { *self = Self::default(); }
}

/// Modifier state shared between the hook and the code that synthesizes
/// modifier releases.
pub type SharedModifierState = Arc<Mutex<ModifierKeyState>>;

/// Matches key events against the configured chord.
#[derive(Debug, Clone)]
pub struct HotkeyInterceptor {
    spec: HotkeySpec,
    state: SharedModifierState,
    engine: EngineHandle,
}

impl HotkeyInterceptor {
    /// Creates an interceptor that queues triggers on `engine`.
    #[must_use]
    pub fn new(spec: HotkeySpec, engine: EngineHandle) -> Self {
        Self {
            spec,
            state: SharedModifierState::default(),
            engine,
        }
    }

    /// The chord being matched.
    #[must_use]
    pub const fn spec(&self) -> HotkeySpec { self.spec }

    /// Snapshot of the modifier state.
    #[must_use]
    pub fn state(&self) -> ModifierKeyState { *self.state.lock() }

    /// Shared handle to the modifier state.
    #[must_use]
    pub fn shared_state(&self) -> SharedModifierState { Arc::clone(&self.state) }

    /// Processes one event.
    ///
    /// A chord key-down is consumed and queues one trigger. Repeats of the
    /// chord while suppression is still running are consumed without queuing
    /// again, so the first match wins. Modifier key-ups inside the
    /// suppression window are consumed; the first one after it ends
    /// suppression and is forwarded.
    pub fn handle(&self, event: KeyEvent, now: Instant) -> KeyDisposition {
        let modifier = HeldKeys::from_virtual_key(event.key);
        let mut state = self.state.lock();

        match (event.kind, modifier) {
            (KeyEventKind::Down, Some(modifier)) => {
                state.press(modifier);
                KeyDisposition::Forward
            }
            (KeyEventKind::Down, None) => {
                if !self.spec.matches(event.key, state.held()) {
                    return KeyDisposition::Forward;
                }
                if state.suppresses_at(now) {
                    return KeyDisposition::Consume;
                }

                state.start_suppression(now);
                drop(state);

                if let Err(err) = self.engine.trigger(TriggerSource::Hotkey) {
                    tracing::warn!(error = %err, "scatter: failed to queue hotkey trigger");
                }
                KeyDisposition::Consume
            }
            (KeyEventKind::Up, Some(modifier)) => {
                state.release(modifier);
                if state.suppresses_at(now) {
                    KeyDisposition::Consume
                } else {
                    state.end_suppression();
                    KeyDisposition::Forward
                }
            }
            (KeyEventKind::Up, None) => KeyDisposition::Forward,
        }
    }

    /// Clears held modifiers and suppression so synthetic key-ups pass.
    pub fn release_all(&self) { self.state.lock().clear(); }
}
