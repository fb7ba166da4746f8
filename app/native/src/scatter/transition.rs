//! Transition guard: the single authority over scatter phase changes.
//!
//! The phase lives behind one `parking_lot` mutex so it can be read from the
//! input-interception context while the UI context drives it. A transition
//! starts with [`TransitionGuard::begin`], which hands out a
//! [`TransitionTicket`]; only the holder of the ticket can finish, settle or
//! abort that transition, and the ticket is consumed when it does.
//!
//! ```text
//! Idle ──begin(Scatter)──▶ Scattering ──finish_scatter──▶ Scattered(animating)
//!                                                            │ settle
//!                                                            ▼
//! Idle ◀──complete── SwitchingFocus ◀──begin(Switch)── Scattered(settled)
//! Idle ◀──complete── CancelingBack  ◀──begin(Cancel)──┘
//! ```

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::Mutex;
use thiserror::Error;

bitflags! {
    /// Flag view of a phase.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransitionFlags: u8 {
        /// Windows are being enumerated and registered.
        const SCATTER_IN_PROGRESS = 1;
        /// Thumbnails are animating back to the real windows.
        const ANIMATING_BACK = 1 << 1;
        /// A switch or cancel owns the window system.
        const TRANSITION_IN_PROGRESS = 1 << 2;
    }
}

/// Where the engine is in a scatter cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScatterPhase {
    /// Overlay hidden, no thumbnails.
    #[default]
    Idle,
    /// Computing layouts and registering thumbnails.
    Scattering,
    /// Overlay visible; `settled` once the forward animation has finished.
    Scattered { settled: bool },
    /// A window was picked; animating back before hiding.
    SwitchingFocus,
    /// Escape was pressed; animating back before hiding.
    CancelingBack,
}

impl ScatterPhase {
    /// Flags set while in this phase.
    #[must_use]
    pub const fn flags(self) -> TransitionFlags {
        match self {
            Self::Idle | Self::Scattered { .. } => TransitionFlags::empty(),
            Self::Scattering => TransitionFlags::SCATTER_IN_PROGRESS,
            Self::SwitchingFocus => TransitionFlags::TRANSITION_IN_PROGRESS,
            Self::CancelingBack => {
                TransitionFlags::ANIMATING_BACK.union(TransitionFlags::TRANSITION_IN_PROGRESS)
            }
        }
    }
}

impl fmt::Display for ScatterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Scattering => write!(f, "scattering"),
            Self::Scattered { settled: true } => write!(f, "scattered"),
            Self::Scattered { settled: false } => write!(f, "scattered (animating)"),
            Self::SwitchingFocus => write!(f, "switching focus"),
            Self::CancelingBack => write!(f, "canceling"),
        }
    }
}

/// Transition requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Show the overlay.
    Scatter,
    /// Pick a window and animate back.
    Switch,
    /// Animate back without picking.
    Cancel,
}

/// A transition was refused because another one owns the engine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot start {requested:?} while {phase}")]
pub struct TransitionRejected {
    pub requested: TransitionKind,
    pub phase: ScatterPhase,
}

/// Proof of ownership of an in-flight transition.
///
/// Not `Clone`: exactly one code path can end a transition.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a transition must be finished, completed or aborted"]
pub struct TransitionTicket {
    kind: TransitionKind,
    generation: u64,
}

impl TransitionTicket {
    /// Kind of transition this ticket owns.
    pub const fn kind(&self) -> TransitionKind { self.kind }
}

#[derive(Debug, Default)]
struct GuardState {
    phase: ScatterPhase,
    generation: u64,
}

/// Shared, lock-protected scatter phase.
#[derive(Debug, Clone, Default)]
pub struct TransitionGuard {
    state: Arc<Mutex<GuardState>>,
}

impl TransitionGuard {
    /// Creates a guard in the idle phase.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ScatterPhase { self.state.lock().phase }

    /// Current flags.
    #[must_use]
    pub fn flags(&self) -> TransitionFlags { self.phase().flags() }

    /// Whether any transition flag is set.
    #[must_use]
    pub fn is_busy(&self) -> bool { !self.flags().is_empty() }

    /// Whether the overlay is hidden and nothing is happening.
    #[must_use]
    pub fn is_idle(&self) -> bool { self.phase() == ScatterPhase::Idle }

    /// Atomically checks the preconditions of `kind` and enters its phase.
    ///
    /// - `Scatter` needs `Idle`.
    /// - `Switch` and `Cancel` need a settled `Scattered` phase.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionRejected`] if the current phase does not allow it.
    pub fn begin(&self, kind: TransitionKind) -> Result<TransitionTicket, TransitionRejected> {
        let mut state = self.state.lock();
        let next = match (kind, state.phase) {
            (TransitionKind::Scatter, ScatterPhase::Idle) => ScatterPhase::Scattering,
            (TransitionKind::Switch, ScatterPhase::Scattered { settled: true }) => {
                ScatterPhase::SwitchingFocus
            }
            (TransitionKind::Cancel, ScatterPhase::Scattered { settled: true }) => {
                ScatterPhase::CancelingBack
            }
            (requested, phase) => return Err(TransitionRejected { requested, phase }),
        };

        state.phase = next;
        state.generation += 1;
        Ok(TransitionTicket { kind, generation: state.generation })
    }

    /// Scattering finished: the overlay is shown and animating.
    ///
    /// Returns `false` if the ticket is stale.
    pub fn finish_scatter(&self, ticket: TransitionTicket) -> bool {
        self.transition(&ticket, TransitionKind::Scatter, ScatterPhase::Scattered { settled: false })
    }

    /// The forward animation reached its target.
    pub fn settle(&self) {
        let mut state = self.state.lock();
        if state.phase == (ScatterPhase::Scattered { settled: false }) {
            state.phase = ScatterPhase::Scattered { settled: true };
        }
    }

    /// A switch or cancel finished its cleanup.
    ///
    /// Returns `false` if the ticket is stale or not a switch/cancel ticket.
    pub fn complete(&self, ticket: TransitionTicket) -> bool {
        let kind = ticket.kind;
        kind != TransitionKind::Scatter && self.transition(&ticket, kind, ScatterPhase::Idle)
    }

    /// A switch was requested for a window that is not scattered: go back to
    /// the settled overlay without touching anything.
    pub fn revert(&self, ticket: TransitionTicket) -> bool {
        self.transition(&ticket, TransitionKind::Switch, ScatterPhase::Scattered { settled: true })
    }

    /// The transition failed; return to idle.
    pub fn abort(&self, ticket: TransitionTicket) -> bool {
        let kind = ticket.kind;
        self.transition(&ticket, kind, ScatterPhase::Idle)
    }

    fn transition(&self, ticket: &TransitionTicket, expected: TransitionKind, next: ScatterPhase) -> bool {
        let mut state = self.state.lock();
        if ticket.generation != state.generation || ticket.kind != expected {
            tracing::warn!(
                kind = ?ticket.kind,
                phase = %state.phase,
                "scatter: stale transition ticket ignored"
            );
            return false;
        }
        state.phase = next;
        true
    }
}
