//! Scatter orchestration engine.
//!
//! Everything between "the chord was pressed" and "the picked window is in
//! front": layout computation, thumbnail lifecycle, the transition guard and
//! the animation clock. Nothing in here talks to the OS directly; all window
//! system calls go through the traits in [`crate::platform`].

pub mod animation;
pub mod cache;
pub mod engine;
pub mod geometry;
pub mod layout;
pub mod messages;
pub mod thumbnail;
pub mod transition;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineOutcome, EngineSettings, ScatterEngine};
pub use messages::{EngineHandle, EngineMessage, TriggerSource};
pub use transition::{ScatterPhase, TransitionGuard};
