//! Messages delivered to the scatter engine from other execution contexts.
//!
//! The keyboard hook and the hot-corner poller never touch engine state.
//! They enqueue an [`EngineMessage`] through an [`EngineHandle`] and return
//! immediately; the UI context drains the queue between frames.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

use super::geometry::Point;
use super::window::WindowHandle;

/// Where a scatter request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// The configured keyboard chord.
    Hotkey,
    /// The cursor dwelled in the hot corner.
    HotCorner,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hotkey => write!(f, "hotkey"),
            Self::HotCorner => write!(f, "hot corner"),
        }
    }
}

/// Requests handled by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Show the overlay.
    Trigger(TriggerSource),
    /// Switch to the given window.
    Select(WindowHandle),
    /// The overlay was clicked at a canvas point.
    Click(Point),
    /// Dismiss the overlay without switching.
    Cancel,
    /// Stop the engine loop.
    Shutdown,
}

impl EngineMessage {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Trigger(_) => "trigger",
            Self::Select(_) => "select",
            Self::Click(_) => "click",
            Self::Cancel => "cancel",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Error types for engine communication.
#[derive(Debug, Error)]
pub enum EngineSendError {
    /// The engine has stopped and dropped its queue.
    #[error("Failed to send message to engine: channel closed")]
    Closed,
}

/// Cheap, cloneable sender half of the engine queue.
///
/// Sending never blocks, which makes it safe to use from the keyboard hook.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: mpsc::UnboundedSender<EngineMessage>,
}

impl EngineHandle {
    /// Queues a message.
    ///
    /// # Errors
    ///
    /// Returns [`EngineSendError::Closed`] if the engine has stopped.
    pub fn send(&self, msg: EngineMessage) -> Result<(), EngineSendError> {
        self.sender.send(msg).map_err(|_| EngineSendError::Closed)
    }

    /// Queues a scatter request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineSendError::Closed`] if the engine has stopped.
    pub fn trigger(&self, source: TriggerSource) -> Result<(), EngineSendError> {
        self.send(EngineMessage::Trigger(source))
    }
}

/// Receiver half of the engine queue, owned by the engine.
#[derive(Debug)]
pub struct EngineQueue {
    receiver: mpsc::UnboundedReceiver<EngineMessage>,
}

impl EngineQueue {
    /// Next queued message, if any, without waiting.
    pub fn try_next(&mut self) -> Option<EngineMessage> { self.receiver.try_recv().ok() }
}

/// Creates a connected handle/queue pair.
#[must_use]
pub fn channel() -> (EngineHandle, EngineQueue) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EngineHandle { sender }, EngineQueue { receiver })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_arrive_in_order() {
        let (handle, mut queue) = channel();
        handle.trigger(TriggerSource::Hotkey).unwrap();
        handle.send(EngineMessage::Cancel).unwrap();

        assert_eq!(queue.try_next(), Some(EngineMessage::Trigger(TriggerSource::Hotkey)));
        assert_eq!(queue.try_next(), Some(EngineMessage::Cancel));
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_send_after_queue_dropped_fails() {
        let (handle, queue) = channel();
        drop(queue);
        assert!(matches!(handle.send(EngineMessage::Cancel), Err(EngineSendError::Closed)));
    }

    #[test]
    fn test_handle_is_usable_from_other_threads() {
        let (handle, mut queue) = channel();
        let sender = handle.clone();
        std::thread::spawn(move || sender.trigger(TriggerSource::HotCorner).unwrap())
            .join()
            .unwrap();
        assert_eq!(queue.try_next(), Some(EngineMessage::Trigger(TriggerSource::HotCorner)));
    }

    #[test]
    fn test_message_names() {
        assert_eq!(EngineMessage::Click(Point::default()).name(), "click");
        assert_eq!(EngineMessage::Select(WindowHandle(1)).name(), "select");
    }
}
