//! Command outbox polled by the player page.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::Command;

/// FIFO command queue. Every command is handed out at most once.
///
/// The lock is held only for the queue operation itself, never across I/O.
#[derive(Debug, Default)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<Command>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Command>> {
        // A panicking request must not wedge the queue for everyone else.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enqueue(&self, command: Command) {
        tracing::debug!(cmd = command.cmd.as_str(), video_id = %command.video_id, "command queued");
        self.lock().push_back(command);
    }

    /// Remove and return the oldest command.
    pub fn pop(&self) -> Option<Command> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every undelivered command. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut queue = self.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}
