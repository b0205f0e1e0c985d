//! Single-slot feedback channel between the relay and its owner.

use std::sync::{Arc, PoisonError, RwLock};

use shared::{FeedbackEvent, ModelError};

/// Receiver of validated player feedback.
///
/// Called synchronously on the request-serving task; implementations must not block.
pub trait FeedbackSink: Send + Sync {
    fn on_feedback(&self, event: FeedbackEvent);
}

impl<F> FeedbackSink for F
where
    F: Fn(FeedbackEvent) + Send + Sync,
{
    fn on_feedback(&self, event: FeedbackEvent) {
        self(event)
    }
}

/// Holds at most one [`FeedbackSink`]. Clones share the slot.
#[derive(Clone, Default)]
pub struct FeedbackChannel {
    slot: Arc<RwLock<Option<Arc<dyn FeedbackSink>>>>,
}

impl FeedbackChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `sink`, replacing any previous one.
    pub fn register(&self, sink: Arc<dyn FeedbackSink>) {
        let replaced = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(sink)
            .is_some();
        tracing::debug!(replaced, "feedback sink registered");
    }

    pub fn unregister(&self) {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn has_sink(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Validate a raw payload and forward it. Returns whether a sink received it.
    pub fn dispatch_raw(&self, body: &[u8]) -> Result<bool, ModelError> {
        let event = FeedbackEvent::from_slice(body)?;
        Ok(self.dispatch(event))
    }

    /// Forward an already validated event. Returns whether a sink received it.
    pub fn dispatch(&self, event: FeedbackEvent) -> bool {
        // Clone out of the slot so the sink runs without the lock held.
        let sink = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match sink {
            Some(sink) => {
                sink.on_feedback(event);
                true
            }
            None => {
                tracing::debug!(
                    state = event.state.as_str(),
                    video_id = %event.video_id,
                    "no feedback sink registered, dropping event"
                );
                false
            }
        }
    }
}
