//! Playback coordinator: turns trigger intents into relay commands and player
//! feedback into state transitions.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use relayer::{CommandQueue, FeedbackSink};
use shared::{Command, FeedbackEvent};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub use state::{Armed, ArmedPhase, DisplayState, Intent, PlaybackState};

/// Published after every transition that changed the tracked state or emitted a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub display: DisplayState,
    pub video_id: Option<String>,
}

impl From<DisplayState> for StateChange {
    fn from(display: DisplayState) -> Self {
        let video_id = display.video_id().map(String::from);
        Self { display, video_id }
    }
}

/// Owns the [`PlaybackState`] and the outbound side of the command queue.
///
/// Safe to drive concurrently from triggers and from the relay's feedback path.
pub struct PlaybackCoordinator {
    state: Mutex<PlaybackState>,
    queue: Arc<CommandQueue>,
    tx: broadcast::Sender<StateChange>,
}

impl PlaybackCoordinator {
    pub fn new(queue: Arc<CommandQueue>) -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            state: Mutex::new(PlaybackState::default()),
            queue,
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `step` under the state lock, enqueue what it emits, and publish the
    /// resulting display state.
    ///
    /// Publishing happens before the lock is released so observers see changes in
    /// transition order. `broadcast::Sender::send` never waits on receivers.
    fn transition<F>(&self, step: F)
    where
        F: FnOnce(&mut PlaybackState) -> Option<Command>,
    {
        let mut state = self.lock();
        let before = state.clone();
        let emitted = step(&mut state);
        if let Some(command) = &emitted {
            tracing::info!(cmd = command.cmd.as_str(), video_id = %command.video_id, "issuing command");
            self.queue.enqueue(command.clone());
        }
        if emitted.is_none() && *state == before {
            return;
        }
        let shown = state.display();
        tracing::debug!(state = shown.label(), video_id = ?shown.video_id(), "playback state changed");
        // No receivers is fine.
        let _ = self.tx.send(StateChange::from(shown));
    }

    /// Translate a trigger intent into commands.
    pub fn issue(&self, intent: Intent) {
        if intent.video_id().trim().is_empty() {
            tracing::warn!(?intent, "ignoring intent without a video id");
            return;
        }
        tracing::debug!(?intent, "intent");
        self.transition(|state| state.apply_intent(&intent));
    }

    /// Pointer selection with double-click two-phase semantics.
    pub fn select(&self, video_id: &str) {
        if video_id.trim().is_empty() {
            tracing::warn!("ignoring selection without a video id");
            return;
        }
        self.transition(|state| state.select(video_id));
    }

    /// Apply one player report.
    pub fn apply(&self, event: &FeedbackEvent) {
        tracing::debug!(state = event.state.as_str(), video_id = %event.video_id, "feedback");
        self.transition(|state| state.apply_feedback(event.state, &event.video_id));
    }

    /// Forget every tracked role. Queued commands are left alone.
    pub fn reset(&self) {
        tracing::info!("resetting playback state");
        self.transition(|state| {
            state.reset();
            None
        });
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.lock().clone()
    }

    pub fn display(&self) -> DisplayState {
        self.lock().display()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.tx.subscribe()
    }

    /// Run `callback` for every state change on a background task.
    ///
    /// The task ends when the coordinator is dropped or when the handle is aborted.
    pub fn on_state_change<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn(StateChange) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => callback(change),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "state observer lagging");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl FeedbackSink for PlaybackCoordinator {
    fn on_feedback(&self, event: FeedbackEvent) {
        self.apply(&event);
    }
}
