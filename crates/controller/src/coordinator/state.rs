//! Playback transition table.
//!
//! The armed role (video being prepared) and the playing role are tracked as
//! separate fields. Feedback about one role never rewrites the other, so a late
//! event for a superseded candidate cannot corrupt what is on screen.

use shared::{Command, CommandKind, FeedbackState};

/// Preparation phase of the armed video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmedPhase {
    Preloading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Armed {
    pub id: String,
    pub phase: ArmedPhase,
}

/// Operator request, before it becomes a wire command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Preload(String),
    Play(String),
}

impl Intent {
    pub fn video_id(&self) -> &str {
        match self {
            Self::Preload(id) | Self::Play(id) => id,
        }
    }
}

/// Presentation-only summary derived from [`PlaybackState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Preloading(String),
    Ready(String),
    Playing(String),
}

impl DisplayState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preloading(_) => "preloading",
            Self::Ready(_) => "ready",
            Self::Playing(_) => "playing",
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Preloading(id) | Self::Ready(id) | Self::Playing(id) => Some(id),
        }
    }
}

/// Everything the coordinator knows about playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    armed: Option<Armed>,
    playing_id: Option<String>,
    pending_play_id: Option<String>,
    click_armed_id: Option<String>,
}

impl PlaybackState {
    pub fn armed(&self) -> Option<&Armed> {
        self.armed.as_ref()
    }

    pub fn armed_id(&self) -> Option<&str> {
        self.armed.as_ref().map(|a| a.id.as_str())
    }

    pub fn armed_phase(&self) -> Option<ArmedPhase> {
        self.armed.as_ref().map(|a| a.phase)
    }

    pub fn playing_id(&self) -> Option<&str> {
        self.playing_id.as_deref()
    }

    pub fn pending_play_id(&self) -> Option<&str> {
        self.pending_play_id.as_deref()
    }

    pub fn click_armed_id(&self) -> Option<&str> {
        self.click_armed_id.as_deref()
    }

    fn is_ready(&self, id: &str) -> bool {
        matches!(&self.armed, Some(Armed { id: armed, phase: ArmedPhase::Ready }) if armed == id)
    }

    fn arm(&mut self, id: &str, phase: ArmedPhase) {
        self.armed = Some(Armed {
            id: id.to_string(),
            phase,
        });
    }

    pub fn apply_intent(&mut self, intent: &Intent) -> Option<Command> {
        match intent {
            Intent::Preload(id) => self.preload(id),
            Intent::Play(id) => self.play(id),
        }
    }

    /// Arm `id` unless it already is. Replacing the candidate cancels a pending play.
    pub fn preload(&mut self, id: &str) -> Option<Command> {
        if self.armed_id() == Some(id) {
            return None;
        }
        self.arm(id, ArmedPhase::Preloading);
        self.pending_play_id = None;
        Some(Command::new(CommandKind::Preload, id))
    }

    /// Play now if `id` is ready, otherwise preload it and play once it reports ready.
    pub fn play(&mut self, id: &str) -> Option<Command> {
        if self.is_ready(id) {
            self.playing_id = Some(id.to_string());
            self.pending_play_id = None;
            return Some(Command::new(CommandKind::Play, id));
        }
        let command = self.preload(id);
        self.pending_play_id = Some(id.to_string());
        command
    }

    /// Pointer selection: the first selection of an id preloads it, the next one plays it.
    pub fn select(&mut self, id: &str) -> Option<Command> {
        if self.click_armed_id.as_deref() == Some(id) {
            return self.play(id);
        }
        let command = self.preload(id);
        self.click_armed_id = Some(id.to_string());
        command
    }

    /// Adopt a player report. Unknown ids are taken as fresh observations.
    pub fn apply_feedback(&mut self, state: FeedbackState, id: &str) -> Option<Command> {
        match state {
            FeedbackState::Preloading => {
                self.arm(id, ArmedPhase::Preloading);
                None
            }
            FeedbackState::Ready => {
                self.arm(id, ArmedPhase::Ready);
                if self.pending_play_id.as_deref() == Some(id) {
                    self.playing_id = Some(id.to_string());
                    self.pending_play_id = None;
                    return Some(Command::new(CommandKind::Play, id));
                }
                None
            }
            FeedbackState::Playing => {
                self.playing_id = Some(id.to_string());
                if self.pending_play_id.as_deref() == Some(id) {
                    self.pending_play_id = None;
                }
                if self.click_armed_id.as_deref() == Some(id) {
                    self.click_armed_id = None;
                }
                None
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// An armed candidate other than the playing video takes precedence.
    pub fn display(&self) -> DisplayState {
        match (&self.armed, &self.playing_id) {
            (Some(armed), playing) if playing.as_deref() != Some(armed.id.as_str()) => {
                match armed.phase {
                    ArmedPhase::Preloading => DisplayState::Preloading(armed.id.clone()),
                    ArmedPhase::Ready => DisplayState::Ready(armed.id.clone()),
                }
            }
            (_, Some(playing)) => DisplayState::Playing(playing.clone()),
            _ => DisplayState::Idle,
        }
    }
}
