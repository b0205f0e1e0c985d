//! Wire types for the VJ player relay: commands, feedback, and response bodies.

mod models;

// Explicit re-exports (avoids rust-analyzer issues with `pub use models::*`)
pub use models::{
    unix_timestamp, AckResponse, Command, CommandKind, FeedbackEvent, FeedbackState, ModelError,
    StatusResponse,
};
