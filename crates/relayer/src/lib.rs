//! VJ player relay — command queue, feedback inbox, and player asset hosting.

pub mod api;
pub mod config;
pub mod error;
pub mod feedback;
pub mod queue;
pub mod server;

pub use config::Config;
pub use error::RelayError;
pub use feedback::{FeedbackChannel, FeedbackSink};
pub use queue::CommandQueue;
pub use server::RelayServer;
