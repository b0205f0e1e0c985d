//! VJ player controller: playback coordination on top of the relay.

pub mod cli;
pub mod console;
pub mod coordinator;
pub mod remote;
