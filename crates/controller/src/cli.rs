//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shared::CommandKind;

#[derive(Parser)]
#[command(name = "controller")]
#[command(about = "VJ player controller: relay, playback coordinator, trigger console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay and read triggers from stdin [default]
    Run {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding the player page (overrides WEB_ROOT)
        #[arg(long, value_name = "DIR")]
        web_root: Option<PathBuf>,
    },

    /// Queue a command on a running relay (RELAY_URL)
    Send {
        /// PRELOAD or PLAY
        #[arg(value_name = "CMD")]
        cmd: CommandKind,

        #[arg(value_name = "VIDEO_ID")]
        video_id: String,
    },

    /// Show the queue size of a running relay (RELAY_URL)
    Status,

    /// Act as a headless player against a running relay (RELAY_URL)
    SimulatePlayer {
        /// Delay between `preloading` and `ready`
        #[arg(long, default_value_t = 1000)]
        ready_after_ms: u64,

        #[arg(long, default_value_t = 100)]
        poll_interval_ms: u64,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Run {
            port: None,
            web_root: None,
        }
    }
}
