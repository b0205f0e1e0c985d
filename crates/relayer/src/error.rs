//! Relay errors.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by [`crate::RelayServer`] lifecycle operations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("web root {} is not usable: {source}", path.display())]
    WebRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("relay already running on {0}")]
    AlreadyRunning(SocketAddr),

    #[error("serve loop failed: {0}")]
    Serve(#[from] io::Error),
}
