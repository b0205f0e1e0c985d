//! Configuration for the relay.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory the player page is served from.
    pub web_root: PathBuf,
    /// Page `/` redirects to.
    pub entry_page: String,
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);
        let web_root = std::env::var("WEB_ROOT")
            .map(|s| PathBuf::from(shellexpand::tilde(&s).to_string()))
            .unwrap_or_else(|_| PathBuf::from("./web"));
        let entry_page = std::env::var("ENTRY_PAGE")
            .map(|s| s.trim_start_matches('/').to_string())
            .unwrap_or_else(|_| "player.html".to_string());
        let shutdown_timeout_secs = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let config = Self {
            host,
            port,
            web_root,
            entry_page,
            shutdown_timeout_secs,
        };
        if !config.is_loopback() {
            tracing::warn!(host = %config.host, "relay bound to a non-loopback host; it has no authentication");
        }
        config
    }

    /// Config serving `web_root` on an ephemeral loopback port.
    pub fn for_test(web_root: impl Into<PathBuf>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            web_root: web_root.into(),
            entry_page: "player.html".to_string(),
            shutdown_timeout_secs: 2,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn is_loopback(&self) -> bool {
        if self.host.eq_ignore_ascii_case("localhost") {
            return true;
        }
        self.host
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
    }
}
