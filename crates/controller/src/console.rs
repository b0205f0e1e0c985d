//! Line-oriented trigger console.
//!
//! Each input line is one trigger: `preload <id>`, `play <id>`, `select <id>`,
//! `reset`, `port <n>`, `status`, `quit`.

use std::str::FromStr;

use relayer::RelayServer;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::coordinator::{Intent, PlaybackCoordinator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Preload(String),
    Play(String),
    Select(String),
    Reset,
    Port(u16),
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseTriggerError {
    #[error("empty line")]
    Empty,
    #[error("unknown trigger '{0}'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

impl FromStr for Trigger {
    type Err = ParseTriggerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or(ParseTriggerError::Empty)?;
        let arg = parts.next();
        let id = |name: &'static str| {
            arg.map(str::to_string)
                .ok_or(ParseTriggerError::MissingArgument(name))
        };
        match verb.to_ascii_lowercase().as_str() {
            "preload" => Ok(Self::Preload(id("preload")?)),
            "play" => Ok(Self::Play(id("play")?)),
            "select" | "click" => Ok(Self::Select(id("select")?)),
            "reset" => Ok(Self::Reset),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            "port" => {
                let raw = arg.ok_or(ParseTriggerError::MissingArgument("port"))?;
                raw.parse()
                    .map(Self::Port)
                    .map_err(|_| ParseTriggerError::InvalidPort(raw.to_string()))
            }
            other => Err(ParseTriggerError::Unknown(other.to_string())),
        }
    }
}

/// Read triggers from `input` until `quit` or end of input.
///
/// The relay is left running; the caller owns teardown.
pub async fn run<R>(
    input: R,
    coordinator: &PlaybackCoordinator,
    server: &mut RelayServer,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let trigger = match line.parse::<Trigger>() {
            Ok(t) => t,
            Err(ParseTriggerError::Empty) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        if !handle(trigger, coordinator, server).await {
            break;
        }
    }
    tracing::debug!("trigger console finished");
    Ok(())
}

/// Returns `false` when the console should stop.
async fn handle(
    trigger: Trigger,
    coordinator: &PlaybackCoordinator,
    server: &mut RelayServer,
) -> bool {
    match trigger {
        Trigger::Preload(id) => coordinator.issue(Intent::Preload(id)),
        Trigger::Play(id) => coordinator.issue(Intent::Play(id)),
        Trigger::Select(id) => coordinator.select(&id),
        Trigger::Reset => {
            coordinator.reset();
            let dropped = server.queue().clear();
            tracing::info!(dropped, "queue cleared");
        }
        Trigger::Port(port) => change_port(server, port).await,
        Trigger::Status => {
            let shown = coordinator.display();
            println!(
                "relay: {} | queue: {} | state: {} {}",
                server
                    .local_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "stopped".to_string()),
                server.queue().len(),
                shown.label(),
                shown.video_id().unwrap_or("-"),
            );
        }
        Trigger::Quit => return false,
    }
    true
}

async fn change_port(server: &mut RelayServer, port: u16) {
    let previous = server.config().port;
    match server.restart(port).await {
        Ok(addr) => println!("relay now on http://{}", addr),
        Err(e) => {
            tracing::error!(err = %e, port, "restart failed");
            if server.is_running() {
                return;
            }
            match server.start(previous).await {
                Ok(addr) => println!("relay back on http://{}", addr),
                Err(e) => tracing::error!(err = %e, port = previous, "could not restore relay"),
            }
        }
    }
}
