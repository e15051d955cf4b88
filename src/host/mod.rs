//! The game server as seen by the sequencer: the calls it can make and the roster it can read.

mod outbox;

pub use outbox::{HostCall, OutboxEntry, OutboxHost};

use crate::models::{PlayerId, TeamDirective};
use serde::{Deserialize, Serialize};

/// Mode settings sent with `update_mode_settings` (e.g. `S_TimeLimit`).
pub type ModeSettings = serde_json::Map<String, serde_json::Value>;

/// A remote call to the game server failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostError {
    pub call: &'static str,
    pub reason: String,
}

impl HostError {
    pub fn new(call: &'static str, reason: impl Into<String>) -> Self {
        Self {
            call,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.call, self.reason)
    }
}

impl std::error::Error for HostError {}

/// One entry of the live roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OnlinePlayer {
    pub login: PlayerId,
    #[serde(default)]
    pub is_spectator: bool,
}

impl OnlinePlayer {
    pub fn playing(login: impl Into<PlayerId>) -> Self {
        Self {
            login: login.into(),
            is_spectator: false,
        }
    }

    pub fn spectator(login: impl Into<PlayerId>) -> Self {
        Self {
            login: login.into(),
            is_spectator: true,
        }
    }
}

/// Operations the sequencer needs from the game server.
///
/// The sequencer awaits each call in turn and never retries; the host is expected to bound
/// its own calls with timeouts.
#[allow(async_fn_in_trait)]
pub trait Host {
    /// Schedule a game mode script for the next map load.
    async fn set_next_script(&mut self, script: &str) -> Result<(), HostError>;

    /// Restart the current map with current settings.
    async fn restart_map(&mut self) -> Result<(), HostError>;

    async fn update_mode_settings(&mut self, settings: ModeSettings) -> Result<(), HostError>;

    /// Force players onto teams, all in one grouped call.
    async fn assign_teams(&mut self, directives: &[TeamDirective]) -> Result<(), HostError>;

    /// Send a chat message to everybody, or only to `target`.
    async fn chat(&mut self, message: &str, target: Option<&str>) -> Result<(), HostError>;

    async fn online_players(&self) -> Result<Vec<OnlinePlayer>, HostError>;

    /// Author time of the map currently loaded, in milliseconds.
    async fn current_map_author_time(&self) -> Result<u32, HostError>;

    /// Hook for a cooperating replay module: save the previous qualification's replays.
    /// Hosts without such a module keep the default.
    async fn on_qualification_restart(&mut self) -> Result<(), HostError> {
        Ok(())
    }
}
