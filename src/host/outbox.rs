//! In-memory host: keeps the roster and map info pushed by the game-server bridge and queues
//! every outbound call in an outbox the bridge drains.

use super::{Host, HostError, ModeSettings, OnlinePlayer};
use crate::models::TeamDirective;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A call the sequencer asked the game server to make.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    SetNextScript { script: String },
    RestartMap,
    UpdateModeSettings { settings: ModeSettings },
    AssignTeams { directives: Vec<TeamDirective> },
    Chat { message: String, target: Option<String> },
    SaveReplays,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub call: HostCall,
}

#[derive(Clone, Debug, Default)]
pub struct OutboxHost {
    roster: Vec<OnlinePlayer>,
    author_time: u32,
    /// Forward the replay hook to the bridge (a replay module is loaded on the server).
    replay_module: bool,
    outbox: Vec<OutboxEntry>,
}

impl OutboxHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replay_module(mut self, enabled: bool) -> Self {
        self.replay_module = enabled;
        self
    }

    /// Replace the roster snapshot.
    pub fn set_roster(&mut self, roster: Vec<OnlinePlayer>) {
        self.roster = roster;
    }

    pub fn roster(&self) -> &[OnlinePlayer] {
        &self.roster
    }

    pub fn set_author_time(&mut self, author_time_ms: u32) {
        self.author_time = author_time_ms;
    }

    /// Calls queued since the last drain, oldest first.
    pub fn calls(&self) -> impl Iterator<Item = &HostCall> {
        self.outbox.iter().map(|e| &e.call)
    }

    /// Take every queued call.
    pub fn drain(&mut self) -> Vec<OutboxEntry> {
        std::mem::take(&mut self.outbox)
    }

    fn push(&mut self, call: HostCall) {
        self.outbox.push(OutboxEntry { at: Utc::now(), call });
    }
}

impl Host for OutboxHost {
    async fn set_next_script(&mut self, script: &str) -> Result<(), HostError> {
        self.push(HostCall::SetNextScript {
            script: script.to_string(),
        });
        Ok(())
    }

    async fn restart_map(&mut self) -> Result<(), HostError> {
        self.push(HostCall::RestartMap);
        Ok(())
    }

    async fn update_mode_settings(&mut self, settings: ModeSettings) -> Result<(), HostError> {
        self.push(HostCall::UpdateModeSettings { settings });
        Ok(())
    }

    async fn assign_teams(&mut self, directives: &[TeamDirective]) -> Result<(), HostError> {
        self.push(HostCall::AssignTeams {
            directives: directives.to_vec(),
        });
        Ok(())
    }

    async fn chat(&mut self, message: &str, target: Option<&str>) -> Result<(), HostError> {
        self.push(HostCall::Chat {
            message: message.to_string(),
            target: target.map(str::to_string),
        });
        Ok(())
    }

    async fn online_players(&self) -> Result<Vec<OnlinePlayer>, HostError> {
        Ok(self.roster.clone())
    }

    async fn current_map_author_time(&self) -> Result<u32, HostError> {
        if self.author_time == 0 {
            return Err(HostError::new("current_map_author_time", "no map reported yet"));
        }
        Ok(self.author_time)
    }

    async fn on_qualification_restart(&mut self) -> Result<(), HostError> {
        if self.replay_module {
            self.push(HostCall::SaveReplays);
        }
        Ok(())
    }
}
