//! Inbound lifecycle events and operator commands.

use crate::models::match_context::MatchError;
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Score section the game sends once a map is over.
pub const END_MAP_SECTION: &str = "EndMap";

/// Command namespace in chat (`//tmit start`).
pub const COMMAND_NAMESPACE: &str = "tmit";

/// One player's line in a scores callback.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub login: PlayerId,
    pub nickname: String,
    /// Raw best race time in ms as sent by the game; -1 or missing means no finish.
    #[serde(default)]
    pub best_race_time: Option<i64>,
}

/// Lifecycle events delivered by the game server.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvent {
    /// A new match (map) started.
    MatchStarted,
    /// Scores were published. Only `section == "EndMap"` matters.
    Scores {
        section: String,
        #[serde(default)]
        players: Vec<ScoreEntry>,
    },
    /// A player took a playing slot.
    PlayerEnterSlot {
        login: PlayerId,
        #[serde(default)]
        nickname: String,
        #[serde(default)]
        is_spectator: bool,
    },
}

impl MatchEvent {
    pub fn is_end_of_map(&self) -> bool {
        matches!(self, MatchEvent::Scores { section, .. } if section == END_MAP_SECTION)
    }
}

/// Operator commands in the `tmit` namespace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Start (or restart) the time attack + teams sequence.
    Start,
    /// Rebuild teams from the qualification ranking against who is online now.
    Balance,
    /// Print both team rosters.
    Teams,
    /// Print phase and ranking.
    Info,
    /// Abort the sequence.
    End,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Start,
        Command::Balance,
        Command::Teams,
        Command::Info,
        Command::End,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Balance => "balance",
            Command::Teams => "teams",
            Command::Info => "info",
            Command::End => "end",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Command::Start => "s",
            Command::Balance => "b",
            Command::Teams => "t",
            Command::Info => "i",
            Command::End => "e",
        }
    }

    /// Whether the command only makes sense once teams can be built.
    pub fn requires_teams_phase(self) -> bool {
        matches!(self, Command::Balance | Command::Teams)
    }

    /// Parse a chat line like `//tmit balance` or `/tmit b`.
    pub fn parse_chat(line: &str) -> Result<Self, MatchError> {
        let mut words = line.trim().trim_start_matches('/').split_whitespace();
        match (words.next(), words.next()) {
            (Some(ns), Some(name)) if ns.eq_ignore_ascii_case(COMMAND_NAMESPACE) => name.parse(),
            _ => Err(MatchError::NotACommand(line.trim().to_string())),
        }
    }
}

impl FromStr for Command {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Command::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted) || c.alias().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MatchError::UnknownCommand(wanted.to_string()))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
