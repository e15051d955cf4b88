//! MatchContext, Phase, and MatchError.

use crate::models::player::RankedPlayers;
use crate::models::teams::TeamAssignment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors reported back to whoever issued a command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchError {
    /// Command needs the teams phase but the match hasn't reached it.
    NotReady { phase: Phase },
    /// Command name or alias not recognised.
    UnknownCommand(String),
    /// Chat line isn't addressed to the match namespace.
    NotACommand(String),
    /// Writing the results export failed.
    Export(String),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::NotReady { phase } => write!(
                f,
                "Match needs to be in teams mode in order to execute this command (current status: {}).",
                phase
            ),
            MatchError::UnknownCommand(name) => write!(f, "Unknown command: {}", name),
            MatchError::NotACommand(line) => write!(f, "Not a match command: {}", line),
            MatchError::Export(reason) => write!(f, "Could not export results: {}", reason),
        }
    }
}

impl std::error::Error for MatchError {}

/// Where the sequence is. Variants are ordered: commands gate on `phase >= TeamsPrematch`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No sequence running.
    #[default]
    Stopped,
    /// Time attack script requested, waiting for the map to restart.
    Starting,
    /// Qualification map is being played.
    TimeAttack,
    /// Results captured, teams script requested, waiting for the teams map.
    TeamsPrematch,
    /// Teams map is being played with balanced teams.
    TeamsRounds,
}

impl Phase {
    /// True once qualification results exist and teams can be (re)built.
    pub fn is_teams(self) -> bool {
        self >= Phase::TeamsPrematch
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Stopped => "STOPPED",
            Phase::Starting => "STARTING",
            Phase::TimeAttack => "TIME_ATTACK",
            Phase::TeamsPrematch => "TEAMS_PREMATCH",
            Phase::TeamsRounds => "TEAMS_ROUNDS",
        };
        f.write_str(name)
    }
}

/// Everything the sequencer knows about the current match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    /// Set on every start; None while stopped.
    pub sequence_id: Option<Uuid>,
    pub phase: Phase,
    pub ranked: RankedPlayers,
    pub teams: TeamAssignment,
}

impl MatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all match data and go back to Stopped.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
