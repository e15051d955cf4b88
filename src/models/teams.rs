//! Team colors, team assignment, and the per-player directives sent to the game server.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// One of the two teams. Blue is team index 0 ("Team A"), red is index 1 ("Team B").
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamColor {
    Blue,
    Red,
}

impl TeamColor {
    /// Team index used by the game server's ForcePlayerTeam call.
    pub fn index(self) -> u8 {
        match self {
            TeamColor::Blue => 0,
            TeamColor::Red => 1,
        }
    }

    /// Chat color code prefixed to player names.
    pub fn tag(self) -> &'static str {
        match self {
            TeamColor::Blue => "$00f",
            TeamColor::Red => "$f00",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamColor::Blue => "Blue",
            TeamColor::Red => "Red",
        }
    }
}

/// Chat code that resets formatting after a colored name.
pub const RESET_TAG: &str = "$z";

/// Force one player onto a team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamDirective {
    pub login: PlayerId,
    pub team: TeamColor,
}

/// The two teams, each in draft order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub blue: Vec<PlayerId>,
    pub red: Vec<PlayerId>,
}

impl TeamAssignment {
    pub fn is_empty(&self) -> bool {
        self.blue.is_empty() && self.red.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blue.len() + self.red.len()
    }

    pub fn team(&self, color: TeamColor) -> &[PlayerId] {
        match color {
            TeamColor::Blue => &self.blue,
            TeamColor::Red => &self.red,
        }
    }

    /// Which team a player is on, if any.
    pub fn team_of(&self, login: &str) -> Option<TeamColor> {
        if self.blue.iter().any(|l| l == login) {
            Some(TeamColor::Blue)
        } else if self.red.iter().any(|l| l == login) {
            Some(TeamColor::Red)
        } else {
            None
        }
    }

    /// The team with fewer players; blue on a tie.
    pub fn smaller_team(&self) -> TeamColor {
        if self.red.len() < self.blue.len() {
            TeamColor::Red
        } else {
            TeamColor::Blue
        }
    }

    /// Append a player to a team. Does nothing if they are already assigned.
    pub fn push(&mut self, color: TeamColor, login: impl Into<PlayerId>) {
        let login = login.into();
        if self.team_of(&login).is_some() {
            return;
        }
        match color {
            TeamColor::Blue => self.blue.push(login),
            TeamColor::Red => self.red.push(login),
        }
    }

    /// One directive per assigned player: all of blue, then all of red.
    pub fn directives(&self) -> Vec<TeamDirective> {
        let blue = self.blue.iter().map(|login| TeamDirective {
            login: login.clone(),
            team: TeamColor::Blue,
        });
        let red = self.red.iter().map(|login| TeamDirective {
            login: login.clone(),
            team: TeamColor::Red,
        });
        blue.chain(red).collect()
    }
}
