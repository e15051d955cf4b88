//! Qualification results: PlayerResult and RankedPlayers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable player key (the game login).
pub type PlayerId = String;

/// One player's qualification result, captured when the time attack map ends.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub login: PlayerId,
    pub nickname: String,
    /// Best race time in milliseconds. None if the player never finished.
    pub time: Option<u32>,
}

impl PlayerResult {
    /// Build a result from a raw host time. The game reports "no time" as -1 (or 0).
    pub fn new(login: impl Into<PlayerId>, nickname: impl Into<String>, raw_time: Option<i64>) -> Self {
        let time = raw_time
            .filter(|t| *t > 0)
            .and_then(|t| u32::try_from(t).ok());
        Self {
            login: login.into(),
            nickname: nickname.into(),
            time,
        }
    }

    /// Best time in seconds, for display.
    pub fn time_seconds(&self) -> Option<f64> {
        self.time.map(|ms| f64::from(ms) / 1000.0)
    }
}

/// Qualification results in rank order (fastest first).
///
/// Built once per qualification map and replaced wholesale; never edited in place.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayers {
    players: Vec<PlayerResult>,
    captured_at: Option<DateTime<Utc>>,
}

impl RankedPlayers {
    /// Rank results by ascending time. The sort is stable: equal times keep arrival order,
    /// and players without a time go last in arrival order.
    pub fn from_results(mut results: Vec<PlayerResult>) -> Self {
        results.sort_by_key(|p| (p.time.is_none(), p.time));
        Self {
            players: results,
            captured_at: Some(Utc::now()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerResult> {
        self.players.iter()
    }

    pub fn as_slice(&self) -> &[PlayerResult] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Look up a ranked player by login.
    pub fn get(&self, login: &str) -> Option<&PlayerResult> {
        self.players.iter().find(|p| p.login == login)
    }

    /// Display name for a login, falling back to the login itself.
    pub fn nickname_of<'a>(&'a self, login: &'a str) -> &'a str {
        self.get(login).map(|p| p.nickname.as_str()).unwrap_or(login)
    }

    /// When the ranking was captured (None for an empty default ranking).
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }
}
