//! Team balancing: snake draft over the qualification ranking.

use crate::host::OnlinePlayer;
use crate::models::{PlayerId, RankedPlayers, TeamAssignment, TeamColor};
use std::collections::HashSet;

/// Logins that are online and not spectating.
pub fn playing_logins(online: &[OnlinePlayer]) -> HashSet<PlayerId> {
    online
        .iter()
        .filter(|p| !p.is_spectator)
        .map(|p| p.login.clone())
        .collect()
}

/// Split ranked players who are still playing into two teams, snake order:
///
/// ```text
/// Blue | Red
///   1  |  2
///   4  |  3
///   5  |  6
///   8  |  7
/// ```
///
/// 1. Keep only ranked players in `playing`, in rank order.
/// 2. Position `i` (continuous over the whole list) goes blue if `i % 4` is 0 or 3, red otherwise.
pub fn balance_teams(ranked: &RankedPlayers, playing: &HashSet<PlayerId>) -> TeamAssignment {
    let mut teams = TeamAssignment::default();
    let eligible = ranked.iter().filter(|p| playing.contains(&p.login));
    for (i, player) in eligible.enumerate() {
        let color = match i % 4 {
            0 | 3 => TeamColor::Blue,
            _ => TeamColor::Red,
        };
        teams.push(color, player.login.clone());
    }
    teams
}
