//! Capturing qualification results and rendering them (chat listing, roster lines, CSV).

use crate::models::{
    MatchError, PlayerResult, RankedPlayers, ScoreEntry, TeamAssignment, TeamColor, RESET_TAG,
};
use serde::Serialize;

/// Build the ranking from the end-of-map scores (one entry per player, in callback order).
pub fn capture_ranked_results(entries: &[ScoreEntry]) -> RankedPlayers {
    let results = entries
        .iter()
        .map(|e| PlayerResult::new(e.login.clone(), e.nickname.clone(), e.best_race_time))
        .collect();
    RankedPlayers::from_results(results)
}

fn format_time(player: &PlayerResult) -> String {
    match player.time_seconds() {
        Some(s) => format!("{:.3}", s),
        None => "-".to_string(),
    }
}

/// `Players:  0 $00fAlice$z (10.000)  1 $f00Bob$z (11.000) ...` with 0-based ranks.
pub fn info_listing(ranked: &RankedPlayers, teams: &TeamAssignment) -> String {
    let mut message = String::from("Players: ");
    for (i, player) in ranked.iter().enumerate() {
        let color = teams.team_of(&player.login).map(TeamColor::tag).unwrap_or("");
        message.push_str(&format!(
            "{:2} {}{}{} ({}) ",
            i,
            color,
            player.nickname,
            RESET_TAG,
            format_time(player)
        ));
    }
    message.trim_end().to_string()
}

/// Display names of one team, in draft order.
pub fn roster_names(ranked: &RankedPlayers, teams: &TeamAssignment, color: TeamColor) -> Vec<String> {
    teams
        .team(color)
        .iter()
        .map(|login| ranked.nickname_of(login).to_string())
        .collect()
}

/// `$00fBlue$z: Alice, Dave`
pub fn roster_line(ranked: &RankedPlayers, teams: &TeamAssignment, color: TeamColor) -> String {
    format!(
        "{}{}{}: {}",
        color.tag(),
        color.label(),
        RESET_TAG,
        roster_names(ranked, teams, color).join(", ")
    )
}

#[derive(Serialize)]
struct ResultRow<'a> {
    rank: usize,
    login: &'a str,
    nickname: &'a str,
    time_ms: Option<u32>,
    team: Option<TeamColor>,
}

/// Ranking as CSV (`rank,login,nickname,time_ms,team`), ranks starting at 1.
pub fn results_csv(ranked: &RankedPlayers, teams: &TeamAssignment) -> Result<String, MatchError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (i, player) in ranked.iter().enumerate() {
        writer
            .serialize(ResultRow {
                rank: i + 1,
                login: &player.login,
                nickname: &player.nickname,
                time_ms: player.time,
                team: teams.team_of(&player.login),
            })
            .map_err(|e| MatchError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| MatchError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| MatchError::Export(e.to_string()))
}
