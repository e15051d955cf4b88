//! The match sequence: time attack qualification followed by one map of balanced teams.
//!
//! ```text
//! Stopped -start-> Starting -match start-> TimeAttack -EndMap scores-> TeamsPrematch
//!    ^                                                                      |
//!    +---------------- EndMap scores <- TeamsRounds <- match start ---------+
//! ```
//!
//! Every entry point handles one event to completion. Host calls are best effort: a failed
//! call is logged and the phase still advances, so an operator can recover with `balance`
//! or `start`.

use crate::config::SequencerConfig;
use crate::host::{Host, HostError, ModeSettings};
use crate::logic::balance::{balance_teams, playing_logins};
use crate::logic::ranking::{capture_ranked_results, info_listing, roster_line, roster_names};
use crate::logic::time_limit::{qualification_time_limit, TIME_LIMIT_SETTING};
use crate::models::{
    Command, MatchContext, MatchError, MatchEvent, Phase, PlayerId, ScoreEntry, TeamAssignment,
    TeamColor, TeamDirective, END_MAP_SECTION,
};
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

/// Both rosters as display names, in draft order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TeamRosters {
    pub blue: Vec<String>,
    pub red: Vec<String>,
}

/// Log a failed host call; the sequence carries on.
fn log_failure(result: Result<(), HostError>, sequence_id: Option<Uuid>) {
    if let Err(e) = result {
        warn!("[{}] {}", display_id(sequence_id), e);
    }
}

fn display_id(sequence_id: Option<Uuid>) -> String {
    sequence_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Drives the sequence against a game server host.
pub struct MatchController<H> {
    host: H,
    config: SequencerConfig,
    context: MatchContext,
}

impl<H: Host> MatchController<H> {
    pub fn new(host: H, config: SequencerConfig) -> Self {
        Self {
            host,
            config,
            context: MatchContext::new(),
        }
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    pub fn phase(&self) -> Phase {
        self.context.phase
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn tag(&self) -> String {
        display_id(self.context.sequence_id)
    }

    /// Dispatch a lifecycle event to its handler.
    pub async fn handle_event(&mut self, event: MatchEvent) {
        match event {
            MatchEvent::MatchStarted => self.on_match_started().await,
            MatchEvent::Scores { section, players } => self.on_scores(&section, &players).await,
            MatchEvent::PlayerEnterSlot {
                login,
                nickname,
                is_spectator,
            } => self.on_player_enter_slot(login, &nickname, is_spectator).await,
        }
    }

    /// Run an operator command. Replies go to `operator` (or everyone when None) and are also
    /// returned. A phase-gated command issued too early replies with the not-ready message and
    /// returns [`MatchError::NotReady`] without touching the teams.
    pub async fn run_command(
        &mut self,
        command: Command,
        operator: Option<&str>,
    ) -> Result<Vec<String>, MatchError> {
        debug!("[{}] command {} in phase {}", self.tag(), command, self.context.phase);
        if command.requires_teams_phase() && !self.context.phase.is_teams() {
            let err = MatchError::NotReady {
                phase: self.context.phase,
            };
            let reply = err.to_string();
            log_failure(self.host.chat(&reply, operator).await, self.context.sequence_id);
            return Err(err);
        }
        let replies = match command {
            Command::Start => {
                self.start().await;
                Vec::new()
            }
            Command::Balance => {
                self.rebalance().await;
                Vec::new()
            }
            Command::Teams => {
                let teams = &self.context.teams;
                let ranked = &self.context.ranked;
                vec![
                    roster_line(ranked, teams, TeamColor::Blue),
                    roster_line(ranked, teams, TeamColor::Red),
                ]
            }
            Command::Info => self.info_lines(),
            Command::End => {
                self.end().await;
                vec!["Match aborted.".to_string()]
            }
        };
        for reply in &replies {
            log_failure(self.host.chat(reply, operator).await, self.context.sequence_id);
        }
        Ok(replies)
    }

    /// Start (or restart) the sequence from any phase: clear match data, request the time attack
    /// script, let the replay module save the previous run, restart the map.
    pub async fn start(&mut self) {
        self.context.reset();
        let sequence_id = Uuid::new_v4();
        self.context.sequence_id = Some(sequence_id);
        info!("[{}] Match sequence started: beginning time attack phase.", sequence_id);

        log_failure(
            self.host.set_next_script(&self.config.time_attack_script).await,
            Some(sequence_id),
        );
        if let Err(e) = self.host.on_qualification_restart().await {
            warn!("[{}] Replay hook failed, continuing: {}", sequence_id, e);
        }
        log_failure(self.host.restart_map().await, Some(sequence_id));
        self.context.phase = Phase::Starting;
    }

    /// Abort the sequence from any phase.
    pub async fn end(&mut self) {
        info!("[{}] Match sequence stopped in phase {}.", self.tag(), self.context.phase);
        self.context.reset();
    }

    /// Rebuild teams from the ranking against the current roster and push them again.
    /// Keeps the old teams if the roster can't be read.
    pub async fn rebalance(&mut self) {
        match self.build_teams().await {
            Ok(teams) => {
                self.context.teams = teams;
                self.apply_teams().await;
                debug!("[{}] Teams rebalancing performed.", self.tag());
            }
            Err(e) => warn!("[{}] Rebalance skipped: {}", self.tag(), e),
        }
    }

    /// Rosters as display names. Only available once the teams phase is reached.
    pub fn team_rosters(&self) -> Result<TeamRosters, MatchError> {
        if !self.context.phase.is_teams() {
            return Err(MatchError::NotReady {
                phase: self.context.phase,
            });
        }
        let (ranked, teams) = (&self.context.ranked, &self.context.teams);
        Ok(TeamRosters {
            blue: roster_names(ranked, teams, TeamColor::Blue),
            red: roster_names(ranked, teams, TeamColor::Red),
        })
    }

    fn info_lines(&self) -> Vec<String> {
        let status = format!("Match status: {}.", self.context.phase);
        if !self.context.phase.is_teams() {
            return vec![status];
        }
        vec![status, info_listing(&self.context.ranked, &self.context.teams)]
    }

    async fn on_match_started(&mut self) {
        let arrived = self.context.phase;
        if arrived == Phase::Starting {
            self.enter_time_attack().await;
        }
        // The teams map start may arrive as the same event that ended qualification; only
        // cascade from the phase seen on arrival so teams are assigned once.
        if arrived == Phase::TeamsPrematch {
            self.enter_teams_rounds().await;
        }
    }

    async fn on_scores(&mut self, section: &str, players: &[ScoreEntry]) {
        if section != END_MAP_SECTION {
            return;
        }
        match self.context.phase {
            Phase::TimeAttack => self.enter_teams_prematch(players).await,
            Phase::TeamsRounds => {
                let result = self.host.set_next_script(&self.config.time_attack_script).await;
                log_failure(result, self.context.sequence_id);
                info!("[{}] Teams map finished, sequence complete.", self.tag());
                self.context.reset();
            }
            _ => {}
        }
    }

    /// Late joiners during the teams map: known players go back to their team, new players
    /// join the smaller team (blue on a tie).
    async fn on_player_enter_slot(&mut self, login: PlayerId, nickname: &str, is_spectator: bool) {
        if self.context.phase != Phase::TeamsRounds || is_spectator {
            return;
        }
        let team = match self.context.teams.team_of(&login) {
            Some(team) => team,
            None => {
                let team = self.context.teams.smaller_team();
                self.context.teams.push(team, login.clone());
                team
            }
        };
        let directive = TeamDirective { login, team };
        log_failure(
            self.host.assign_teams(std::slice::from_ref(&directive)).await,
            self.context.sequence_id,
        );
        debug!("[{}] Player {} assigned to team {}", self.tag(), nickname, team.index());
    }

    async fn enter_time_attack(&mut self) {
        match self.host.current_map_author_time().await {
            Ok(author_time) => {
                let limit = qualification_time_limit(
                    author_time,
                    self.config.ta_base_time,
                    self.config.ta_time_divider,
                );
                let mut settings = ModeSettings::new();
                settings.insert(TIME_LIMIT_SETTING.to_string(), limit.into());
                log_failure(self.host.update_mode_settings(settings).await, self.context.sequence_id);
                debug!("[{}] Set map duration to {} seconds.", self.tag(), limit);
            }
            Err(e) => warn!("[{}] Time limit not set: {}", self.tag(), e),
        }
        let result = self.host.chat(&self.config.ta_message, None).await;
        log_failure(result, self.context.sequence_id);
        self.context.phase = Phase::TimeAttack;
        debug!("[{}] Match start: phase now {}", self.tag(), self.context.phase);
    }

    async fn enter_teams_prematch(&mut self, players: &[ScoreEntry]) {
        self.context.ranked = capture_ranked_results(players);
        self.context.teams = TeamAssignment::default();
        let result = self.host.set_next_script(&self.config.teams_script).await;
        log_failure(result, self.context.sequence_id);
        self.context.phase = Phase::TeamsPrematch;
        debug!(
            "[{}] Stored {} player times, phase now {}.",
            self.tag(),
            self.context.ranked.len(),
            self.context.phase
        );
    }

    async fn enter_teams_rounds(&mut self) {
        self.rebalance().await;
        let result = self.host.chat(&self.config.teams_message, None).await;
        log_failure(result, self.context.sequence_id);
        self.context.phase = Phase::TeamsRounds;
        debug!("[{}] Match start: phase now {}", self.tag(), self.context.phase);
    }

    async fn build_teams(&self) -> Result<TeamAssignment, HostError> {
        let online = self.host.online_players().await?;
        Ok(balance_teams(&self.context.ranked, &playing_logins(&online)))
    }

    /// Push the whole assignment as one grouped call.
    async fn apply_teams(&mut self) {
        let directives = self.context.teams.directives();
        if directives.is_empty() {
            return;
        }
        log_failure(self.host.assign_teams(&directives).await, self.context.sequence_id);
    }
}
