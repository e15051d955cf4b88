//! Integration tests for the match sequence: phase transitions, commands, and host failures.

use tmit_match_sequencer::{
    Command, Host, HostCall, HostError, MatchController, MatchError, MatchEvent, ModeSettings,
    OnlinePlayer, OutboxHost, Phase, ScoreEntry, SequencerConfig, TeamColor, TeamDirective,
    END_MAP_SECTION, TIME_LIMIT_SETTING,
};

const OPERATOR: &str = "admin";

fn score(login: &str, time: i64) -> ScoreEntry {
    ScoreEntry {
        login: login.to_string(),
        nickname: login.to_uppercase(),
        best_race_time: Some(time),
    }
}

fn end_map(players: Vec<ScoreEntry>) -> MatchEvent {
    MatchEvent::Scores {
        section: END_MAP_SECTION.to_string(),
        players,
    }
}

fn five_scores() -> Vec<ScoreEntry> {
    vec![
        score("p3", 12_000),
        score("p1", 10_000),
        score("p5", 14_000),
        score("p2", 11_000),
        score("p4", 13_000),
    ]
}

fn host_with_players(logins: &[&str]) -> OutboxHost {
    let mut host = OutboxHost::new();
    host.set_roster(logins.iter().map(|l| OnlinePlayer::playing(*l)).collect());
    host.set_author_time(90_000);
    host
}

fn controller(logins: &[&str]) -> MatchController<OutboxHost> {
    MatchController::new(host_with_players(logins), SequencerConfig::default())
}

fn logins(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn assign_calls(c: &MatchController<OutboxHost>) -> Vec<Vec<TeamDirective>> {
    c.host()
        .calls()
        .filter_map(|call| match call {
            HostCall::AssignTeams { directives } => Some(directives.clone()),
            _ => None,
        })
        .collect()
}

fn scripts(c: &MatchController<OutboxHost>) -> Vec<String> {
    c.host()
        .calls()
        .filter_map(|call| match call {
            HostCall::SetNextScript { script } => Some(script.clone()),
            _ => None,
        })
        .collect()
}

/// Drive a fresh controller to TeamsPrematch with the five standard scores.
async fn at_teams_prematch(c: &mut MatchController<OutboxHost>) {
    c.start().await;
    c.handle_event(MatchEvent::MatchStarted).await;
    c.handle_event(end_map(five_scores())).await;
    assert_eq!(c.phase(), Phase::TeamsPrematch);
}

#[tokio::test]
async fn starts_stopped_and_empty() {
    let c = controller(&[]);
    assert_eq!(c.phase(), Phase::Stopped);
    assert!(c.context().ranked.is_empty());
    assert!(c.context().teams.is_empty());
    assert_eq!(c.context().sequence_id, None);
}

#[tokio::test]
async fn start_requests_time_attack_and_restarts_map() {
    let mut c = controller(&[]);
    c.run_command(Command::Start, Some(OPERATOR)).await.unwrap();
    assert_eq!(c.phase(), Phase::Starting);
    assert!(c.context().sequence_id.is_some());
    let calls: Vec<_> = c.host().calls().cloned().collect();
    assert_eq!(
        calls,
        vec![
            HostCall::SetNextScript {
                script: SequencerConfig::default().time_attack_script
            },
            HostCall::RestartMap,
        ]
    );
}

#[tokio::test]
async fn replay_module_is_asked_to_save_before_restart() {
    let host = host_with_players(&[]).with_replay_module(true);
    let mut c = MatchController::new(host, SequencerConfig::default());
    c.start().await;
    let calls: Vec<_> = c.host().calls().cloned().collect();
    assert_eq!(calls[1], HostCall::SaveReplays);
    assert_eq!(calls[2], HostCall::RestartMap);
}

#[tokio::test]
async fn match_start_enters_time_attack_with_time_limit() {
    let mut c = controller(&[]);
    c.start().await;
    c.host_mut().drain();
    c.handle_event(MatchEvent::MatchStarted).await;
    assert_eq!(c.phase(), Phase::TimeAttack);

    let mut expected = ModeSettings::new();
    expected.insert(TIME_LIMIT_SETTING.to_string(), 1140.into());
    let calls: Vec<_> = c.host().calls().cloned().collect();
    assert_eq!(
        calls,
        vec![
            HostCall::UpdateModeSettings { settings: expected },
            HostCall::Chat {
                message: SequencerConfig::default().ta_message,
                target: None
            },
        ]
    );
}

#[tokio::test]
async fn match_start_while_stopped_does_nothing() {
    let mut c = controller(&[]);
    c.handle_event(MatchEvent::MatchStarted).await;
    assert_eq!(c.phase(), Phase::Stopped);
    assert_eq!(c.host().calls().count(), 0);
}

#[tokio::test]
async fn intermediate_scores_are_ignored() {
    let mut c = controller(&[]);
    c.start().await;
    c.handle_event(MatchEvent::MatchStarted).await;
    c.handle_event(MatchEvent::Scores {
        section: "Other".to_string(),
        players: five_scores(),
    })
    .await;
    assert_eq!(c.phase(), Phase::TimeAttack);
    assert!(c.context().ranked.is_empty());
}

#[tokio::test]
async fn end_of_time_attack_captures_ranking_and_requests_teams() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    let order: Vec<_> = c.context().ranked.iter().map(|p| p.login.clone()).collect();
    assert_eq!(order, logins(&["p1", "p2", "p3", "p4", "p5"]));
    assert_eq!(
        scripts(&c).last(),
        Some(&SequencerConfig::default().teams_script)
    );
    assert!(c.context().teams.is_empty());
    assert!(assign_calls(&c).is_empty());
}

#[tokio::test]
async fn teams_map_start_balances_and_assigns_once() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;

    assert_eq!(c.phase(), Phase::TeamsRounds);
    assert_eq!(c.context().teams.blue, logins(&["p1", "p4", "p5"]));
    assert_eq!(c.context().teams.red, logins(&["p2", "p3"]));

    let calls = assign_calls(&c);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 5);
    assert!(calls[0]
        .iter()
        .all(|d| c.context().teams.team_of(&d.login) == Some(d.team)));
    assert!(c.host().calls().any(|call| matches!(
        call,
        HostCall::Chat { message, target: None } if *message == SequencerConfig::default().teams_message
    )));
}

#[tokio::test]
async fn match_start_in_teams_rounds_does_not_reassign() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;
    c.handle_event(MatchEvent::MatchStarted).await;
    assert_eq!(c.phase(), Phase::TeamsRounds);
    assert_eq!(assign_calls(&c).len(), 1);
}

#[tokio::test]
async fn end_of_teams_map_stops_and_queues_time_attack() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;
    c.handle_event(end_map(Vec::new())).await;

    assert_eq!(c.phase(), Phase::Stopped);
    assert!(c.context().ranked.is_empty());
    assert!(c.context().teams.is_empty());
    assert_eq!(
        scripts(&c).last(),
        Some(&SequencerConfig::default().time_attack_script)
    );
}

#[tokio::test]
async fn end_of_map_while_starting_is_ignored() {
    let mut c = controller(&[]);
    c.start().await;
    c.handle_event(end_map(five_scores())).await;
    assert_eq!(c.phase(), Phase::Starting);
    assert!(c.context().ranked.is_empty());
}

#[tokio::test]
async fn start_during_teams_rounds_clears_everything() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;
    let first_id = c.context().sequence_id;

    c.run_command(Command::Start, Some(OPERATOR)).await.unwrap();
    assert_eq!(c.phase(), Phase::Starting);
    assert!(c.context().ranked.is_empty());
    assert!(c.context().teams.is_empty());
    assert_ne!(c.context().sequence_id, first_id);
}

#[tokio::test]
async fn gated_commands_are_refused_before_teams() {
    let mut c = controller(&["p1", "p2"]);
    c.start().await;
    c.handle_event(MatchEvent::MatchStarted).await;
    c.host_mut().drain();

    for command in [Command::Balance, Command::Teams] {
        let err = c.run_command(command, Some(OPERATOR)).await.unwrap_err();
        assert_eq!(err, MatchError::NotReady { phase: Phase::TimeAttack });
    }
    assert!(c.context().teams.is_empty());
    assert!(c.team_rosters().is_err());

    let calls: Vec<_> = c.host().calls().cloned().collect();
    let expected = HostCall::Chat {
        message: MatchError::NotReady { phase: Phase::TimeAttack }.to_string(),
        target: Some(OPERATOR.to_string()),
    };
    assert_eq!(calls, vec![expected.clone(), expected]);
    assert!(MatchError::NotReady { phase: Phase::TimeAttack }
        .to_string()
        .contains("TIME_ATTACK"));
}

#[tokio::test]
async fn balance_in_prematch_uses_current_roster() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.host_mut().set_roster(vec![
        OnlinePlayer::playing("p1"),
        OnlinePlayer::spectator("p2"),
        OnlinePlayer::playing("p3"),
        OnlinePlayer::playing("p4"),
    ]);

    let replies = c.run_command(Command::Balance, Some(OPERATOR)).await.unwrap();
    assert!(replies.is_empty());
    assert_eq!(c.phase(), Phase::TeamsPrematch);
    assert_eq!(c.context().teams.blue, logins(&["p1"]));
    assert_eq!(c.context().teams.red, logins(&["p3", "p4"]));
    assert_eq!(assign_calls(&c).len(), 1);
}

#[tokio::test]
async fn rebalance_after_a_player_leaves() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;

    c.host_mut().set_roster(
        ["p1", "p3", "p4", "p5"]
            .into_iter()
            .map(OnlinePlayer::playing)
            .collect(),
    );
    c.run_command(Command::Balance, Some(OPERATOR)).await.unwrap();
    assert_eq!(c.context().teams.blue, logins(&["p1", "p5"]));
    assert_eq!(c.context().teams.red, logins(&["p3", "p4"]));
    assert_eq!(assign_calls(&c).len(), 2);
    assert_eq!(c.phase(), Phase::TeamsRounds);
}

#[tokio::test]
async fn teams_command_prints_both_rosters() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;

    let replies = c.run_command(Command::Teams, Some(OPERATOR)).await.unwrap();
    assert_eq!(
        replies,
        vec!["$00fBlue$z: P1, P4, P5".to_string(), "$f00Red$z: P2, P3".to_string()]
    );
    let rosters = c.team_rosters().unwrap();
    assert_eq!(rosters.blue, logins(&["P1", "P4", "P5"]));
    assert_eq!(rosters.red, logins(&["P2", "P3"]));
}

#[tokio::test]
async fn info_reports_phase_and_listing() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    let replies = c.run_command(Command::Info, Some(OPERATOR)).await.unwrap();
    assert_eq!(replies, vec!["Match status: STOPPED.".to_string()]);

    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;
    let replies = c.run_command(Command::Info, None).await.unwrap();
    assert_eq!(replies[0], "Match status: TEAMS_ROUNDS.");
    assert!(replies[1].starts_with("Players:  0 $00fP1$z (10.000)  1 $f00P2$z (11.000)"));
}

#[tokio::test]
async fn end_command_aborts_from_any_phase() {
    let mut c = controller(&["p1", "p2"]);
    c.start().await;
    c.handle_event(MatchEvent::MatchStarted).await;
    let replies = c.run_command(Command::End, Some(OPERATOR)).await.unwrap();
    assert_eq!(replies, vec!["Match aborted.".to_string()]);
    assert_eq!(c.phase(), Phase::Stopped);
    assert!(c.host().calls().any(|call| matches!(
        call,
        HostCall::Chat { message, target: Some(t) } if message == "Match aborted." && t == OPERATOR
    )));

    // Later events don't resume the old sequence.
    c.handle_event(end_map(five_scores())).await;
    assert_eq!(c.phase(), Phase::Stopped);
    assert!(c.context().ranked.is_empty());
}

#[tokio::test]
async fn late_joiners_get_a_team() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::MatchStarted).await;
    c.host_mut().drain();

    // Known player returns to their team.
    c.handle_event(MatchEvent::PlayerEnterSlot {
        login: "p2".to_string(),
        nickname: "P2".to_string(),
        is_spectator: false,
    })
    .await;
    // Newcomer joins the smaller team (red, 2 vs 3).
    c.handle_event(MatchEvent::PlayerEnterSlot {
        login: "p6".to_string(),
        nickname: "P6".to_string(),
        is_spectator: false,
    })
    .await;
    // Teams are now 3 vs 3: the next newcomer goes blue.
    c.handle_event(MatchEvent::PlayerEnterSlot {
        login: "p7".to_string(),
        nickname: "P7".to_string(),
        is_spectator: false,
    })
    .await;
    // Spectators are left alone.
    c.handle_event(MatchEvent::PlayerEnterSlot {
        login: "spec".to_string(),
        nickname: "Spec".to_string(),
        is_spectator: true,
    })
    .await;

    let calls = assign_calls(&c);
    let single = |login: &str, team| vec![TeamDirective { login: login.to_string(), team }];
    assert_eq!(
        calls,
        vec![
            single("p2", TeamColor::Red),
            single("p6", TeamColor::Red),
            single("p7", TeamColor::Blue),
        ]
    );
    assert_eq!(c.context().teams.red, logins(&["p2", "p3", "p6"]));
    assert_eq!(c.context().teams.blue, logins(&["p1", "p4", "p5", "p7"]));
}

#[tokio::test]
async fn player_entering_outside_teams_rounds_is_ignored() {
    let mut c = controller(&["p1", "p2", "p3", "p4", "p5"]);
    at_teams_prematch(&mut c).await;
    c.handle_event(MatchEvent::PlayerEnterSlot {
        login: "p1".to_string(),
        nickname: "P1".to_string(),
        is_spectator: false,
    })
    .await;
    assert!(assign_calls(&c).is_empty());
    assert!(c.context().teams.is_empty());
}

#[test]
fn events_deserialize_from_bridge_json() {
    let event: MatchEvent = serde_json::from_str(
        r#"{"kind":"scores","section":"EndMap","players":[{"login":"a","nickname":"A","best_race_time":-1}]}"#,
    )
    .unwrap();
    assert!(event.is_end_of_map());
    let event: MatchEvent = serde_json::from_str(r#"{"kind":"match_started"}"#).unwrap();
    assert_eq!(event, MatchEvent::MatchStarted);
}

/// Host whose remote calls all fail except reading the roster.
#[derive(Default)]
struct BrokenHost {
    roster: Vec<OnlinePlayer>,
    attempts: Vec<&'static str>,
}

impl Host for BrokenHost {
    async fn set_next_script(&mut self, _script: &str) -> Result<(), HostError> {
        self.attempts.push("set_next_script");
        Err(HostError::new("set_next_script", "timeout"))
    }

    async fn restart_map(&mut self) -> Result<(), HostError> {
        self.attempts.push("restart_map");
        Err(HostError::new("restart_map", "timeout"))
    }

    async fn update_mode_settings(&mut self, _settings: ModeSettings) -> Result<(), HostError> {
        self.attempts.push("update_mode_settings");
        Err(HostError::new("update_mode_settings", "timeout"))
    }

    async fn assign_teams(&mut self, _directives: &[TeamDirective]) -> Result<(), HostError> {
        self.attempts.push("assign_teams");
        Err(HostError::new("assign_teams", "timeout"))
    }

    async fn chat(&mut self, _message: &str, _target: Option<&str>) -> Result<(), HostError> {
        self.attempts.push("chat");
        Err(HostError::new("chat", "timeout"))
    }

    async fn online_players(&self) -> Result<Vec<OnlinePlayer>, HostError> {
        Ok(self.roster.clone())
    }

    async fn current_map_author_time(&self) -> Result<u32, HostError> {
        Err(HostError::new("current_map_author_time", "no map"))
    }

    async fn on_qualification_restart(&mut self) -> Result<(), HostError> {
        self.attempts.push("on_qualification_restart");
        Err(HostError::new("on_qualification_restart", "replay module crashed"))
    }
}

#[tokio::test]
async fn host_failures_never_stall_the_sequence() {
    let host = BrokenHost {
        roster: ["p1", "p2", "p3"].into_iter().map(OnlinePlayer::playing).collect(),
        attempts: Vec::new(),
    };
    let mut c = MatchController::new(host, SequencerConfig::default());

    c.start().await;
    assert_eq!(c.phase(), Phase::Starting);
    assert_eq!(
        c.host().attempts,
        vec!["set_next_script", "on_qualification_restart", "restart_map"]
    );

    c.handle_event(MatchEvent::MatchStarted).await;
    assert_eq!(c.phase(), Phase::TimeAttack);

    c.handle_event(end_map(vec![score("p1", 1_000), score("p2", 2_000), score("p3", 3_000)]))
        .await;
    assert_eq!(c.phase(), Phase::TeamsPrematch);

    c.handle_event(MatchEvent::MatchStarted).await;
    assert_eq!(c.phase(), Phase::TeamsRounds);
    assert_eq!(c.context().teams.blue, logins(&["p1"]));
    assert_eq!(c.context().teams.red, logins(&["p2", "p3"]));
    assert_eq!(
        c.host().attempts.iter().filter(|a| **a == "assign_teams").count(),
        1
    );
}
