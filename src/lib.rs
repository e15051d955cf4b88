//! Time attack into balanced teams: library with models, host interface, and sequencing logic.

pub mod config;
pub mod host;
pub mod logic;
pub mod models;

pub use config::{SequencerConfig, ServerConfig};
pub use host::{Host, HostCall, HostError, ModeSettings, OnlinePlayer, OutboxEntry, OutboxHost};
pub use logic::{
    balance_teams, capture_ranked_results, info_listing, playing_logins, qualification_time_limit,
    results_csv, roster_line, roster_names, MatchController, TeamRosters, TA_BASE_TIME,
    TA_TIME_DIVIDER, TIME_LIMIT_SETTING,
};
pub use models::{
    Command, MatchContext, MatchError, MatchEvent, Phase, PlayerId, PlayerResult, RankedPlayers,
    ScoreEntry, TeamAssignment, TeamColor, TeamDirective, COMMAND_NAMESPACE, END_MAP_SECTION,
    RESET_TAG,
};
