//! Match sequence logic: ranking, team balancing, time limits, and the phase state machine.

mod balance;
mod ranking;
mod sequence;
mod time_limit;

pub use balance::{balance_teams, playing_logins};
pub use ranking::{capture_ranked_results, info_listing, results_csv, roster_line, roster_names};
pub use sequence::{MatchController, TeamRosters};
pub use time_limit::{qualification_time_limit, TA_BASE_TIME, TA_TIME_DIVIDER, TIME_LIMIT_SETTING};
