//! Data structures for the match sequence: phases, qualification results, teams, events.

mod event;
mod match_context;
mod player;
mod teams;

pub use event::{Command, MatchEvent, ScoreEntry, COMMAND_NAMESPACE, END_MAP_SECTION};
pub use match_context::{MatchContext, MatchError, Phase};
pub use player::{PlayerId, PlayerResult, RankedPlayers};
pub use teams::{TeamAssignment, TeamColor, TeamDirective, RESET_TAG};
