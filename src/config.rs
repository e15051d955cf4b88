//! Settings read from the environment at startup.

use crate::logic::{TA_BASE_TIME, TA_TIME_DIVIDER};

pub const TIME_ATTACK_SCRIPT: &str = "Trackmania/TM_TimeAttack_Online.Script.txt";
pub const TEAMS_SCRIPT: &str = "Modes/Trackmania/TM_Teams_Online_WinBonus.Script.txt";
pub const TA_MESSAGE: &str = "$0f0$iIncomincia la fase di Time Attack. GLHF.";
pub const TEAMS_MESSAGE: &str = "$0f0$iIncomincia la gara a squadre. GLHF.";

/// Mode scripts, messages, and the qualification time-limit parameters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SequencerConfig {
    pub time_attack_script: String,
    pub teams_script: String,
    /// Base seconds to play on a time attack map.
    pub ta_base_time: u32,
    /// Extra minutes are author time (s) / divider.
    pub ta_time_divider: u32,
    pub ta_message: String,
    pub teams_message: String,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            time_attack_script: TIME_ATTACK_SCRIPT.to_string(),
            teams_script: TEAMS_SCRIPT.to_string(),
            ta_base_time: TA_BASE_TIME,
            ta_time_divider: TA_TIME_DIVIDER,
            ta_message: TA_MESSAGE.to_string(),
            teams_message: TEAMS_MESSAGE.to_string(),
        }
    }
}

impl SequencerConfig {
    /// Defaults overridden by `TMIT_*` variables. Unparseable numbers (and a zero divider)
    /// fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, default: u32| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        Self {
            time_attack_script: lookup("TMIT_TA_SCRIPT").unwrap_or(defaults.time_attack_script),
            teams_script: lookup("TMIT_TEAMS_SCRIPT").unwrap_or(defaults.teams_script),
            ta_base_time: number("TMIT_TA_BASE_TIME", defaults.ta_base_time),
            ta_time_divider: number("TMIT_TA_TIME_DIVIDER", defaults.ta_time_divider),
            ta_message: lookup("TMIT_TA_MESSAGE").unwrap_or(defaults.ta_message),
            teams_message: lookup("TMIT_TEAMS_MESSAGE").unwrap_or(defaults.teams_message),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Where the HTTP adapter listens. `HOST` and `PORT` override the defaults.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Queue replay-save requests for a replay module on the game server (`TMIT_REPLAYS=1`).
    pub replay_module: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let replay_module = std::env::var("TMIT_REPLAYS")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self {
            host,
            port,
            replay_module,
        }
    }
}
