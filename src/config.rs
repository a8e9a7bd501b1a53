use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::loader::DataSource;

/// Longest match or tick the simulator accepts, in seconds of game time.
pub const MAX_GAME_SECS: u64 = 86_400;

/// Game seconds to milliseconds, clamped to `1..=MAX_GAME_SECS`.
pub fn game_secs_to_ms(secs: u64) -> u64 {
    secs.clamp(1, MAX_GAME_SECS).saturating_mul(1000)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub source: DataSource,
    pub match_length_ms: u64,
    /// Game time consumed by one tick.
    pub tick_ms: u64,
    /// Wall-clock time between ticks.
    pub tick_interval: Duration,
    pub full_time_timer: bool,
    pub reload_on_restart: bool,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Bundled,
            match_length_ms: 90_000,
            tick_ms: 10_000,
            tick_interval: Duration::from_millis(1000),
            full_time_timer: true,
            reload_on_restart: true,
            seed: None,
            log_file: None,
        }
    }
}

impl SimConfig {
    /// Reads `.env.local`, `.env`, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |key: &str| {
            lookup(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };
        let num = |key: &str| opt(key).and_then(|val| val.parse::<u64>().ok());
        let flag = |key: &str, default: bool| {
            opt(key)
                .and_then(|val| parse_flag(&val))
                .unwrap_or(default)
        };

        let source = if let Some(url) = opt("TOURNAMENT_URL") {
            DataSource::Http(url)
        } else if let Some(path) = opt("TOURNAMENT_FILE") {
            DataSource::File(PathBuf::from(path))
        } else {
            DataSource::Bundled
        };

        let tick_interval_ms = num("TICK_INTERVAL_MS").unwrap_or(1000).clamp(100, 60_000);

        Self {
            source,
            match_length_ms: game_secs_to_ms(num("MATCH_LENGTH_SECS").unwrap_or(90)),
            tick_ms: game_secs_to_ms(num("TICK_SECS").unwrap_or(10)),
            tick_interval: Duration::from_millis(tick_interval_ms),
            full_time_timer: flag("FULL_TIME_TIMER", true),
            reload_on_restart: flag("RELOAD_ON_RESTART", true),
            seed: num("SIM_SEED"),
            log_file: opt("EURO24_LOG_FILE").map(PathBuf::from),
        }
    }

    /// Ticks needed to run `remaining_ms` down to zero.
    pub fn ticks_for(&self, remaining_ms: u64) -> u64 {
        remaining_ms.div_ceil(self.tick_ms.max(1))
    }

    /// Wall-clock budget for the full-time timer. Half an interval of slack
    /// lets the final tick land first when both timers are running.
    pub fn full_time_after(&self, remaining_ms: u64) -> Option<Duration> {
        if !self.full_time_timer {
            return None;
        }
        let ticks = u32::try_from(self.ticks_for(remaining_ms)).unwrap_or(u32::MAX);
        Some(self.tick_interval.saturating_mul(ticks) + self.tick_interval / 2)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
