use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MATCH_LENGTH_MS: u64 = 90_000;
pub const DEFAULT_TITLE: &str = "Tournament";

pub const LABEL_START: &str = "Start game";
pub const LABEL_FINISH: &str = "Finish";
pub const LABEL_RESTART: &str = "Restart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    BeforeStart,
    Ongoing,
    Stopped,
    Finished,
}

impl GameStatus {
    /// Label of the single control button for this status.
    pub fn button_label(self) -> &'static str {
        match self {
            GameStatus::BeforeStart => LABEL_START,
            GameStatus::Ongoing => LABEL_FINISH,
            GameStatus::Stopped | GameStatus::Finished => LABEL_RESTART,
        }
    }

    /// Event emitted when the control button is pressed in this status.
    pub fn control_event(self) -> GameEvent {
        match self {
            GameStatus::BeforeStart => GameEvent::StartGame,
            GameStatus::Ongoing => GameEvent::StopGame,
            GameStatus::Stopped | GameStatus::Finished => GameEvent::RestartGame,
        }
    }

    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Stopped | GameStatus::Finished)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameStatus::BeforeStart => "before start",
            GameStatus::Ongoing => "ongoing",
            GameStatus::Stopped => "stopped",
            GameStatus::Finished => "finished",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Side {
    pub name: String,
    /// Probability threshold for this side scoring when its match is drawn.
    pub odds: f64,
    #[serde(default)]
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: u32,
    pub home: Side,
    pub away: Side,
    #[serde(default)]
    pub active: bool,
}

impl Match {
    pub fn goals(&self) -> u32 {
        self.home.score + self.away.score
    }

    pub fn scoreline(&self) -> String {
        format!("{} : {}", self.home.score, self.away.score)
    }

    pub fn reset_score(&mut self) {
        self.home.score = 0;
        self.away.score = 0;
        self.active = false;
    }
}

pub fn sum_goals(matches: &[Match]) -> u32 {
    matches.iter().map(Match::goals).sum()
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { title: String, matches: Vec<Match> },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LoadData(LoadOutcome),
    StartGame,
    StopGame,
    RestartGame,
    FinishGame,
    ScoreGoal {
        matches: Vec<Match>,
        total_goals: u32,
        time_remaining_ms: u64,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::LoadData(_) => "LOAD_DATA",
            GameEvent::StartGame => "START_GAME",
            GameEvent::StopGame => "STOP_GAME",
            GameEvent::RestartGame => "RESTART_GAME",
            GameEvent::FinishGame => "FINISH_GAME",
            GameEvent::ScoreGoal { .. } => "SCORE_GOAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{event} is not accepted while the game is {status}")]
    NotAccepted {
        event: &'static str,
        status: GameStatus,
    },
    #[error("SCORE_GOAL must move the clock forward, got {from_ms}ms -> {to_ms}ms")]
    ClockNotAdvancing { from_ms: u64, to_ms: u64 },
    #[error("SCORE_GOAL total of {got} goals disagrees with match scores summing to {expected}")]
    TallyMismatch { expected: u32, got: u32 },
    #[error("START_GAME waits for the tournament data to load")]
    LoadPending,
    #[error("unknown event type `{0}`")]
    UnknownEvent(String),
    #[error("{event} is missing `{field}`")]
    MissingPayload {
        event: &'static str,
        field: &'static str,
    },
    #[error("{event} has invalid `{field}` value `{value}`")]
    InvalidPayload {
        event: &'static str,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentState {
    pub title: String,
    pub matches: Vec<Match>,
    pub button_label: &'static str,
    pub status: GameStatus,
    pub time_remaining_ms: u64,
    pub match_length_ms: u64,
    pub total_goals: u32,
    pub load_error: bool,
}

impl Default for TournamentState {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_LENGTH_MS)
    }
}

impl TournamentState {
    pub fn new(match_length_ms: u64) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            matches: Vec::new(),
            button_label: GameStatus::BeforeStart.button_label(),
            status: GameStatus::BeforeStart,
            time_remaining_ms: match_length_ms,
            match_length_ms,
            total_goals: 0,
            load_error: false,
        }
    }

    pub fn active_match(&self) -> Option<&Match> {
        self.matches.iter().find(|m| m.active)
    }

    pub fn clock_label(&self) -> String {
        format_clock(self.time_remaining_ms)
    }

    fn with_status(mut self, status: GameStatus) -> Self {
        self.status = status;
        self.button_label = status.button_label();
        self
    }
}

/// Computes the state that follows `event`. The input is never modified; a
/// rejected event leaves the caller holding the previous state.
pub fn reduce(
    state: &TournamentState,
    event: GameEvent,
) -> Result<TournamentState, TransitionError> {
    let status = state.status;
    let reject = |event: &'static str| TransitionError::NotAccepted { event, status };

    match event {
        GameEvent::LoadData(LoadOutcome::Loaded { title, matches }) => {
            let mut next = state.clone();
            next.total_goals = sum_goals(&matches);
            next.title = title;
            next.matches = matches;
            next.load_error = false;
            Ok(next)
        }
        GameEvent::LoadData(LoadOutcome::Failed { .. }) => {
            let mut next = state.clone();
            next.load_error = true;
            Ok(next)
        }
        GameEvent::StartGame => match status {
            GameStatus::BeforeStart => Ok(state.clone().with_status(GameStatus::Ongoing)),
            _ => Err(reject("START_GAME")),
        },
        GameEvent::StopGame => match status {
            GameStatus::Ongoing => Ok(state.clone().with_status(GameStatus::Stopped)),
            _ => Err(reject("STOP_GAME")),
        },
        GameEvent::FinishGame => match status {
            GameStatus::Ongoing => Ok(state.clone().with_status(GameStatus::Finished)),
            _ => Err(reject("FINISH_GAME")),
        },
        GameEvent::RestartGame => {
            if !status.is_over() {
                return Err(reject("RESTART_GAME"));
            }
            let mut next = state.clone().with_status(GameStatus::BeforeStart);
            for m in &mut next.matches {
                m.reset_score();
            }
            next.total_goals = 0;
            next.time_remaining_ms = next.match_length_ms;
            Ok(next)
        }
        GameEvent::ScoreGoal {
            matches,
            total_goals,
            time_remaining_ms,
        } => {
            if status != GameStatus::Ongoing {
                return Err(reject("SCORE_GOAL"));
            }
            // Covers time already at zero: nothing can be below it.
            if time_remaining_ms >= state.time_remaining_ms {
                return Err(TransitionError::ClockNotAdvancing {
                    from_ms: state.time_remaining_ms,
                    to_ms: time_remaining_ms,
                });
            }
            let expected = sum_goals(&matches);
            if total_goals != expected {
                return Err(TransitionError::TallyMismatch {
                    expected,
                    got: total_goals,
                });
            }
            let mut next = state.clone();
            next.matches = matches;
            next.total_goals = total_goals;
            next.time_remaining_ms = time_remaining_ms;
            Ok(next)
        }
    }
}

/// Formats remaining time as `mm:ss`, rounding partial seconds up so the
/// clock only shows `00:00` once time has fully run out.
pub fn format_clock(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_clock_rounds_up_partial_seconds() {
        assert_eq!(format_clock(600_000), "10:00");
        assert_eq!(format_clock(90_000), "01:30");
        assert_eq!(format_clock(1), "00:01");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn control_event_matches_label() {
        assert_eq!(GameStatus::BeforeStart.control_event(), GameEvent::StartGame);
        assert_eq!(GameStatus::Ongoing.control_event(), GameEvent::StopGame);
        assert_eq!(GameStatus::Stopped.control_event(), GameEvent::RestartGame);
        assert_eq!(GameStatus::Finished.control_event(), GameEvent::RestartGame);
    }
}
