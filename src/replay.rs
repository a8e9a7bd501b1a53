//! Folds a JSON event log through the reducer. Events use the action names
//! of the browser build (`START_GAME`, `SCORE_GOAL`, ...).

use serde::Deserialize;
use thiserror::Error;

use crate::state::{
    GameEvent, GameStatus, LoadOutcome, Match, TournamentState, TransitionError, reduce,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Match>>,
    #[serde(default)]
    pub matches: Option<Vec<Match>>,
    #[serde(default)]
    pub total_goals: Option<u32>,
    #[serde(default)]
    pub time_remaining: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid event log: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event #{index}: {source}")]
    Event {
        index: usize,
        #[source]
        source: TransitionError,
    },
}

impl TryFrom<RawAction> for GameEvent {
    type Error = TransitionError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "LOAD_DATA" => match raw.status.as_deref() {
                Some("success") => {
                    let matches = raw.data.ok_or(TransitionError::MissingPayload {
                        event: "LOAD_DATA",
                        field: "data",
                    })?;
                    Ok(GameEvent::LoadData(LoadOutcome::Loaded {
                        title: raw.title.unwrap_or_default(),
                        matches,
                    }))
                }
                Some("error") => Ok(GameEvent::LoadData(LoadOutcome::Failed {
                    reason: "error".to_string(),
                })),
                Some(other) => Err(TransitionError::InvalidPayload {
                    event: "LOAD_DATA",
                    field: "status",
                    value: other.to_string(),
                }),
                None => Err(TransitionError::MissingPayload {
                    event: "LOAD_DATA",
                    field: "status",
                }),
            },
            "START_GAME" => Ok(GameEvent::StartGame),
            "STOP_GAME" => Ok(GameEvent::StopGame),
            "RESTART_GAME" => Ok(GameEvent::RestartGame),
            "FINISH_GAME" => Ok(GameEvent::FinishGame),
            "SCORE_GOAL" => {
                let missing = |field: &'static str| TransitionError::MissingPayload {
                    event: "SCORE_GOAL",
                    field,
                };
                Ok(GameEvent::ScoreGoal {
                    matches: raw.matches.ok_or_else(|| missing("matches"))?,
                    total_goals: raw.total_goals.ok_or_else(|| missing("totalGoals"))?,
                    time_remaining_ms: raw
                        .time_remaining
                        .ok_or_else(|| missing("timeRemaining"))?,
                })
            }
            other => Err(TransitionError::UnknownEvent(other.to_string())),
        }
    }
}

pub fn parse_event_log(raw: &str) -> Result<Vec<RawAction>, ReplayError> {
    Ok(serde_json::from_str(raw)?)
}

/// Applies every action in order and stops at the first one that fails.
/// A goal that runs the clock out is followed by `FINISH_GAME`, as the live
/// ticker does.
pub fn replay(
    initial: TournamentState,
    actions: Vec<RawAction>,
) -> Result<TournamentState, ReplayError> {
    actions
        .into_iter()
        .enumerate()
        .try_fold(initial, |state, (index, raw)| {
            GameEvent::try_from(raw)
                .and_then(|event| reduce(&state, event))
                .and_then(|next| {
                    if next.status == GameStatus::Ongoing && next.time_remaining_ms == 0 {
                        reduce(&next, GameEvent::FinishGame)
                    } else {
                        Ok(next)
                    }
                })
                .map_err(|source| ReplayError::Event { index, source })
        })
}
