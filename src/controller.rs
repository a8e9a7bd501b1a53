use std::collections::VecDeque;

use chrono::Local;

use crate::config::SimConfig;
use crate::feed::{CancelToken, ClockPlan, FeedMsg, Scheduler};
use crate::loader::TournamentData;
use crate::simulation::{GoalDice, simulate_goal};
use crate::state::{GameEvent, GameStatus, LoadOutcome, TournamentState, TransitionError, reduce};

const MAX_LOGS: usize = 200;

/// Sole owner of the tournament state. Every change goes through
/// [`reduce`]; timers and loads only ever reach the state through
/// [`GameController::handle`].
pub struct GameController<D, S> {
    state: TournamentState,
    config: SimConfig,
    dice: D,
    scheduler: S,
    session: u64,
    load_generation: u64,
    load_pending: bool,
    clock: Option<CancelToken>,
    warned_empty: bool,
    logs: VecDeque<String>,
}

impl<D: GoalDice, S: Scheduler> GameController<D, S> {
    pub fn new(config: SimConfig, dice: D, scheduler: S) -> Self {
        Self {
            state: TournamentState::new(config.match_length_ms),
            config,
            dice,
            scheduler,
            session: 0,
            load_generation: 0,
            load_pending: false,
            clock: None,
            warned_empty: false,
            logs: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &TournamentState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn logs(&self) -> &VecDeque<String> {
        &self.logs
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn load_generation(&self) -> u64 {
        self.load_generation
    }

    pub fn load_pending(&self) -> bool {
        self.load_pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Starts a new load; results of any earlier load are discarded on arrival.
    pub fn request_load(&mut self) {
        self.load_generation += 1;
        self.load_pending = true;
        self.push_log(format!("[INFO] Loading {}", self.config.source));
        self.scheduler
            .schedule_load(self.load_generation, self.config.source.clone());
    }

    pub fn press_button(&mut self) -> Result<(), TransitionError> {
        self.dispatch(self.state.status.control_event())
    }

    pub fn dispatch(&mut self, event: GameEvent) -> Result<(), TransitionError> {
        if self.load_pending && matches!(event, GameEvent::StartGame) {
            return Err(TransitionError::LoadPending);
        }
        let name = event.name();
        let next = reduce(&self.state, event)?;
        let previous = std::mem::replace(&mut self.state, next);
        log::debug!("{name}: {} -> {}", previous.status, self.state.status);
        if previous.status != self.state.status {
            self.on_status_change(previous.status);
        }
        Ok(())
    }

    pub fn handle(&mut self, msg: FeedMsg) {
        match msg {
            FeedMsg::Loaded { generation, result } => self.on_loaded(generation, result),
            FeedMsg::Tick { session } => self.on_tick(session),
            FeedMsg::FullTime { session } => self.on_full_time(session),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::info!("{msg}");
        self.logs
            .push_back(format!("{} {msg}", Local::now().format("%H:%M:%S")));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn on_status_change(&mut self, from: GameStatus) {
        let to = self.state.status;
        if from == GameStatus::Ongoing {
            self.cancel_clock();
        }
        match to {
            GameStatus::Ongoing => {
                self.push_log("[INFO] Kick-off");
                self.start_clock();
            }
            GameStatus::Stopped => self.push_log("[INFO] Game stopped"),
            GameStatus::Finished => self.push_log(format!(
                "[INFO] Full time, {} goals",
                self.state.total_goals
            )),
            GameStatus::BeforeStart => {
                self.push_log("[INFO] Game reset");
                if self.config.reload_on_restart {
                    self.request_load();
                }
            }
        }
    }

    fn start_clock(&mut self) {
        self.session += 1;
        self.warned_empty = false;
        let token = CancelToken::new();
        let plan = ClockPlan {
            tick_interval: self.config.tick_interval,
            full_time_after: self.config.full_time_after(self.state.time_remaining_ms),
        };
        self.clock = Some(token.clone());
        self.scheduler.schedule_clock(self.session, plan, token);
    }

    fn cancel_clock(&mut self) {
        if let Some(token) = self.clock.take() {
            token.cancel();
        }
    }

    fn clock_is_live(&self, session: u64) -> bool {
        session == self.session
            && self.state.status == GameStatus::Ongoing
            && self.clock.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn on_loaded(&mut self, generation: u64, result: Result<TournamentData, String>) {
        if generation != self.load_generation {
            log::debug!("dropping stale load result {generation}");
            return;
        }
        self.load_pending = false;
        if self.state.status == GameStatus::Ongoing {
            self.push_log("[WARN] Ignoring tournament data that arrived mid-game");
            return;
        }
        let outcome = match result {
            Ok(data) => {
                self.push_log(format!(
                    "[INFO] Loaded {} ({} matches)",
                    data.title,
                    data.games.len()
                ));
                data.into_outcome()
            }
            Err(reason) => {
                self.push_log(format!("[WARN] Load failed: {reason}"));
                LoadOutcome::Failed { reason }
            }
        };
        if let Err(err) = self.dispatch(GameEvent::LoadData(outcome)) {
            self.push_log(format!("[WARN] {err}"));
        }
    }

    fn on_tick(&mut self, session: u64) {
        if !self.clock_is_live(session) {
            log::debug!("ignoring tick for session {session}");
            return;
        }

        let tick = simulate_goal(
            &self.state.matches,
            self.state.time_remaining_ms,
            self.state.total_goals,
            self.config.tick_ms,
            &mut self.dice,
        );
        let Some(scorer) = tick.scorer.clone() else {
            if !self.warned_empty {
                self.warned_empty = true;
                self.push_log("[WARN] No matches loaded");
            }
            return;
        };
        if let Err(err) = self.dispatch(tick.into_event()) {
            self.push_log(format!("[WARN] {err}"));
            return;
        }

        if let Some(m) = self.state.matches.iter().find(|m| m.id == scorer.match_id) {
            let line = format!(
                "[GOAL] {} scores: {} {} {} ({})",
                scorer.team,
                m.home.name,
                m.scoreline(),
                m.away.name,
                self.state.clock_label()
            );
            self.push_log(line);
        }

        if self.state.time_remaining_ms == 0 {
            if let Err(err) = self.dispatch(GameEvent::FinishGame) {
                self.push_log(format!("[WARN] {err}"));
            }
        }
    }

    fn on_full_time(&mut self, session: u64) {
        if !self.clock_is_live(session) {
            return;
        }
        if let Err(err) = self.dispatch(GameEvent::FinishGame) {
            self.push_log(format!("[WARN] {err}"));
        }
    }
}

impl<D, S> Drop for GameController<D, S> {
    fn drop(&mut self) {
        if let Some(token) = self.clock.take() {
            token.cancel();
        }
    }
}
