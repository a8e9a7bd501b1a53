use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use crate::loader::{self, DataSource, TournamentData};

const SLEEP_SLICE: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub enum FeedMsg {
    Loaded {
        generation: u64,
        result: Result<TournamentData, String>,
    },
    Tick {
        session: u64,
    },
    FullTime {
        session: u64,
    },
}

/// Shared flag telling a session's timers to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPlan {
    pub tick_interval: Duration,
    pub full_time_after: Option<Duration>,
}

pub trait Scheduler {
    fn schedule_load(&mut self, generation: u64, source: DataSource);
    fn schedule_clock(&mut self, session: u64, plan: ClockPlan, token: CancelToken);
}

/// Runs loads and timers on background threads that post into `tx`.
pub struct ThreadScheduler {
    tx: Sender<FeedMsg>,
}

impl ThreadScheduler {
    pub fn new(tx: Sender<FeedMsg>) -> Self {
        Self { tx }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_load(&mut self, generation: u64, source: DataSource) {
        spawn_loader(self.tx.clone(), source, generation);
    }

    fn schedule_clock(&mut self, session: u64, plan: ClockPlan, token: CancelToken) {
        spawn_ticker(self.tx.clone(), plan.tick_interval, session, token.clone());
        if let Some(after) = plan.full_time_after {
            spawn_full_time(self.tx.clone(), after, session, token);
        }
    }
}

pub fn spawn_loader(tx: Sender<FeedMsg>, source: DataSource, generation: u64) {
    thread::spawn(move || {
        log::debug!("loading tournament from {source} (generation {generation})");
        let result = loader::load_tournament(&source).map_err(|err| format!("{err:#}"));
        let _ = tx.send(FeedMsg::Loaded { generation, result });
    });
}

pub fn spawn_ticker(tx: Sender<FeedMsg>, interval: Duration, session: u64, token: CancelToken) {
    thread::spawn(move || {
        loop {
            if !sleep_unless_cancelled(interval, &token) {
                break;
            }
            if tx.send(FeedMsg::Tick { session }).is_err() {
                break;
            }
        }
        log::debug!("ticker for session {session} stopped");
    });
}

pub fn spawn_full_time(tx: Sender<FeedMsg>, after: Duration, session: u64, token: CancelToken) {
    thread::spawn(move || {
        if sleep_unless_cancelled(after, &token) {
            let _ = tx.send(FeedMsg::FullTime { session });
        }
    });
}

/// Returns `false` if the token was cancelled before `total` elapsed.
fn sleep_unless_cancelled(total: Duration, token: &CancelToken) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if token.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return !token.is_cancelled();
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
