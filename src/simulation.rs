use rand::Rng;

use crate::state::{GameEvent, Match};

/// Source of randomness for goal simulation.
pub trait GoalDice {
    /// Uniform index in `0..len`. Only called with `len > 0`.
    fn pick(&mut self, len: usize) -> usize;
    /// Uniform value in `[0, 1)`.
    fn roll(&mut self) -> f64;
}

/// Adapts any `rand` generator into a [`GoalDice`].
#[derive(Debug, Clone)]
pub struct RngDice<R>(pub R);

impl<R: Rng> GoalDice for RngDice<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    fn roll(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalScorer {
    pub match_id: u32,
    pub venue: Venue,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalTick {
    pub matches: Vec<Match>,
    pub total_goals: u32,
    pub time_remaining_ms: u64,
    /// `None` when there was nothing to score in.
    pub scorer: Option<GoalScorer>,
}

impl GoalTick {
    pub fn into_event(self) -> GameEvent {
        GameEvent::ScoreGoal {
            matches: self.matches,
            total_goals: self.total_goals,
            time_remaining_ms: self.time_remaining_ms,
        }
    }
}

/// Awards one goal in one randomly drawn match and advances the clock by
/// `tick_ms`. The drawn position is the match that scores; ids are only
/// reported back, never used for lookup.
pub fn simulate_goal<D: GoalDice + ?Sized>(
    matches: &[Match],
    time_remaining_ms: u64,
    total_goals: u32,
    tick_ms: u64,
    dice: &mut D,
) -> GoalTick {
    if matches.is_empty() {
        return GoalTick {
            matches: Vec::new(),
            total_goals,
            time_remaining_ms,
            scorer: None,
        };
    }

    let idx = dice.pick(matches.len()).min(matches.len() - 1);
    let roll = dice.roll();

    let mut updated = matches.to_vec();
    for m in &mut updated {
        m.active = false;
    }
    let chosen = &mut updated[idx];
    chosen.active = true;
    let (venue, side) = if roll <= chosen.home.odds {
        (Venue::Home, &mut chosen.home)
    } else {
        (Venue::Away, &mut chosen.away)
    };
    side.score += 1;
    let scorer = GoalScorer {
        match_id: chosen.id,
        venue,
        team: side.name.clone(),
    };

    GoalTick {
        matches: updated,
        total_goals: total_goals + 1,
        time_remaining_ms: time_remaining_ms.saturating_sub(tick_ms),
        scorer: Some(scorer),
    }
}
