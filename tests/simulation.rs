use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;

use euro24_terminal::simulation::{GoalDice, RngDice, Venue, simulate_goal};
use euro24_terminal::state::{Match, Side, sum_goals};

/// Replays fixed picks and rolls.
struct ScriptedDice {
    picks: VecDeque<usize>,
    rolls: VecDeque<f64>,
}

impl ScriptedDice {
    fn new(picks: &[usize], rolls: &[f64]) -> Self {
        Self {
            picks: picks.iter().copied().collect(),
            rolls: rolls.iter().copied().collect(),
        }
    }
}

impl GoalDice for ScriptedDice {
    fn pick(&mut self, _len: usize) -> usize {
        self.picks.pop_front().expect("script ran out of picks")
    }

    fn roll(&mut self) -> f64 {
        self.rolls.pop_front().expect("script ran out of rolls")
    }
}

fn fixture(id: u32, home: &str, away: &str, home_odds: f64) -> Match {
    Match {
        id,
        home: Side {
            name: home.to_string(),
            odds: home_odds,
            score: 0,
        },
        away: Side {
            name: away.to_string(),
            odds: 1.0 - home_odds,
            score: 0,
        },
        active: false,
    }
}

fn fixtures() -> Vec<Match> {
    // Ids deliberately do not follow positions.
    vec![
        fixture(7, "Poland", "Spain", 0.3),
        fixture(3, "Germany", "France", 0.6),
        fixture(12, "England", "Denmark", 0.5),
    ]
}

#[test]
fn empty_match_list_is_a_no_op() {
    let mut dice = ScriptedDice::new(&[], &[]);
    let tick = simulate_goal(&[], 42_000, 5, 10_000, &mut dice);
    assert!(tick.matches.is_empty());
    assert_eq!(tick.total_goals, 5);
    assert_eq!(tick.time_remaining_ms, 42_000);
    assert!(tick.scorer.is_none());
}

#[test]
fn roll_at_or_below_home_odds_scores_for_home() {
    let matches = fixtures();
    let mut dice = ScriptedDice::new(&[1, 1], &[0.6, 0.61]);

    let first = simulate_goal(&matches, 90_000, 0, 10_000, &mut dice);
    let scorer = first.scorer.clone().unwrap();
    assert_eq!(scorer.venue, Venue::Home);
    assert_eq!(scorer.team, "Germany");
    assert_eq!(first.matches[1].home.score, 1);

    let second = simulate_goal(&first.matches, first.time_remaining_ms, 1, 10_000, &mut dice);
    let scorer = second.scorer.unwrap();
    assert_eq!(scorer.venue, Venue::Away);
    assert_eq!(scorer.team, "France");
    assert_eq!(second.matches[1].away.score, 1);
    assert_eq!(second.time_remaining_ms, 70_000);
}

#[test]
fn drawn_position_is_the_match_that_scores() {
    let matches = fixtures();
    let mut dice = ScriptedDice::new(&[2], &[0.1]);
    let tick = simulate_goal(&matches, 90_000, 0, 10_000, &mut dice);

    let scorer = tick.scorer.unwrap();
    assert_eq!(scorer.match_id, 12);
    assert_eq!(tick.matches[2].home.score, 1);
    assert!(tick.matches[2].active);
    for (idx, m) in tick.matches.iter().enumerate() {
        if idx != 2 {
            assert_eq!(m.goals(), 0);
            assert!(!m.active);
        }
    }
}

#[test]
fn only_the_latest_scorer_is_active() {
    let matches = fixtures();
    let mut dice = ScriptedDice::new(&[0, 2], &[0.0, 0.99]);
    let first = simulate_goal(&matches, 90_000, 0, 10_000, &mut dice);
    let second = simulate_goal(&first.matches, first.time_remaining_ms, 1, 10_000, &mut dice);

    let active: Vec<u32> = second
        .matches
        .iter()
        .filter(|m| m.active)
        .map(|m| m.id)
        .collect();
    assert_eq!(active, vec![12]);
    assert_eq!(second.matches[0].home.score, 1);
}

#[test]
fn clock_never_goes_below_zero() {
    let matches = fixtures();
    let mut dice = ScriptedDice::new(&[0], &[0.5]);
    let tick = simulate_goal(&matches, 4_000, 8, 10_000, &mut dice);
    assert_eq!(tick.time_remaining_ms, 0);
    assert_eq!(tick.total_goals, 9);
}

#[test]
fn seeded_run_keeps_goal_tally_consistent() {
    let mut dice = RngDice(StdRng::seed_from_u64(2024));
    let mut matches = fixtures();
    let mut total = 0;
    let mut time = 90_000;

    for _ in 0..50 {
        let tick = simulate_goal(&matches, time, total, 3_000, &mut dice);
        assert!(tick.time_remaining_ms <= time);
        matches = tick.matches;
        total = tick.total_goals;
        time = tick.time_remaining_ms;
        assert_eq!(total, sum_goals(&matches));
    }
    assert_eq!(total, 50);
    assert_eq!(time, 0);
}

#[test]
fn same_seed_gives_same_scores() {
    let run = |seed| {
        let mut dice = RngDice(StdRng::seed_from_u64(seed));
        let mut matches = fixtures();
        for goals in 0..20 {
            matches = simulate_goal(&matches, 90_000, goals, 0, &mut dice).matches;
        }
        matches
    };
    assert_eq!(run(9), run(9));
}
