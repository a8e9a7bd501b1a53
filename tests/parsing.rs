use std::fs;
use std::path::PathBuf;

use euro24_terminal::loader::{DataSource, load_tournament, parse_tournament_json};
use euro24_terminal::state::{LoadOutcome, sum_goals};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

#[test]
fn parses_tournament_fixture() {
    let data = parse_tournament_json(&read_fixture("tournament.json")).expect("fixture should parse");
    assert_eq!(data.title, "Fixture Cup");
    assert_eq!(data.games.len(), 2);
    assert_eq!(data.games[0].id, 10);
    assert_eq!(data.games[0].home.name, "Poland");
    assert_eq!(data.games[0].away.score, 2);
    assert_eq!(sum_goals(&data.games), 3);
}

#[test]
fn missing_scores_default_to_zero() {
    let data = parse_tournament_json(&read_fixture("tournament.json")).unwrap();
    let second = &data.games[1];
    assert_eq!(second.home.score, 0);
    assert_eq!(second.away.score, 0);
    assert!(!second.active);
}

#[test]
fn bundled_tournament_is_valid() {
    let data = load_tournament(&DataSource::Bundled).expect("bundled data should load");
    assert_eq!(data.title, "Euro 2024");
    assert!(!data.games.is_empty());
    assert_eq!(sum_goals(&data.games), 0);
}

#[test]
fn file_source_reads_from_disk() {
    let data = load_tournament(&DataSource::File(fixture_path("tournament.json"))).unwrap();
    match data.into_outcome() {
        LoadOutcome::Loaded { title, matches } => {
            assert_eq!(title, "Fixture Cup");
            assert_eq!(matches.len(), 2);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn missing_file_is_an_error() {
    let err = load_tournament(&DataSource::File(fixture_path("does_not_exist.json")))
        .unwrap_err();
    assert!(format!("{err:#}").contains("does_not_exist.json"));
}

#[test]
fn null_or_empty_payload_is_an_error() {
    assert!(parse_tournament_json("null").is_err());
    assert!(parse_tournament_json("   ").is_err());
}

#[test]
fn rejects_duplicate_ids() {
    let raw = r#"{
        "title": "Dupes",
        "games": [
            { "id": 1, "home": { "name": "A", "odds": 0.5 }, "away": { "name": "B", "odds": 0.5 } },
            { "id": 1, "home": { "name": "C", "odds": 0.5 }, "away": { "name": "D", "odds": 0.5 } }
        ]
    }"#;
    let err = parse_tournament_json(raw).unwrap_err();
    assert!(err.to_string().contains("duplicate match id 1"));
}

#[test]
fn rejects_odds_outside_unit_interval() {
    let raw = r#"{
        "title": "Odd",
        "games": [
            { "id": 1, "home": { "name": "A", "odds": 1.5 }, "away": { "name": "B", "odds": 0.5 } }
        ]
    }"#;
    assert!(parse_tournament_json(raw).is_err());
}

#[test]
fn title_without_games_is_an_empty_tournament() {
    let data = parse_tournament_json(r#"{ "title": "Quiet Cup" }"#).unwrap();
    assert!(data.games.is_empty());
}
