use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::http_client::http_client;
use crate::state::{LoadOutcome, Match, Side};

const BUNDLED_TOURNAMENT: &str = include_str!("../data/tournament.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Bundled,
    File(PathBuf),
    Http(String),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Bundled => f.write_str("bundled tournament"),
            DataSource::File(path) => write!(f, "file {}", path.display()),
            DataSource::Http(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentData {
    pub title: String,
    #[serde(default)]
    pub games: Vec<Match>,
}

impl TournamentData {
    pub fn into_outcome(self) -> LoadOutcome {
        LoadOutcome::Loaded {
            title: self.title,
            matches: self.games,
        }
    }
}

/// Single retrieval attempt; no retries.
pub fn load_tournament(source: &DataSource) -> Result<TournamentData> {
    match source {
        DataSource::Bundled => parse_tournament_json(BUNDLED_TOURNAMENT),
        DataSource::File(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading {}", path.display()))?;
            parse_tournament_json(&raw)
        }
        DataSource::Http(url) => fetch_tournament(url),
    }
}

pub fn fetch_tournament(url: &str) -> Result<TournamentData> {
    let client = http_client()?;
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        bail!("http {status}: {}", truncate(&body, 120));
    }
    parse_tournament_json(&body)
}

pub fn parse_tournament_json(raw: &str) -> Result<TournamentData> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        bail!("empty tournament payload");
    }

    let data: TournamentData =
        serde_json::from_str(trimmed).context("invalid tournament json")?;
    validate(&data)?;
    Ok(data)
}

fn validate(data: &TournamentData) -> Result<()> {
    let mut seen = HashSet::new();
    for game in &data.games {
        if !seen.insert(game.id) {
            bail!("duplicate match id {}", game.id);
        }
        check_odds(game.id, &game.home)?;
        check_odds(game.id, &game.away)?;
    }
    Ok(())
}

fn check_odds(id: u32, side: &Side) -> Result<()> {
    if !side.odds.is_finite() || !(0.0..=1.0).contains(&side.odds) {
        bail!("match {id}: odds for {} out of range: {}", side.name, side.odds);
    }
    Ok(())
}

fn truncate(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}
