use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use euro24_terminal::config::game_secs_to_ms;
use euro24_terminal::logging;
use euro24_terminal::replay::{self, parse_event_log};
use euro24_terminal::state::{DEFAULT_MATCH_LENGTH_MS, TournamentState};

fn main() -> Result<()> {
    logging::init_stderr();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(path) = positional_arg(&args) else {
        bail!("usage: replay <events.json> [--length-secs N]");
    };
    let length_ms = parse_length_arg(&args)?
        .map(game_secs_to_ms)
        .unwrap_or(DEFAULT_MATCH_LENGTH_MS);

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    let actions = parse_event_log(&raw)?;
    let count = actions.len();
    let state = replay::replay(TournamentState::new(length_ms), actions)?;

    log::info!("replayed {count} events from {}", path.display());
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn positional_arg(args: &[String]) -> Option<PathBuf> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--length-secs" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn parse_length_arg(args: &[String]) -> Result<Option<u64>> {
    for (idx, arg) in args.iter().enumerate() {
        let value = if let Some(raw) = arg.strip_prefix("--length-secs=") {
            raw
        } else if arg == "--length-secs" {
            let Some(next) = args.get(idx + 1) else {
                bail!("--length-secs needs a value");
            };
            next.as_str()
        } else {
            continue;
        };
        let secs = value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid --length-secs value `{value}`"))?;
        return Ok(Some(secs));
    }
    Ok(None)
}
