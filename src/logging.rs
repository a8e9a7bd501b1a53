use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or("info"))
}

pub fn init_stderr() {
    let _ = builder().target(Target::Stderr).try_init();
}

/// Appends log records to `path`. The terminal UI owns stdout and stderr,
/// so this is the only sink it uses.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed opening log file {}", path.display()))?;
    builder()
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("logger already initialised")
}
