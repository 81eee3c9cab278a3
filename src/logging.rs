use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

const LOG_ENV: &str = "CRICKET_LOG";
const DEFAULT_FILTER: &str = "info";

fn builder() -> Builder {
    Builder::from_env(Env::default().filter_or(LOG_ENV, DEFAULT_FILTER))
}

/// Logs to stderr; used by the command line tools.
pub fn init_stderr() {
    let _ = builder().target(Target::Stderr).try_init();
}

/// Appends log output to `path`; the terminal UI owns stdout/stderr.
pub fn init_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    builder()
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("install logger")?;
    Ok(())
}
