use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};

use crate::config::AppConfig;
use crate::teams::Team;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Turns an image into recognised text lines, top to bottom.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<Vec<String>>;
}

/// Finds the first line naming two known teams.
///
/// A team counts as named when the lower-cased last word of its full name
/// occurs anywhere in the lower-cased line. The pair is reported in `teams`
/// order, not in the order the names appear on the line, and shared suffixes
/// ("Kings") match every team that ends with them.
pub fn resolve_teams_from_text<'a>(
    raw_text: &str,
    teams: &'a [Team],
) -> Option<(&'a Team, &'a Team)> {
    let suffixes = teams.iter().map(Team::suffix).collect::<Vec<_>>();
    for line in raw_text.lines() {
        let lowered = line.to_lowercase();
        let mut found = teams
            .iter()
            .zip(&suffixes)
            .filter(|(_, suffix)| lowered.contains(suffix.as_str()))
            .map(|(team, _)| team);
        let (Some(first), Some(second)) = (found.next(), found.next()) else {
            continue;
        };
        return Some((first, second));
    }
    None
}

/// Runs the `tesseract` command line tool, killing it if it overruns.
pub struct TesseractCli {
    binary: PathBuf,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.tesseract_bin.clone(), cfg.ocr_timeout)
    }

    fn wait_for_output(
        &self,
        mut child: Child,
        image: &Path,
        out_txt: &Path,
        err_log: &Path,
    ) -> Result<Vec<String>> {
        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait().context("wait for tesseract")? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(anyhow!(
                    "tesseract timed out after {}s on {}",
                    self.timeout.as_secs(),
                    image.display()
                ));
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            let diagnostics = fs::read_to_string(err_log).unwrap_or_default();
            let diagnostics = diagnostics.trim();
            if diagnostics.is_empty() {
                return Err(anyhow!("tesseract exited with {status} on {}", image.display()));
            }
            return Err(anyhow!(
                "tesseract exited with {status} on {}: {diagnostics}",
                image.display()
            ));
        }

        let text = fs::read_to_string(out_txt)
            .with_context(|| format!("read ocr output {}", out_txt.display()))?;
        Ok(split_lines(&text))
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &Path) -> Result<Vec<String>> {
        if !image.is_file() {
            return Err(anyhow!("image not found: {}", image.display()));
        }
        let out_base = scratch_base();
        let out_txt = out_base.with_extension("txt");
        let err_log = out_base.with_extension("err");
        let stderr = File::create(&err_log)
            .with_context(|| format!("create {}", err_log.display()))?;

        let spawned = Command::new(&self.binary)
            .arg(image)
            .arg(&out_base)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .spawn()
            .with_context(|| format!("failed to start {}", self.binary.display()));
        let result =
            spawned.and_then(|child| self.wait_for_output(child, image, &out_txt, &err_log));

        let _ = fs::remove_file(&out_txt);
        let _ = fs::remove_file(&err_log);
        result
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn scratch_base() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("cricket_oracle_ocr_{}_{nanos}", std::process::id()))
}
