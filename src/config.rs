use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ROSTER_BASE_URL: &str = "https://www.iplt20.com/teams";
const DEFAULT_TESSERACT_BIN: &str = "tesseract";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ROSTER_CACHE_TTL_SECS: u64 = 6 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub matches_path: PathBuf,
    pub deliveries_path: PathBuf,
    pub roster_base_url: String,
    pub http_timeout: Duration,
    /// How long a cached squad page is served without asking the site; zero always revalidates.
    pub roster_cache_ttl: Duration,
    pub tesseract_bin: PathBuf,
    pub ocr_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir =
            env_path("CRICKET_DATA_DIR").unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let matches_path =
            env_path("CRICKET_MATCHES_CSV").unwrap_or_else(|| data_dir.join("matches.csv"));
        let deliveries_path =
            env_path("CRICKET_DELIVERIES_CSV").unwrap_or_else(|| data_dir.join("deliveries.csv"));
        let roster_base_url = env_string("ROSTER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ROSTER_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let tesseract_bin =
            env_path("TESSERACT_BIN").unwrap_or_else(|| PathBuf::from(DEFAULT_TESSERACT_BIN));

        Self {
            matches_path,
            deliveries_path,
            roster_base_url,
            http_timeout: timeout_from_env("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            roster_cache_ttl: Duration::from_secs(env_u64(
                "ROSTER_CACHE_TTL_SECS",
                DEFAULT_ROSTER_CACHE_TTL_SECS,
            )),
            tesseract_bin,
            ocr_timeout: timeout_from_env("OCR_TIMEOUT_SECS", DEFAULT_OCR_TIMEOUT_SECS),
        }
    }

    /// Applies `--matches` / `--deliveries` overrides from the command line.
    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(path) = flag_value(args, "--matches") {
            self.matches_path = PathBuf::from(path);
        }
        if let Some(path) = flag_value(args, "--deliveries") {
            self.deliveries_path = PathBuf::from(path);
        }
        self
    }
}

/// Loads `.env.local` then `.env`; missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Reads `--name=value` or `--name value`, first occurrence wins.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    flag_values(args, name).into_iter().next()
}

/// Collects every `--name=value` / `--name value` occurrence in order.
pub fn flag_values(args: &[String], name: &str) -> Vec<String> {
    let prefix = format!("{name}=");
    let mut out = Vec::new();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            continue;
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                out.push(next.trim().to_string());
            }
        }
    }
    out
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_string(key)
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn timeout_from_env(key: &str, default: u64) -> Duration {
    Duration::from_secs(env_u64(key, default).max(1))
}

#[cfg(test)]
mod tests {
    use super::{flag_value, flag_values};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_value_accepts_both_forms() {
        let a = args(&["--team1=mumbai-indians", "--team2", "punjab-kings"]);
        assert_eq!(flag_value(&a, "--team1").as_deref(), Some("mumbai-indians"));
        assert_eq!(flag_value(&a, "--team2").as_deref(), Some("punjab-kings"));
        assert_eq!(flag_value(&a, "--team3"), None);
    }

    #[test]
    fn flag_values_keeps_order_and_skips_dangling() {
        let a = args(&["--image", "a.png", "--image=b.png", "--image"]);
        assert_eq!(flag_values(&a, "--image"), vec!["a.png", "b.png"]);
        let b = args(&["--team1", "--team2", "x"]);
        assert_eq!(flag_value(&b, "--team1"), None);
    }
}
