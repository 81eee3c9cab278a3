//! On-disk cache for squad pages.
//!
//! Rosters change a handful of times a season, so a page younger than the
//! configured TTL is served straight from disk. Older pages are revalidated
//! with ETag/Last-Modified when the site sent them, and refetched otherwise.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 2;
const CACHE_DIR: &str = "cricket_oracle";
const CACHE_FILE: &str = "roster_pages.json";

static PAGES: Mutex<Option<PageCache>> = Mutex::new(None);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    pub body: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    /// Unix seconds of the last 200 or 304 from the site.
    pub checked_at: u64,
}

impl CachedPage {
    pub fn is_fresh(&self, now: u64, ttl: Duration) -> bool {
        !ttl.is_zero() && now.saturating_sub(self.checked_at) < ttl.as_secs()
    }

    fn has_validators(&self) -> bool {
        self.etag.is_some() || self.last_modified.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PageCacheFile {
    version: u32,
    pages: HashMap<String, CachedPage>,
}

/// Pages keyed by URL, persisted as one JSON file.
#[derive(Debug, Clone)]
pub struct PageCache {
    path: Option<PathBuf>,
    pages: HashMap<String, CachedPage>,
}

impl PageCache {
    /// Reads `path`; a missing, unreadable or older-format file starts empty.
    pub fn open(path: Option<PathBuf>) -> Self {
        let pages = path
            .as_deref()
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|raw| serde_json::from_str::<PageCacheFile>(&raw).ok())
            .filter(|file| file.version == CACHE_VERSION)
            .map(|file| file.pages)
            .unwrap_or_default();
        Self { path, pages }
    }

    pub fn get(&self, url: &str) -> Option<&CachedPage> {
        self.pages.get(url)
    }

    pub fn insert(&mut self, url: &str, page: CachedPage) {
        self.pages.insert(url.to_string(), page);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let file = PageCacheFile {
            version: CACHE_VERSION,
            pages: self.pages.clone(),
        };
        let json = serde_json::to_string(&file).context("serialize page cache")?;
        write_atomically(path, &json)
    }
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// GETs `url` as text through the process-wide page cache.
pub fn fetch_text_cached(client: &Client, url: &str, ttl: Duration) -> Result<String> {
    let now = unix_now();
    let cached = with_pages(|pages| pages.get(url).cloned())?;
    if let Some(page) = cached.as_ref()
        && page.is_fresh(now, ttl)
    {
        log::debug!("page cache fresh for {url}");
        return Ok(page.body.clone());
    }

    let mut req = client.get(url);
    if let Some(page) = cached.as_ref() {
        if let Some(etag) = page.etag.as_deref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = page.last_modified.as_deref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();

    let page = if status == StatusCode::NOT_MODIFIED {
        let Some(page) = cached.filter(CachedPage::has_validators) else {
            return Err(anyhow!("received 304 without cached body for {url}"));
        };
        log::debug!("page cache revalidated (304) for {url}");
        CachedPage {
            checked_at: now,
            ..page
        }
    } else {
        let headers = resp.headers().clone();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {status} for {url}"));
        }
        CachedPage {
            body,
            etag: header_text(&headers, ETAG),
            last_modified: header_text(&headers, LAST_MODIFIED),
            checked_at: now,
        }
    };

    let body = page.body.clone();
    with_pages(|pages| {
        pages.insert(url, page);
        if let Err(err) = pages.save() {
            log::warn!("page cache not saved: {err:#}");
        }
    })?;
    Ok(body)
}

fn with_pages<T>(f: impl FnOnce(&mut PageCache) -> T) -> Result<T> {
    let mut guard = PAGES.lock().map_err(|_| anyhow!("page cache lock poisoned"))?;
    let pages = guard.get_or_insert_with(|| PageCache::open(cache_path()));
    Ok(f(pages))
}

fn header_text(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

/// `$XDG_CACHE_HOME/cricket_oracle`, falling back to `$HOME/.cache/cricket_oracle`.
pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
