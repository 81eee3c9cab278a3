use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::http_cache::fetch_text_cached;
use crate::http_client::http_client;
use crate::summary::{CareerTotals, PlayerStat};

/// Supplies the current squad for a team slug, as full player names in roster order.
pub trait RosterSource: Send + Sync {
    fn fetch_roster(&self, slug: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SquadStrength {
    pub total: u64,
    /// Players with a nonzero combined score, in roster order.
    pub players: Vec<PlayerStat>,
}

pub fn squad_strength(names: &[String], career: &CareerTotals) -> SquadStrength {
    let mut out = SquadStrength::default();
    for name in names {
        let stat = career.player_stat(name);
        if stat.combined_score == 0 {
            continue;
        }
        out.total += stat.combined_score;
        out.players.push(stat);
    }
    out
}

pub fn resolve_squad_strength(
    source: &dyn RosterSource,
    slug: &str,
    career: &CareerTotals,
) -> Result<SquadStrength> {
    let names = source
        .fetch_roster(slug)
        .with_context(|| format!("fetch squad for {slug}"))?;
    let strength = squad_strength(&names, career);
    log::debug!(
        "squad {slug}: {} names, {} with history, strength {}",
        names.len(),
        strength.players.len(),
        strength.total
    );
    Ok(strength)
}

/// Reads squads from the franchise pages on the league site.
pub struct IplRosterSource {
    client: &'static Client,
    base_url: String,
    cache_ttl: Duration,
}

impl IplRosterSource {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(cfg.http_timeout)?,
            base_url: cfg.roster_base_url.clone(),
            cache_ttl: cfg.roster_cache_ttl,
        })
    }

    pub fn team_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url, slug)
    }
}

impl RosterSource for IplRosterSource {
    fn fetch_roster(&self, slug: &str) -> Result<Vec<String>> {
        let url = self.team_url(slug);
        let html = fetch_text_cached(self.client, &url, self.cache_ttl)
            .context("fetch team page failed")?;
        parse_roster_html(&html)
    }
}

/// Pulls `props.pageProps.team.squad[].playerFullName` out of the page's
/// `__NEXT_DATA__` script. A page without that script has no squad.
pub fn parse_roster_html(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__")
        .map_err(|err| anyhow!("invalid selector: {err}"))?;
    let Some(script) = document.select(&selector).next() else {
        return Ok(Vec::new());
    };
    let raw = script.text().collect::<String>();
    let value: Value =
        serde_json::from_str(raw.trim()).context("invalid __NEXT_DATA__ json")?;
    Ok(squad_names(&value))
}

fn squad_names(value: &Value) -> Vec<String> {
    value
        .get("props")
        .and_then(|v| v.get("pageProps"))
        .and_then(|v| v.get("team"))
        .and_then(|v| v.get("squad"))
        .and_then(|v| v.as_array())
        .map(|players| {
            players
                .iter()
                .filter_map(|p| p.get("playerFullName").and_then(|n| n.as_str()))
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
