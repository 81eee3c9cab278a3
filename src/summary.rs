use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dataset::{Dataset, DeliveryRecord, MatchRecord};

pub const LEADERBOARD_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStat {
    pub name: String,
    pub runs: u64,
    pub wickets: u64,
    pub combined_score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonCount {
    pub season: String,
    pub matches: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamWins {
    pub team: String,
    pub wins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatterRuns {
    #[serde(rename = "batsman")]
    pub batter: String,
    pub runs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BowlerWickets {
    pub bowler: String,
    pub wickets: u64,
}

/// Counter that remembers the order keys were first seen in.
#[derive(Debug, Clone, Default)]
struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl Tally {
    fn add(&mut self, key: &str, amount: u64) {
        match self.index.get(key) {
            Some(&idx) => self.entries[idx].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), amount));
            }
        }
    }

    /// Highest counts first; equal counts keep first-seen order.
    fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }

    fn into_map(self) -> HashMap<String, u64> {
        self.entries.into_iter().collect()
    }
}

/// Career runs per batter and wickets per bowler.
#[derive(Debug, Clone, Default)]
pub struct CareerTotals {
    pub runs_by_player: HashMap<String, u64>,
    pub wickets_by_player: HashMap<String, u64>,
}

impl CareerTotals {
    pub fn player_stat(&self, name: &str) -> PlayerStat {
        let runs = self.runs_by_player.get(name).copied().unwrap_or(0);
        let wickets = self.wickets_by_player.get(name).copied().unwrap_or(0);
        PlayerStat {
            name: name.to_string(),
            runs,
            wickets,
            combined_score: runs + wickets,
        }
    }
}

fn tally_deliveries(records: &[DeliveryRecord], has_dismissal_data: bool) -> (Tally, Tally) {
    let mut runs = Tally::default();
    let mut wickets = Tally::default();
    for rec in records {
        if let Some(batter) = rec.batter.as_deref() {
            runs.add(batter, u64::from(rec.runs_scored));
        }
        if has_dismissal_data
            && rec.dismissed_player.is_some()
            && let Some(bowler) = rec.bowler.as_deref()
        {
            wickets.add(bowler, 1);
        }
    }
    (runs, wickets)
}

/// Everything the dashboard and the predictor read, computed once per load.
#[derive(Debug, Clone, Default)]
pub struct DatasetSummary {
    pub career: CareerTotals,
    pub wins_count: HashMap<String, u64>,
    pub matches_per_season: Vec<SeasonCount>,
    pub team_wins: Vec<TeamWins>,
    pub top_batters: Vec<BatterRuns>,
    pub top_bowlers: Vec<BowlerWickets>,
    pub has_wicket_data: bool,
}

impl DatasetSummary {
    pub fn build(dataset: &Dataset) -> Self {
        let has_wicket_data = dataset.deliveries.has_dismissal_data();
        let (runs, wickets) = tally_deliveries(&dataset.deliveries.records, has_wicket_data);
        let wins = tally_wins(&dataset.matches);

        let top_batters = runs
            .top(LEADERBOARD_LEN)
            .into_iter()
            .map(|(batter, runs)| BatterRuns { batter, runs })
            .collect();
        let top_bowlers = wickets
            .top(LEADERBOARD_LEN)
            .into_iter()
            .map(|(bowler, wickets)| BowlerWickets { bowler, wickets })
            .collect();
        let team_wins = wins
            .top(LEADERBOARD_LEN)
            .into_iter()
            .map(|(team, wins)| TeamWins { team, wins })
            .collect();

        let summary = Self {
            career: CareerTotals {
                runs_by_player: runs.into_map(),
                wickets_by_player: wickets.into_map(),
            },
            wins_count: wins.into_map(),
            matches_per_season: matches_per_season(&dataset.matches),
            team_wins,
            top_batters,
            top_bowlers,
            has_wicket_data,
        };
        log::info!(
            "summary: {} seasons, {} winning teams, {} batters, {} bowlers",
            summary.matches_per_season.len(),
            summary.wins_count.len(),
            summary.career.runs_by_player.len(),
            summary.career.wickets_by_player.len()
        );
        summary
    }

    pub fn historical_wins(&self, team: &str) -> u64 {
        self.wins_count.get(team).copied().unwrap_or(0)
    }
}

fn tally_wins(matches: &[MatchRecord]) -> Tally {
    let mut wins = Tally::default();
    for m in matches {
        if let Some(winner) = m.winner.as_deref() {
            wins.add(winner, 1);
        }
    }
    wins
}

fn matches_per_season(matches: &[MatchRecord]) -> Vec<SeasonCount> {
    let mut seasons: BTreeMap<&str, u64> = BTreeMap::new();
    for season in matches.iter().filter_map(|m| m.season.as_deref()) {
        *seasons.entry(season).or_insert(0) += 1;
    }
    seasons
        .into_iter()
        .map(|(season, matches)| SeasonCount {
            season: season.to_string(),
            matches,
        })
        .collect()
}
