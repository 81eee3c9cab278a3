//! Loading of the match-results and ball-by-ball CSV files.
//!
//! Two delivery schemas are in circulation (`batsman`/`batsman_runs` in the
//! older dumps, `batter` plus a differently named runs column in newer ones),
//! so headers go through [`resolve_delivery_columns`] once before any row is
//! read.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

/// Cells pandas' `read_csv` reads as NaN by default.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const EXCLUDED_RUNS_COLUMNS: &[&str] = &["extra_runs", "total_runs"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("required column `{0}` not found")]
    MissingColumn(String),
    #[error("no batter runs column found (expected `batsman_runs` or another `*runs*` column)")]
    NoRunsColumn,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("invalid runs value {value:?} on line {line}")]
    InvalidRuns { line: u64, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub id: String,
    /// `None` for an empty or NA cell; such matches are left out of season counts.
    pub season: Option<String>,
    pub team1: String,
    pub team2: String,
    /// `None` for no-result matches.
    pub winner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub batter: Option<String>,
    pub bowler: Option<String>,
    pub runs_scored: u32,
    pub dismissed_player: Option<String>,
}

/// Column indices for a delivery file, resolved from its header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryColumns {
    pub batting_player: ColumnRef,
    pub runs: ColumnRef,
    pub bowling_player: ColumnRef,
    pub dismissal: Option<ColumnRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct DeliverySet {
    pub columns: DeliveryColumns,
    pub records: Vec<DeliveryRecord>,
}

impl DeliverySet {
    pub fn has_dismissal_data(&self) -> bool {
        self.columns.dismissal.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub matches: Vec<MatchRecord>,
    pub deliveries: DeliverySet,
}

impl Dataset {
    pub fn load(matches_path: &Path, deliveries_path: &Path) -> Result<Self, DataError> {
        let matches = load_matches(matches_path)?;
        let deliveries = load_deliveries(deliveries_path)?;
        log::info!(
            "loaded {} matches from {} and {} deliveries from {}",
            matches.len(),
            matches_path.display(),
            deliveries.records.len(),
            deliveries_path.display()
        );
        Ok(Self {
            matches,
            deliveries,
        })
    }
}

pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>, DataError> {
    read_matches(open(path)?)
}

pub fn load_deliveries(path: &Path) -> Result<DeliverySet, DataError> {
    read_deliveries(open(path)?)
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_matches<R: Read>(rdr: R) -> Result<Vec<MatchRecord>, DataError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = normalized_headers(reader.headers()?);

    let id = require_column(&headers, "id")?;
    let season = require_column(&headers, "season")?;
    let team1 = require_column(&headers, "team1")?;
    let team2 = require_column(&headers, "team2")?;
    let winner = require_column(&headers, "winner")?;

    let mut out = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = line_of(&row);
        let record = MatchRecord {
            id: cell(&row, id).unwrap_or_default(),
            season: cell(&row, season),
            team1: cell(&row, team1).unwrap_or_default(),
            team2: cell(&row, team2).unwrap_or_default(),
            winner: cell(&row, winner),
        };
        out.push(normalize_winner(record, line));
    }
    Ok(out)
}

pub fn read_deliveries<R: Read>(rdr: R) -> Result<DeliverySet, DataError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = normalized_headers(reader.headers()?);
    let columns = resolve_delivery_columns(&headers)?;
    if columns.dismissal.is_none() {
        log::info!("deliveries have no dismissal column; wicket stats will be empty");
    }
    log::debug!(
        "delivery columns: batter={} runs={} bowler={} dismissal={:?}",
        columns.batting_player.name,
        columns.runs.name,
        columns.bowling_player.name,
        columns.dismissal.as_ref().map(|c| c.name.as_str())
    );

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let runs_scored = match cell(&row, columns.runs.index) {
            None => 0,
            Some(raw) => parse_runs(&raw).ok_or_else(|| DataError::InvalidRuns {
                line: line_of(&row),
                value: raw.clone(),
            })?,
        };
        records.push(DeliveryRecord {
            batter: cell(&row, columns.batting_player.index),
            bowler: cell(&row, columns.bowling_player.index),
            runs_scored,
            dismissed_player: columns
                .dismissal
                .as_ref()
                .and_then(|c| cell(&row, c.index)),
        });
    }
    Ok(DeliverySet { columns, records })
}

/// Picks the batter, runs, bowler and dismissal columns from lower-cased headers.
pub fn resolve_delivery_columns(headers: &[String]) -> Result<DeliveryColumns, SchemaError> {
    let batting_player = find_column(headers, "batsman")
        .or_else(|| find_column(headers, "batter"))
        .ok_or_else(|| SchemaError::MissingColumn("batter".to_string()))?;

    let runs = find_column(headers, "batsman_runs")
        .or_else(|| {
            headers
                .iter()
                .enumerate()
                .find(|(_, name)| {
                    name.contains("runs") && !EXCLUDED_RUNS_COLUMNS.contains(&name.as_str())
                })
                .map(|(index, name)| ColumnRef {
                    name: name.clone(),
                    index,
                })
        })
        .ok_or(SchemaError::NoRunsColumn)?;

    let bowling_player = require_column(headers, "bowler").map(|index| ColumnRef {
        name: "bowler".to_string(),
        index,
    })?;

    Ok(DeliveryColumns {
        batting_player,
        runs,
        bowling_player,
        dismissal: find_column(headers, "player_dismissed"),
    })
}

pub fn is_missing(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}

fn normalized_headers(record: &StringRecord) -> Vec<String> {
    record
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect()
}

fn find_column(headers: &[String], name: &str) -> Option<ColumnRef> {
    headers.iter().position(|h| h == name).map(|index| ColumnRef {
        name: name.to_string(),
        index,
    })
}

fn require_column(headers: &[String], name: &str) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

fn cell(row: &StringRecord, index: usize) -> Option<String> {
    let raw = row.get(index)?;
    if is_missing(raw) {
        return None;
    }
    Some(raw.trim().to_string())
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or_default()
}

fn parse_runs(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

fn normalize_winner(mut record: MatchRecord, line: u64) -> MatchRecord {
    if let Some(winner) = record.winner.as_deref()
        && winner != record.team1
        && winner != record.team2
    {
        log::warn!(
            "line {line}: winner {winner:?} is neither {:?} nor {:?}; treating as no result",
            record.team1,
            record.team2
        );
        record.winner = None;
    }
    record
}
