use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::{Value, json};

use crate::summary::DatasetSummary;

pub struct ExportReport {
    pub seasons: usize,
    pub teams: usize,
    pub batters: usize,
    pub bowlers: usize,
}

/// Dashboard tables in the shape the chart front end consumes.
pub fn dashboard_json(summary: &DatasetSummary) -> Value {
    json!({
        "matches_per_season": summary.matches_per_season,
        "team_wins": summary.team_wins,
        "top_batsmen": summary.top_batters,
        "top_bowlers": summary.top_bowlers,
    })
}

pub fn write_dashboard_json(path: &Path, summary: &DatasetSummary) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let body = serde_json::to_string_pretty(&dashboard_json(summary))
        .context("serialize dashboard json")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn export_dashboard_xlsx(path: &Path, summary: &DatasetSummary) -> Result<ExportReport> {
    let mut season_rows = vec![vec!["Season".to_string(), "Matches".to_string()]];
    season_rows.extend(
        summary
            .matches_per_season
            .iter()
            .map(|r| vec![r.season.clone(), r.matches.to_string()]),
    );

    let mut team_rows = vec![vec!["Team".to_string(), "Wins".to_string()]];
    team_rows.extend(
        summary
            .team_wins
            .iter()
            .map(|r| vec![r.team.clone(), r.wins.to_string()]),
    );

    let mut batter_rows = vec![vec!["Batter".to_string(), "Runs".to_string()]];
    batter_rows.extend(
        summary
            .top_batters
            .iter()
            .map(|r| vec![r.batter.clone(), r.runs.to_string()]),
    );

    let mut bowler_rows = vec![vec!["Bowler".to_string(), "Wickets".to_string()]];
    bowler_rows.extend(
        summary
            .top_bowlers
            .iter()
            .map(|r| vec![r.bowler.clone(), r.wickets.to_string()]),
    );

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("MatchesPerSeason")?;
        write_rows(sheet, &season_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TeamWins")?;
        write_rows(sheet, &team_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopBatters")?;
        write_rows(sheet, &batter_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopBowlers")?;
        write_rows(sheet, &bowler_rows)?;
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        seasons: season_rows.len().saturating_sub(1),
        teams: team_rows.len().saturating_sub(1),
        batters: batter_rows.len().saturating_sub(1),
        bowlers: bowler_rows.len().saturating_sub(1),
    })
}

/// Numeric cells go in as numbers so spreadsheet charts work on them.
fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match value.parse::<u64>() {
                Ok(n) if row_idx > 0 && col_idx > 0 => worksheet.write_number(r, c, n as f64),
                _ => worksheet.write_string(r, c, value),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
