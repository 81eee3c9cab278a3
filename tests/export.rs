use std::path::PathBuf;

use cricket_oracle::dataset::Dataset;
use cricket_oracle::export::{dashboard_json, export_dashboard_xlsx, write_dashboard_json};
use cricket_oracle::summary::DatasetSummary;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn summary(deliveries: &str) -> DatasetSummary {
    let dataset = Dataset::load(&fixture_path("matches.csv"), &fixture_path(deliveries))
        .expect("fixtures load");
    DatasetSummary::build(&dataset)
}

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("cricket_oracle_test_{}", std::process::id()))
        .join(name)
}

#[test]
fn dashboard_json_uses_chart_keys() {
    let value = dashboard_json(&summary("deliveries_batsman.csv"));
    assert_eq!(value["matches_per_season"][0]["season"], "2008");
    assert_eq!(value["matches_per_season"][0]["matches"], 2);
    assert_eq!(value["team_wins"][0]["team"], "Chennai Super Kings");
    assert_eq!(value["team_wins"][0]["wins"], 2);
    assert_eq!(value["top_batsmen"][0]["batsman"], "MS Dhoni");
    assert_eq!(value["top_batsmen"][0]["runs"], 10);
    assert_eq!(value["top_bowlers"].as_array().map(Vec::len), Some(3));
}

#[test]
fn dashboard_json_without_dismissals_has_empty_bowlers() {
    let value = dashboard_json(&summary("deliveries_batter.csv"));
    assert_eq!(value["top_bowlers"], serde_json::json!([]));
    assert_eq!(value["top_batsmen"][0]["batsman"], "V Kohli");
}

#[test]
fn json_file_round_trips() {
    let path = scratch("dashboard.json");
    let summary = summary("deliveries_batsman.csv");
    write_dashboard_json(&path, &summary).expect("json written");
    let raw = std::fs::read_to_string(&path).expect("json readable");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(value, dashboard_json(&summary));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn workbook_is_written_with_row_counts() {
    let path = scratch("dashboard.xlsx");
    let report =
        export_dashboard_xlsx(&path, &summary("deliveries_batsman.csv")).expect("workbook saved");
    assert_eq!(report.seasons, 3);
    assert_eq!(report.teams, 3);
    assert_eq!(report.batters, 5);
    assert_eq!(report.bowlers, 3);
    assert!(path.is_file());
    let _ = std::fs::remove_file(&path);
}
