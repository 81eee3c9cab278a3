use std::path::PathBuf;

use cricket_oracle::dataset::{
    DataError, SchemaError, load_deliveries, load_matches, read_deliveries, read_matches,
    resolve_delivery_columns,
};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn headers(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn batsman_schema_prefers_batsman_runs_over_earlier_runs_columns() {
    let set = load_deliveries(&fixture_path("deliveries_batsman.csv")).expect("fixture loads");
    assert_eq!(set.columns.batting_player.name, "batsman");
    assert_eq!(set.columns.runs.name, "batsman_runs");
    assert_eq!(set.columns.bowling_player.name, "bowler");
    assert_eq!(
        set.columns.dismissal.as_ref().map(|c| c.name.as_str()),
        Some("player_dismissed")
    );
    assert_eq!(set.records.len(), 9);
    assert_eq!(set.records[0].batter.as_deref(), Some("MS Dhoni"));
    assert_eq!(set.records[0].runs_scored, 4);
    assert!(set.records[0].dismissed_player.is_none());
    assert_eq!(set.records[3].dismissed_player.as_deref(), Some("RG Sharma"));
}

#[test]
fn batter_schema_is_case_insensitive_and_skips_extra_and_total_runs() {
    let set = load_deliveries(&fixture_path("deliveries_batter.csv")).expect("fixture loads");
    assert_eq!(set.columns.batting_player.name, "batter");
    assert_eq!(set.columns.runs.name, "runs_off_bat");
    assert!(set.columns.dismissal.is_none());
    assert!(!set.has_dismissal_data());
    let runs = set.records.iter().map(|r| r.runs_scored).collect::<Vec<_>>();
    assert_eq!(runs, vec![4, 0, 2, 6]);
}

#[test]
fn missing_runs_column_is_a_schema_error() {
    let err =
        resolve_delivery_columns(&headers(&["batter", "bowler", "extra_runs", "total_runs"]))
            .unwrap_err();
    assert_eq!(err, SchemaError::NoRunsColumn);
}

#[test]
fn missing_batter_or_bowler_is_a_schema_error() {
    let err =
        resolve_delivery_columns(&headers(&["striker", "bowler", "runs_off_bat"])).unwrap_err();
    assert_eq!(err, SchemaError::MissingColumn("batter".to_string()));
    let err = resolve_delivery_columns(&headers(&["batter", "runs_off_bat"])).unwrap_err();
    assert_eq!(err, SchemaError::MissingColumn("bowler".to_string()));
}

#[test]
fn invalid_runs_value_reports_the_line() {
    let raw = "batter,bowler,runs\nA,B,1\nA,B,two\n";
    match read_deliveries(raw.as_bytes()) {
        Err(DataError::InvalidRuns { line, value }) => {
            assert_eq!(line, 3);
            assert_eq!(value, "two");
        }
        other => panic!("expected InvalidRuns, got {other:?}"),
    }
}

#[test]
fn null_cells_become_none_or_zero() {
    let raw = "batter,bowler,runs,player_dismissed\nNA,B,,\nA,,2,nan\n";
    let set = read_deliveries(raw.as_bytes()).expect("parses");
    assert_eq!(set.records[0].batter, None);
    assert_eq!(set.records[0].runs_scored, 0);
    assert_eq!(set.records[1].bowler, None);
    assert_eq!(set.records[1].dismissed_player, None);
}

#[test]
fn matches_keep_no_results_and_drop_foreign_winners() {
    let matches = load_matches(&fixture_path("matches.csv")).expect("fixture loads");
    assert_eq!(matches.len(), 6);
    assert_eq!(matches[0].winner.as_deref(), Some("Chennai Super Kings"));
    assert_eq!(matches[3].winner, None);
    // "Delhi Capitals" did not play match 6.
    assert_eq!(matches[5].winner, None);
    assert_eq!(matches[5].season.as_deref(), Some("2010"));
}

#[test]
fn matches_require_core_columns() {
    let raw = "id,season,team1,team2\n1,2008,A,B\n";
    match read_matches(raw.as_bytes()) {
        Err(DataError::Schema(SchemaError::MissingColumn(col))) => assert_eq!(col, "winner"),
        other => panic!("expected missing winner column, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_matches(&fixture_path("does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, DataError::Io { .. }));
}
