use std::path::PathBuf;

use cricket_oracle::dataset::{Dataset, DeliveryRecord, read_deliveries, read_matches};
use cricket_oracle::summary::{DatasetSummary, LEADERBOARD_LEN};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn load(deliveries: &str) -> DatasetSummary {
    let dataset = Dataset::load(&fixture_path("matches.csv"), &fixture_path(deliveries))
        .expect("fixtures load");
    DatasetSummary::build(&dataset)
}

fn delivery(batter: &str, bowler: &str, runs: u32, dismissed: Option<&str>) -> DeliveryRecord {
    DeliveryRecord {
        batter: Some(batter.to_string()),
        bowler: Some(bowler.to_string()),
        runs_scored: runs,
        dismissed_player: dismissed.map(str::to_string),
    }
}

fn summary_of(records: Vec<DeliveryRecord>, with_dismissals: bool) -> DatasetSummary {
    let header = if with_dismissals {
        "batter,bowler,runs_off_bat,player_dismissed\n"
    } else {
        "batter,bowler,runs_off_bat\n"
    };
    let mut deliveries = read_deliveries(header.as_bytes()).expect("header parses");
    deliveries.records = records;
    DatasetSummary::build(&Dataset {
        matches: Vec::new(),
        deliveries,
    })
}

#[test]
fn career_runs_sum_to_total_runs_column() {
    let dataset = Dataset::load(
        &fixture_path("matches.csv"),
        &fixture_path("deliveries_batsman.csv"),
    )
    .expect("fixtures load");
    let column_total: u64 = dataset
        .deliveries
        .records
        .iter()
        .map(|r| u64::from(r.runs_scored))
        .sum();
    let summary = DatasetSummary::build(&dataset);
    let career_total: u64 = summary.career.runs_by_player.values().sum();
    assert_eq!(career_total, column_total);
    assert_eq!(career_total, 16);
}

#[test]
fn wins_ignore_no_results_and_foreign_winners() {
    let summary = load("deliveries_batsman.csv");
    assert_eq!(summary.historical_wins("Chennai Super Kings"), 2);
    assert_eq!(summary.historical_wins("Rajasthan Royals"), 1);
    assert_eq!(summary.historical_wins("Mumbai Indians"), 1);
    assert_eq!(summary.historical_wins("Delhi Capitals"), 0);
    assert_eq!(summary.historical_wins("Punjab Kings"), 0);
    let total: u64 = summary.wins_count.values().sum();
    assert_eq!(total, 4);
}

#[test]
fn team_wins_ranked_with_first_seen_tiebreak() {
    let summary = load("deliveries_batsman.csv");
    let ranked = summary
        .team_wins
        .iter()
        .map(|t| (t.team.as_str(), t.wins))
        .collect::<Vec<_>>();
    assert_eq!(
        ranked,
        vec![
            ("Chennai Super Kings", 2),
            ("Rajasthan Royals", 1),
            ("Mumbai Indians", 1)
        ]
    );
}

#[test]
fn seasons_are_counted_in_ascending_order() {
    let summary = load("deliveries_batsman.csv");
    let seasons = summary
        .matches_per_season
        .iter()
        .map(|s| (s.season.as_str(), s.matches))
        .collect::<Vec<_>>();
    assert_eq!(seasons, vec![("2008", 2), ("2009", 2), ("2010", 2)]);
}

#[test]
fn batter_and_bowler_leaderboards() {
    let summary = load("deliveries_batsman.csv");
    let batters = summary
        .top_batters
        .iter()
        .map(|b| (b.batter.as_str(), b.runs))
        .collect::<Vec<_>>();
    assert_eq!(
        batters,
        vec![
            ("MS Dhoni", 10),
            ("RA Jadeja", 3),
            ("KA Pollard", 2),
            ("RG Sharma", 1),
            ("SK Warne", 0)
        ]
    );

    assert!(summary.has_wicket_data);
    let bowlers = summary
        .top_bowlers
        .iter()
        .map(|b| (b.bowler.as_str(), b.wickets))
        .collect::<Vec<_>>();
    assert_eq!(
        bowlers,
        vec![("RA Jadeja", 1), ("JJ Bumrah", 1), ("SK Warne", 1)]
    );
}

#[test]
fn no_dismissal_column_means_no_wickets() {
    let summary = load("deliveries_batter.csv");
    assert!(!summary.has_wicket_data);
    assert!(summary.top_bowlers.is_empty());
    assert!(summary.career.wickets_by_player.is_empty());
    assert_eq!(summary.career.runs_by_player.get("V Kohli"), Some(&10));
    assert_eq!(summary.career.runs_by_player.get("F du Plessis"), Some(&2));
}

#[test]
fn leaderboards_are_capped() {
    let records = (0..25)
        .map(|i| delivery(&format!("Batter {i}"), "Bowler", i, None))
        .collect::<Vec<_>>();
    let summary = summary_of(records, true);
    assert_eq!(summary.career.runs_by_player.len(), 25);
    assert!(summary.career.wickets_by_player.is_empty());
    assert_eq!(summary.top_batters.len(), LEADERBOARD_LEN);
    assert_eq!(summary.top_batters[0].batter, "Batter 24");
    assert_eq!(summary.top_batters[0].runs, 24);
    assert_eq!(summary.top_batters[9].batter, "Batter 15");
}

#[test]
fn player_stat_combines_runs_and_wickets() {
    let records = vec![
        delivery("RA Jadeja", "JJ Bumrah", 3, None),
        delivery("MS Dhoni", "RA Jadeja", 0, Some("MS Dhoni")),
        delivery("MS Dhoni", "RA Jadeja", 4, None),
    ];
    let career = summary_of(records.clone(), true).career;
    let jadeja = career.player_stat("RA Jadeja");
    assert_eq!((jadeja.runs, jadeja.wickets, jadeja.combined_score), (3, 1, 4));
    let nobody = career.player_stat("Unknown Rookie");
    assert_eq!(nobody.combined_score, 0);

    let without = summary_of(records, false).career;
    assert_eq!(without.player_stat("RA Jadeja").combined_score, 3);
}

#[test]
fn matches_without_a_season_are_left_out_of_the_season_counts() {
    let raw = "id,season,team1,team2,winner\n\
               1,2008,A,B,A\n\
               2,,A,B,B\n\
               3,NA,A,B,A\n\
               4,2009,B,A,B\n";
    let dataset = Dataset {
        matches: read_matches(raw.as_bytes()).expect("matches parse"),
        deliveries: read_deliveries("batter,bowler,runs\n".as_bytes()).expect("header parses"),
    };
    let summary = DatasetSummary::build(&dataset);
    let seasons = summary
        .matches_per_season
        .iter()
        .map(|s| (s.season.as_str(), s.matches))
        .collect::<Vec<_>>();
    assert_eq!(seasons, vec![("2008", 1), ("2009", 1)]);
    // Their results still count towards team wins.
    assert_eq!(summary.historical_wins("A"), 2);
    assert_eq!(summary.historical_wins("B"), 2);
}
