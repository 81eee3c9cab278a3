use std::path::PathBuf;

use anyhow::{Context, Result};

use cricket_oracle::config::{self, AppConfig, flag_value, flag_values, has_flag};
use cricket_oracle::dataset::Dataset;
use cricket_oracle::logging;
use cricket_oracle::ocr::TesseractCli;
use cricket_oracle::predict::{DecisionBasis, PredictionRequest, Predictor, TeamReport};
use cricket_oracle::squad::IplRosterSource;
use cricket_oracle::summary::DatasetSummary;
use cricket_oracle::teams::IPL_TEAMS;

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_stderr();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--list-teams") {
        for team in IPL_TEAMS {
            println!("{:<30} {}", team.slug, team.name);
        }
        return Ok(());
    }

    let cfg = AppConfig::from_env().with_args(&args);
    let dataset = Dataset::load(&cfg.matches_path, &cfg.deliveries_path)
        .context("failed to load match datasets")?;
    let summary = DatasetSummary::build(&dataset);

    let roster = IplRosterSource::from_config(&cfg)?;
    let ocr = TesseractCli::from_config(&cfg);
    let predictor = Predictor::new(&summary, &roster, &ocr);

    let images = flag_values(&args, "--image")
        .into_iter()
        .map(PathBuf::from)
        .collect::<Vec<_>>();
    let request = if images.is_empty() {
        PredictionRequest::Squads {
            team1: flag_value(&args, "--team1"),
            team2: flag_value(&args, "--team2"),
        }
    } else {
        PredictionRequest::Images(images)
    };

    let outcome = match predictor.run(&request) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("{err}");
            return Ok(());
        }
    };

    if has_flag(&args, "--json") {
        let json = serde_json::to_string_pretty(&outcome).context("serialize prediction")?;
        println!("{json}");
        return Ok(());
    }

    print_team(&outcome.team1);
    println!();
    print_team(&outcome.team2);
    println!();
    let basis = match outcome.basis {
        DecisionBasis::Strength => "higher strength",
        DecisionBasis::HistoricalWins => "tie broken on historical wins",
    };
    println!("Predicted winner: {} ({basis})", outcome.winner);
    Ok(())
}

fn print_team(team: &TeamReport) {
    println!(
        "{}: strength {} | historical wins {}",
        team.name, team.strength, team.historical_wins
    );
    for p in &team.players {
        println!(
            "  {:<28} runs {:>5}  wickets {:>3}  total {:>5}",
            p.name, p.runs, p.wickets, p.combined_score
        );
    }
}
