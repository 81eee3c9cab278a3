use std::path::PathBuf;

use anyhow::{Context, Result};

use cricket_oracle::config::{self, AppConfig, flag_value};
use cricket_oracle::dataset::Dataset;
use cricket_oracle::export;
use cricket_oracle::http_cache::app_cache_dir;
use cricket_oracle::logging;
use cricket_oracle::summary::DatasetSummary;

const DEFAULT_XLSX: &str = "ipl_dashboard.xlsx";

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_stderr();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = AppConfig::from_env().with_args(&args);
    let dataset = Dataset::load(&cfg.matches_path, &cfg.deliveries_path)
        .context("failed to load match datasets")?;
    let summary = DatasetSummary::build(&dataset);

    let json_path = flag_value(&args, "--json").map(PathBuf::from);
    let xlsx_path = flag_value(&args, "--xlsx").map(PathBuf::from).or_else(|| {
        if json_path.is_some() {
            None
        } else {
            app_cache_dir().map(|dir| dir.join(DEFAULT_XLSX))
        }
    });

    if let Some(path) = json_path {
        export::write_dashboard_json(&path, &summary)?;
        println!("Dashboard JSON: {}", path.display());
    }

    if let Some(path) = xlsx_path {
        let report = export::export_dashboard_xlsx(&path, &summary)?;
        println!("Dashboard workbook: {}", path.display());
        println!(
            "Rows: seasons {} | teams {} | batters {} | bowlers {}",
            report.seasons, report.teams, report.batters, report.bowlers
        );
        if !summary.has_wicket_data {
            println!("No dismissal column in deliveries; TopBowlers is empty");
        }
    }

    Ok(())
}
