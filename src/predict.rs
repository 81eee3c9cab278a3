use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::ocr::{OcrEngine, resolve_teams_from_text};
use crate::squad::{RosterSource, resolve_squad_strength};
use crate::summary::{DatasetSummary, PlayerStat};
use crate::teams::{IPL_TEAMS, Team, team_by_name, team_by_slug};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionBasis {
    Strength,
    HistoricalWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub winner: Side,
    pub basis: DecisionBasis,
}

/// Higher strength wins; a tie goes to more historical wins, then to side A.
pub fn decide(strength_a: u64, strength_b: u64, wins_a: u64, wins_b: u64) -> Decision {
    if strength_a > strength_b {
        Decision {
            winner: Side::A,
            basis: DecisionBasis::Strength,
        }
    } else if strength_b > strength_a {
        Decision {
            winner: Side::B,
            basis: DecisionBasis::Strength,
        }
    } else {
        let winner = if wins_a >= wins_b { Side::A } else { Side::B };
        Decision {
            winner,
            basis: DecisionBasis::HistoricalWins,
        }
    }
}

pub fn predict<'a>(
    team_a: &'a str,
    team_b: &'a str,
    strength_a: u64,
    strength_b: u64,
    wins_a: u64,
    wins_b: u64,
) -> &'a str {
    match decide(strength_a, strength_b, wins_a, wins_b).winner {
        Side::A => team_a,
        Side::B => team_b,
    }
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("{0}")]
    MissingInput(String),
    #[error("Unknown team: {0}")]
    UnknownTeam(String),
    #[error("{0}")]
    Lookup(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    Squad,
    Ocr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamReport {
    pub name: String,
    pub slug: Option<String>,
    pub strength: u64,
    pub players: Vec<PlayerStat>,
    pub historical_wins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionOutcome {
    pub strategy: Strategy,
    pub team1: TeamReport,
    pub team2: TeamReport,
    pub winner: String,
    pub basis: DecisionBasis,
    pub predicted_at: String,
}

impl PredictionOutcome {
    fn from_reports(strategy: Strategy, team1: TeamReport, team2: TeamReport) -> Self {
        let decision = decide(
            team1.strength,
            team2.strength,
            team1.historical_wins,
            team2.historical_wins,
        );
        let winner = match decision.winner {
            Side::A => team1.name.clone(),
            Side::B => team2.name.clone(),
        };
        Self {
            strategy,
            team1,
            team2,
            winner,
            basis: decision.basis,
            predicted_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A prediction request as entered by the user; either strategy may be missing inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionRequest {
    Squads {
        team1: Option<String>,
        team2: Option<String>,
    },
    Images(Vec<PathBuf>),
}

pub struct Predictor<'a> {
    summary: &'a DatasetSummary,
    roster: &'a dyn RosterSource,
    ocr: &'a dyn OcrEngine,
}

impl<'a> Predictor<'a> {
    pub fn new(
        summary: &'a DatasetSummary,
        roster: &'a dyn RosterSource,
        ocr: &'a dyn OcrEngine,
    ) -> Self {
        Self {
            summary,
            roster,
            ocr,
        }
    }

    pub fn run(&self, request: &PredictionRequest) -> Result<PredictionOutcome, PredictError> {
        match request {
            PredictionRequest::Squads { team1, team2 } => {
                self.predict_squads(team1.as_deref(), team2.as_deref())
            }
            PredictionRequest::Images(paths) => self.predict_from_images(paths),
        }
    }

    pub fn predict_squads(
        &self,
        slug1: Option<&str>,
        slug2: Option<&str>,
    ) -> Result<PredictionOutcome, PredictError> {
        let (Some(slug1), Some(slug2)) = (non_blank(slug1), non_blank(slug2)) else {
            return Err(PredictError::MissingInput(
                "Please select both teams.".to_string(),
            ));
        };
        let team1 = lookup_team(slug1)?;
        let team2 = lookup_team(slug2)?;

        let report1 = self.squad_report(team1)?;
        let report2 = self.squad_report(team2)?;

        let outcome = PredictionOutcome::from_reports(Strategy::Squad, report1, report2);
        log::info!(
            "squad prediction {} ({}) vs {} ({}): {}",
            outcome.team1.name,
            outcome.team1.strength,
            outcome.team2.name,
            outcome.team2.strength,
            outcome.winner
        );
        Ok(outcome)
    }

    fn squad_report(&self, team: &Team) -> Result<TeamReport, PredictError> {
        let squad = resolve_squad_strength(self.roster, team.slug, &self.summary.career)
            .map_err(|err| {
                log::warn!("squad lookup failed for {}: {err:#}", team.slug);
                PredictError::Lookup(format!("Could not fetch the squad for {}.", team.name))
            })?;
        Ok(TeamReport {
            name: team.name.to_string(),
            slug: Some(team.slug.to_string()),
            strength: squad.total,
            players: squad.players,
            historical_wins: self.summary.historical_wins(team.name),
        })
    }

    pub fn predict_from_images(
        &self,
        paths: &[PathBuf],
    ) -> Result<PredictionOutcome, PredictError> {
        if paths.len() < 2 {
            return Err(PredictError::MissingInput(
                "Please upload both images.".to_string(),
            ));
        }

        let mut lines = Vec::new();
        for path in paths {
            let recognized = self.ocr.recognize(path).map_err(|err| {
                log::warn!("ocr failed for {}: {err:#}", path.display());
                PredictError::Lookup(format!("Could not read {}.", path.display()))
            })?;
            lines.extend(recognized);
        }

        let text = lines.join("\n");
        let Some((team1, team2)) = resolve_teams_from_text(&text, IPL_TEAMS) else {
            log::debug!("no line named two teams in {} ocr lines", lines.len());
            return Err(PredictError::Lookup(
                "Could not determine teams from the images.".to_string(),
            ));
        };

        let report = |name: &str| {
            let wins = self.summary.historical_wins(name);
            TeamReport {
                name: name.to_string(),
                slug: None,
                strength: wins,
                players: Vec::new(),
                historical_wins: wins,
            }
        };
        let outcome =
            PredictionOutcome::from_reports(Strategy::Ocr, report(team1.name), report(team2.name));
        log::info!(
            "ocr prediction {} ({}) vs {} ({}): {}",
            outcome.team1.name,
            outcome.team1.strength,
            outcome.team2.name,
            outcome.team2.strength,
            outcome.winner
        );
        Ok(outcome)
    }
}

/// Accepts a slug or, for typed-in CLI input, the full team name.
fn lookup_team(key: &str) -> Result<&'static Team, PredictError> {
    team_by_slug(key)
        .or_else(|| team_by_name(key))
        .ok_or_else(|| PredictError::UnknownTeam(key.to_string()))
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
