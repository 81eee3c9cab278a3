use std::collections::VecDeque;
use std::path::PathBuf;

use crate::predict::{PredictionOutcome, PredictionRequest};
use crate::teams::{IPL_TEAMS, Team};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerSide {
    Team1,
    Team2,
}

impl PickerSide {
    pub fn other(self) -> Self {
        match self {
            PickerSide::Team1 => PickerSide::Team2,
            PickerSide::Team2 => PickerSide::Team1,
        }
    }
}

/// Messages from the prediction worker back to the UI thread.
#[derive(Debug, Clone)]
pub enum Delta {
    Log(String),
    PredictionReady(PredictionOutcome),
    PredictionFailed(String),
}

#[derive(Debug, Clone)]
pub enum WorkerCommand {
    Predict(PredictionRequest),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub focus: PickerSide,
    pub cursor: [usize; 2],
    pub team1: Option<&'static Team>,
    pub team2: Option<&'static Team>,
    pub images: Vec<PathBuf>,
    pub prediction: Option<PredictionOutcome>,
    pub error: Option<String>,
    pub pending: bool,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            focus: PickerSide::Team1,
            cursor: [0, 1],
            team1: None,
            team2: None,
            images: Vec::new(),
            prediction: None,
            error: None,
            pending: false,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn cursor_for(&self, side: PickerSide) -> usize {
        match side {
            PickerSide::Team1 => self.cursor[0],
            PickerSide::Team2 => self.cursor[1],
        }
    }

    pub fn selected_for(&self, side: PickerSide) -> Option<&'static Team> {
        match side {
            PickerSide::Team1 => self.team1,
            PickerSide::Team2 => self.team2,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.other();
    }

    pub fn move_cursor(&mut self, down: bool) {
        if IPL_TEAMS.is_empty() {
            return;
        }
        let idx = match self.focus {
            PickerSide::Team1 => &mut self.cursor[0],
            PickerSide::Team2 => &mut self.cursor[1],
        };
        *idx = if down {
            (*idx + 1) % IPL_TEAMS.len()
        } else {
            (*idx + IPL_TEAMS.len() - 1) % IPL_TEAMS.len()
        };
    }

    /// Picks the team under the focused cursor and moves focus to the other side.
    pub fn select_focused(&mut self) {
        let Some(team) = IPL_TEAMS.get(self.cursor_for(self.focus)) else {
            return;
        };
        match self.focus {
            PickerSide::Team1 => self.team1 = Some(team),
            PickerSide::Team2 => self.team2 = Some(team),
        }
        self.push_log(format!("[INFO] Selected {}", team.name));
        self.toggle_focus();
    }

    pub fn clear_selection(&mut self) {
        self.team1 = None;
        self.team2 = None;
        self.prediction = None;
        self.error = None;
    }

    pub fn squad_request(&self) -> PredictionRequest {
        PredictionRequest::Squads {
            team1: self.team1.map(|t| t.slug.to_string()),
            team2: self.team2.map(|t| t.slug.to_string()),
        }
    }

    pub fn image_request(&self) -> PredictionRequest {
        PredictionRequest::Images(self.images.clone())
    }

    /// Marks a request as in flight; returns false while one is already running.
    pub fn begin_request(&mut self) -> bool {
        if self.pending {
            self.push_log("[INFO] Prediction already running");
            return false;
        }
        self.pending = true;
        self.error = None;
        true
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Log(msg) => state.push_log(msg),
        Delta::PredictionReady(outcome) => {
            state.pending = false;
            state.error = None;
            state.push_log(format!(
                "[INFO] Prediction: {} vs {} -> {}",
                outcome.team1.name, outcome.team2.name, outcome.winner
            ));
            state.prediction = Some(outcome);
        }
        Delta::PredictionFailed(msg) => {
            state.pending = false;
            state.prediction = None;
            state.push_log(format!("[WARN] {msg}"));
            state.error = Some(msg);
        }
    }
}
