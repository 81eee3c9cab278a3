use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::ocr::OcrEngine;
use crate::predict::{PredictError, PredictionRequest, Predictor};
use crate::squad::RosterSource;
use crate::state::{Delta, WorkerCommand};
use crate::summary::DatasetSummary;

/// Serves prediction requests one at a time until the command channel closes.
pub fn spawn_prediction_worker(
    summary: Arc<DatasetSummary>,
    roster: Box<dyn RosterSource>,
    ocr: Box<dyn OcrEngine>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<WorkerCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let predictor = Predictor::new(&summary, roster.as_ref(), ocr.as_ref());
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                WorkerCommand::Predict(request) => {
                    if tx.send(Delta::Log(progress_line(&request))).is_err() {
                        break;
                    }
                    let delta = match predictor.run(&request) {
                        Ok(outcome) => Delta::PredictionReady(outcome),
                        Err(err @ PredictError::MissingInput(_)) => {
                            Delta::PredictionFailed(err.to_string())
                        }
                        Err(err) => {
                            log::warn!("prediction failed: {err}");
                            Delta::PredictionFailed(err.to_string())
                        }
                    };
                    if tx.send(delta).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn progress_line(request: &PredictionRequest) -> String {
    match request {
        PredictionRequest::Squads { team1, team2 } => format!(
            "[INFO] Fetching squads: {} vs {}",
            team1.as_deref().unwrap_or("?"),
            team2.as_deref().unwrap_or("?")
        ),
        PredictionRequest::Images(paths) => {
            format!("[INFO] Reading {} image(s)", paths.len())
        }
    }
}
