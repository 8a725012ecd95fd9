//! The trainer client: drives the generate/evaluate cycles against a
//! [`ScoringApi`] and keeps [`UiState`] and the attempt history in step.

use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::{EvaluateRequest, EvaluationResult, ScoringApi};
use crate::config::TrainerConfig;
use crate::error::{Result, TrainerError};
use crate::history::{now_ms, HistoryEntry, HistoryStore};
use crate::meter::{update_conciseness_meter, MeterReading};
use crate::scenario::{is_real_scenario, random_fallback, Meta};
use crate::ui::{ResultView, UiState};

pub const MSG_NEED_SCENARIO: &str = "Generate a scenario first.";
pub const MSG_NEED_RESPONSE: &str = "Type your response first.";
pub const MSG_EVALUATION_FAILED: &str = "Evaluation failed. See the log for details.";
pub const MSG_FALLBACK_SCENARIO: &str = "Couldn't reach the generator. Showing a practice scenario.";

/// What a generation call ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Generated,
    Fallback,
    /// A generation was already running; nothing happened.
    Busy,
}

pub struct Trainer<A: ScoringApi> {
    api: A,
    ui: UiState,
    history: HistoryStore,
}

impl<A: ScoringApi> Trainer<A> {
    pub fn new(api: A, history: HistoryStore, meta: Meta, config: &TrainerConfig) -> Self {
        Trainer {
            api,
            ui: UiState::new(meta, Duration::from_secs(config.toast_secs)),
            history,
        }
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn set_meta(&mut self, meta: Meta) {
        self.ui.meta = meta;
    }

    pub fn set_response(&mut self, text: impl Into<String>) -> MeterReading {
        self.ui.set_response(text);
        self.ui.meter
    }

    /// Recompute the meter from the current response text.
    pub fn update_conciseness_meter(&mut self) -> MeterReading {
        self.ui.meter = update_conciseness_meter(&self.ui.response);
        self.ui.meter
    }

    /// Fetch a new scenario. Any failure falls back to a local scenario so
    /// the user can keep practising.
    pub async fn generate_scenario(&mut self) -> GenerateOutcome {
        if self.ui.generating {
            return GenerateOutcome::Busy;
        }
        self.ui.generating = true;
        let meta = self.ui.meta.clone();
        let result = self.api.generate(&meta).await;
        self.ui.generating = false;

        let outcome = match result {
            Ok(scenario) => {
                info!(%meta, "scenario generated");
                self.ui.scenario = scenario;
                GenerateOutcome::Generated
            }
            Err(err) => {
                warn!(error = %err, "scenario generation failed; using fallback");
                self.ui.scenario = random_fallback().to_string();
                self.ui.toast.show(MSG_FALLBACK_SCENARIO);
                self.ui.alert(MSG_FALLBACK_SCENARIO);
                GenerateOutcome::Fallback
            }
        };
        self.ui.result = None;
        self.ui.set_response("");
        outcome
    }

    /// Score the current response against the current scenario.
    ///
    /// Returns `Ok(None)` when an evaluation is already running.
    pub async fn evaluate_response(&mut self) -> Result<Option<EvaluationResult>> {
        if self.ui.evaluating {
            return Ok(None);
        }
        if !is_real_scenario(Some(&self.ui.scenario)) {
            self.ui.alert(MSG_NEED_SCENARIO);
            return Err(TrainerError::Precondition(MSG_NEED_SCENARIO.to_string()));
        }
        let response = self.ui.response.trim().to_string();
        if response.is_empty() {
            self.ui.alert(MSG_NEED_RESPONSE);
            return Err(TrainerError::Precondition(MSG_NEED_RESPONSE.to_string()));
        }

        let request = EvaluateRequest {
            scenario: self.ui.scenario.clone(),
            response,
            meta: self.ui.meta.clone(),
        };

        self.ui.evaluating = true;
        let result = self.api.evaluate(&request).await;
        self.ui.evaluating = false;

        match result {
            Ok(evaluation) => {
                info!(score = evaluation.score, level = %evaluation.level, "response evaluated");
                self.show_evaluation(&request, &evaluation);
                Ok(Some(evaluation))
            }
            Err(err) => {
                if err.is_transport() {
                    error!(error = %err, "evaluation request failed");
                } else {
                    error!(error = %err, "evaluation rejected by server");
                }
                self.ui.toast.show(MSG_EVALUATION_FAILED);
                match &err {
                    TrainerError::Application { .. } => self.ui.alert(err.to_string()),
                    _ => self.ui.alert(MSG_EVALUATION_FAILED),
                }
                Err(err)
            }
        }
    }

    fn show_evaluation(&mut self, request: &EvaluateRequest, evaluation: &EvaluationResult) {
        let view = ResultView::from_evaluation(evaluation);
        let entry = HistoryEntry {
            ts: now_ms(),
            score: evaluation.score,
            level: evaluation.level.clone(),
            scenario: request.scenario.clone(),
            response: request.response.clone(),
            feedback_html: view.feedback_html.clone(),
        };
        if let Err(err) = self.history.append(entry) {
            warn!(error = %err, "failed to persist attempt");
            self.ui.toast.show("Attempt scored, but history could not be saved.");
        }
        self.ui.result = Some(view);
    }

    /// Repopulate scenario, response and result from history entry `index`
    /// (0 = most recent). No request is made.
    pub fn restore_from_history(&mut self, index: usize) -> Result<()> {
        let entry = self.history.get(index).cloned().ok_or_else(|| {
            TrainerError::Precondition(format!("no history entry at position {index}"))
        })?;
        self.ui.scenario = entry.scenario.clone();
        self.ui.set_response(entry.response.clone());
        self.ui.result = Some(ResultView::from_history(&entry));
        self.ui.toast.show("Restored from history.");
        Ok(())
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear()?;
        self.ui.toast.show("History cleared.");
        Ok(())
    }
}
