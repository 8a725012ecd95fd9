//! Explicit UI state. Everything the terminal renders lives here and is
//! passed into the render functions; nothing is held in globals.

use std::time::{Duration, Instant};

use crate::api::EvaluationResult;
use crate::history::HistoryEntry;
use crate::meter::{update_conciseness_meter, MeterReading};
use crate::render::{feedback_html, feedback_items};
use crate::scenario::{Meta, PLACEHOLDER_SCENARIO};
use crate::score::{format_score, ring_offset, Badge};

/// Transient notification backed by a single deadline. Showing a new
/// message replaces the old one and restarts the timer.
#[derive(Debug, Clone)]
pub struct Toast {
    message: Option<String>,
    expires_at: Option<Instant>,
    duration: Duration,
    announced: bool,
}

impl Toast {
    pub fn new(duration: Duration) -> Self {
        Toast {
            message: None,
            expires_at: None,
            duration,
            announced: false,
        }
    }

    pub fn show_at(&mut self, message: impl Into<String>, now: Instant) {
        self.message = Some(message.into());
        self.expires_at = Some(now + self.duration);
        self.announced = false;
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    pub fn visible_at(&self, now: Instant) -> Option<&str> {
        match (&self.message, self.expires_at) {
            (Some(msg), Some(deadline)) if now < deadline => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn visible(&self) -> Option<&str> {
        self.visible_at(Instant::now())
    }

    /// The live message if it has not been printed since it was shown.
    pub fn announce_at(&mut self, now: Instant) -> Option<String> {
        if self.announced {
            return None;
        }
        let message = self.visible_at(now)?.to_string();
        self.announced = true;
        Some(message)
    }

    pub fn announce(&mut self) -> Option<String> {
        self.announce_at(Instant::now())
    }

    /// Drop the message once its deadline has passed.
    pub fn tick_at(&mut self, now: Instant) {
        if self.expires_at.is_some_and(|deadline| now >= deadline) {
            self.message = None;
            self.expires_at = None;
        }
    }
}

/// Everything shown in the result card.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub score: f64,
    pub level: String,
    pub badge: Badge,
    pub ring_offset: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub feedback_html: String,
    /// Set when the card should be brought into view on the next render.
    pub focused: bool,
}

impl ResultView {
    pub fn from_evaluation(result: &EvaluationResult) -> Self {
        ResultView {
            score: result.score,
            level: result.level.clone(),
            badge: Badge::for_score(result.score),
            ring_offset: ring_offset(result.score),
            strengths: result.strengths.clone(),
            improvements: result.improvements.clone(),
            feedback_html: feedback_html(&result.strengths, &result.improvements),
            focused: true,
        }
    }

    pub fn from_history(entry: &HistoryEntry) -> Self {
        let (strengths, improvements) = feedback_items(&entry.feedback_html);
        ResultView {
            score: entry.score,
            level: entry.level.clone(),
            badge: Badge::for_score(entry.score),
            ring_offset: ring_offset(entry.score),
            strengths,
            improvements,
            feedback_html: entry.feedback_html.clone(),
            focused: true,
        }
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}/100", format_score(self.score))
    }

    pub fn level_text(&self) -> String {
        format!("Level: {}", self.level)
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub scenario: String,
    pub response: String,
    pub meta: Meta,
    pub generating: bool,
    pub evaluating: bool,
    pub result: Option<ResultView>,
    pub meter: MeterReading,
    pub toast: Toast,
    alerts: Vec<String>,
}

impl UiState {
    pub fn new(meta: Meta, toast_duration: Duration) -> Self {
        UiState {
            scenario: PLACEHOLDER_SCENARIO.to_string(),
            response: String::new(),
            meta,
            generating: false,
            evaluating: false,
            result: None,
            meter: update_conciseness_meter(""),
            toast: Toast::new(toast_duration),
            alerts: Vec::new(),
        }
    }

    /// Replace the response text and recompute the meter.
    pub fn set_response(&mut self, text: impl Into<String>) {
        self.response = text.into();
        self.meter = update_conciseness_meter(&self.response);
    }

    /// Append a line to the response, as typing would.
    pub fn push_response_line(&mut self, line: &str) {
        if !self.response.is_empty() {
            self.response.push('\n');
        }
        self.response.push_str(line);
        self.meter = update_conciseness_meter(&self.response);
    }

    /// Queue a blocking alert for the renderer.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn pending_alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}
