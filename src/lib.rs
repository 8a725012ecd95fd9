//! # consulting-trainer
//!
//! Practise answers to consulting negotiation scenarios. A remote API
//! generates scenarios and scores responses; this crate holds the client:
//! request/decode plumbing, UI state, a conciseness meter, score
//! presentation and a small persisted history of attempts.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod interactive;
pub mod meter;
pub mod render;
pub mod scenario;
pub mod score;
pub mod storage;
pub mod trainer;
pub mod ui;

pub use api::{EvaluateRequest, EvaluationResult, HttpScoringApi, ScoringApi};
pub use config::TrainerConfig;
pub use error::{DecodeError, TrainerError};
pub use history::{BoundedHistory, HistoryEntry, HistoryStore};
pub use scenario::Meta;
pub use trainer::{GenerateOutcome, Trainer};
pub use ui::UiState;
