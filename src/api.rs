use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TrainerConfig;
use crate::error::{DecodeError, Result, TrainerError};
use crate::scenario::Meta;
use crate::score::Badge;

// -- Wire types -------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub meta: &'a Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluateRequest {
    pub scenario: String,
    pub response: String,
    pub meta: Meta,
}

/// A decoded, validated evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub level: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

// -- Decoding ---------------------------------------------------------------

fn parse_object(body: &str) -> Result<serde_json::Map<String, Value>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject.into()),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `{error, raw?}` in an otherwise successful body.
fn application_error(map: &serde_json::Map<String, Value>) -> Option<TrainerError> {
    let error = map.get("error")?;
    let is_set = match error {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        _ => true,
    };
    if !is_set {
        return None;
    }
    let raw = map
        .get("raw")
        .filter(|v| !v.is_null())
        .map(value_text)
        .filter(|s| !s.is_empty());
    Some(TrainerError::Application {
        message: value_text(error),
        raw,
    })
}

pub fn decode_scenario(body: &str) -> Result<String> {
    let map = parse_object(body)?;
    if let Some(err) = application_error(&map) {
        return Err(err);
    }
    match map.get("scenario") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(DecodeError::MissingField("scenario").into())
        }
        Some(_) => Err(DecodeError::WrongType {
            field: "scenario",
            expected: "string",
        }
        .into()),
    }
}

fn decode_score(value: Option<&Value>) -> std::result::Result<f64, DecodeError> {
    match value {
        None | Some(Value::Null) => Err(DecodeError::MissingField("score")),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| DecodeError::InvalidScore(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| DecodeError::InvalidScore(s.clone())),
        Some(other) => Err(DecodeError::InvalidScore(other.to_string())),
    }
}

fn decode_list(
    map: &serde_json::Map<String, Value>,
    field: &'static str,
) -> std::result::Result<Vec<String>, DecodeError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().map(value_text).collect()),
        Some(_) => Err(DecodeError::WrongType {
            field,
            expected: "array",
        }),
    }
}

pub fn decode_evaluation(body: &str) -> Result<EvaluationResult> {
    let map = parse_object(body)?;
    if let Some(err) = application_error(&map) {
        return Err(err);
    }

    let score = decode_score(map.get("score"))?;
    let level = match map.get("level") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Badge::for_score(score).label().to_string()
        }
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: "level",
                expected: "string",
            }
            .into())
        }
    };

    Ok(EvaluationResult {
        score,
        level,
        strengths: decode_list(&map, "strengths")?,
        improvements: decode_list(&map, "improvements")?,
    })
}

// -- Client seam ------------------------------------------------------------

/// The remote scoring service.
#[allow(async_fn_in_trait)]
pub trait ScoringApi {
    /// Ask for a fresh scenario matching `meta`.
    async fn generate(&self, meta: &Meta) -> Result<String>;
    async fn evaluate(&self, request: &EvaluateRequest) -> Result<EvaluationResult>;
}

/// `reqwest`-backed implementation talking JSON over HTTP.
pub struct HttpScoringApi {
    client: Client,
    base_url: String,
    evaluate_path: String,
}

impl HttpScoringApi {
    pub fn new(config: &TrainerConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TrainerError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpScoringApi {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            evaluate_path: normalize_path(&config.evaluate_path),
        })
    }

    pub fn generate_url(&self) -> String {
        format!("{}/generate", self.base_url)
    }

    pub fn evaluate_url(&self) -> String {
        format!("{}{}", self.base_url, self.evaluate_path)
    }

    /// POST `body` and return the response text. The body is read as text
    /// first so a failing status can carry it in the error.
    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<String> {
        debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| TrainerError::Transport {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| TrainerError::Transport {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

        if !status.is_success() {
            warn!(url, status = status.as_u16(), "non-success status");
            return Err(TrainerError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        "/evaluate".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

impl ScoringApi for HttpScoringApi {
    async fn generate(&self, meta: &Meta) -> Result<String> {
        let url = self.generate_url();
        let text = self.post_json(&url, &GenerateRequest { meta }).await?;
        decode_scenario(&text)
    }

    async fn evaluate(&self, request: &EvaluateRequest) -> Result<EvaluationResult> {
        let url = self.evaluate_url();
        let text = self.post_json(&url, request).await?;
        decode_evaluation(&text)
    }
}
