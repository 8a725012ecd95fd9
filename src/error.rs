//! Crate-level error types.

use thiserror::Error;

/// Reasons a response body could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("response body is not a JSON object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("field 'score' is not a number: {0}")]
    InvalidScore(String),
    #[error("field '{field}' has the wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Every failure the trainer can surface to the user.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// Local guard failed; no request was made.
    #[error("{0}")]
    Precondition(String),
    /// The request never produced an HTTP response.
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },
    /// The server replied with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] DecodeError),
    /// The server replied 2xx but carried an `{error}` payload.
    #[error("{message}{}", raw_suffix(.raw))]
    Application { message: String, raw: Option<String> },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn raw_suffix(raw: &Option<String>) -> String {
    match raw {
        Some(raw) if !raw.is_empty() => format!("\n\nRaw:\n{raw}"),
        _ => String::new(),
    }
}

impl TrainerError {
    /// True for failures caused by the network or the response payload,
    /// as opposed to local guards and application-level errors.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TrainerError::Transport { .. } | TrainerError::Http { .. } | TrainerError::Decode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_includes_raw_text() {
        let err = TrainerError::Application {
            message: "model refused".to_string(),
            raw: Some("{\"oops\":1}".to_string()),
        };
        assert_eq!(err.to_string(), "model refused\n\nRaw:\n{\"oops\":1}");
    }

    #[test]
    fn test_application_error_without_raw() {
        let err = TrainerError::Application {
            message: "model refused".to_string(),
            raw: None,
        };
        assert_eq!(err.to_string(), "model refused");
    }

    #[test]
    fn test_http_error_display() {
        let err = TrainerError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn test_decode_error_converts() {
        let err: TrainerError = DecodeError::MissingField("scenario").into();
        assert!(err.is_transport());
        assert!(err.to_string().contains("missing field 'scenario'"));
    }

    #[test]
    fn test_precondition_is_not_transport() {
        assert!(!TrainerError::Precondition("x".into()).is_transport());
        assert!(!TrainerError::Application {
            message: "x".into(),
            raw: None
        }
        .is_transport());
    }
}
