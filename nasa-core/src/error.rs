use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single upstream call. The client never retries; callers
/// decide whether to propagate or fall back.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("upstream {url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl UpstreamError {
    /// HTTP status reported by the upstream, when the call got that far.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { url: url.to_string() }
        } else if err.is_decode() {
            UpstreamError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            UpstreamError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// A request parameter that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_only_for_status_errors() {
        let err = UpstreamError::Status {
            url: "https://api.nasa.gov/planetary/apod".into(),
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "rate limited".into(),
        };
        assert_eq!(err.status_code(), Some(StatusCode::TOO_MANY_REQUESTS));

        let err = UpstreamError::Timeout { url: "x".into() };
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn validation_error_names_field() {
        let err = ValidationError::new("sol", "must be a non-negative integer");
        assert_eq!(err.to_string(), "Invalid sol: must be a non-negative integer");
    }
}
