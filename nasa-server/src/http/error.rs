use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use nasa_core::{UpstreamError, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Body shared by every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(ValidationError),
    Upstream(UpstreamError),
    Internal(String),
}

impl AppError {
    /// Upstream 4xx/5xx are forwarded; anything else is a 500.
    fn upstream_status(err: &UpstreamError) -> StatusCode {
        err.status_code()
            .and_then(|s| StatusCode::from_u16(s.as_u16()).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string())),
            AppError::Upstream(e) => {
                let status = Self::upstream_status(&e);
                warn!(%status, error = %e, "upstream request failed");
                (
                    status,
                    ErrorBody::new("Failed to fetch data from NASA API").with_details(summarize(&e)),
                )
            }
            AppError::Internal(msg) => {
                error!(%msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Internal server error"))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// One-line description without URLs carrying the API key.
fn summarize(err: &UpstreamError) -> String {
    match err {
        UpstreamError::Timeout { .. } => "NASA API request timed out".to_string(),
        UpstreamError::Transport { .. } => "Could not reach NASA API".to_string(),
        UpstreamError::Status { status, .. } => format!("NASA API responded with status {status}"),
        UpstreamError::Decode { .. } => "NASA API returned an unexpected response".to_string(),
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err)
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        AppError::Upstream(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}
