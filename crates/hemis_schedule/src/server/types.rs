use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::error::ScheduleError;

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An error response: status code plus body.
#[derive(Debug)]
pub struct ApiErrorType {
    pub status: StatusCode,
    pub body: ApiError,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, details): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            body: ApiError {
                error: error.to_string(),
                details,
            },
        }
    }
}

impl From<ScheduleError> for ApiErrorType {
    fn from(err: ScheduleError) -> Self {
        if err.is_fatal_for_store() {
            error!(error = %err, "Request failed on the local store");
        } else if err.is_remote() {
            warn!(error = %err, "Request failed upstream");
        } else {
            warn!(error = %err, "Request failed");
        }

        let (status, message) = match &err {
            ScheduleError::MalformedRecord { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "HEMIS returned a malformed schedule entry",
            ),
            ScheduleError::RemoteStatus { .. }
            | ScheduleError::RemoteUnavailable { .. }
            | ScheduleError::UnexpectedResponse { .. } => {
                (StatusCode::BAD_GATEWAY, "Failed to fetch schedule from HEMIS")
            }
            ScheduleError::StoreUnavailable { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Schedule store unavailable",
            ),
            ScheduleError::Export { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export schedule")
            }
            ScheduleError::Config { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Service misconfigured")
            }
        };

        Self::from((status, message, Some(err.to_string())))
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
