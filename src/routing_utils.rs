use crate::domain::analytics::driving_ports::AnalyticsError;
use crate::domain::category::driving_ports::CategoryError;
use crate::domain::task::driving_ports::TaskError;
use crate::domain::user::driving_ports::AuthError;
use crate::validators::ValidationError;
use anyhow::anyhow;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToResponse;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Deserialize, Debug, ToResponse)]
#[response(examples(
    ("Not Found" = (
        summary = "Entity could not be found or is owned by someone else (404)",
        value = json!({
            "error_code": "not_found",
            "error": "Task not found"
        })
    )),

    ("Unauthorized" = (
        summary = "Bearer token was missing, malformed or expired (401)",
        value = json!({
            "error_code": "unauthorized",
            "error": "Invalid token"
        })
    )),

    ("Internal Failure" = (
        summary = "The database or auth provider failed (500)",
        value = json!({
            "error_code": "upstream_error",
            "error": "Could not access data to complete your request"
        })
    )),

    ("Invalid Input" = (
        summary = "Invalid request body was passed (400)",
        value = json!({
            "error_code": "invalid_input",
            "error": "\"title\" is not allowed to be empty"
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error_code": "invalid_json",
            "error": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error: String,
}

/// Every way a request can fail. Converting into a response logs the failure and renders a
/// [BasicErrorResponse] with the matching status code.
#[derive(Debug)]
pub enum ApiErrorResponse {
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    /// The database or auth provider failed. The cause is logged, never sent to the client.
    Upstream(anyhow::Error),
    Internal(anyhow::Error),
}

impl ApiErrorResponse {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = match self {
            Self::Validation(message) | Self::Unauthorized(message) | Self::NotFound(message) => {
                warn!(error_code, "request rejected: {message}");
                message
            }
            Self::Upstream(cause) => {
                error!(error_code, "upstream failure: {cause:#}");
                "Could not access data to complete your request".to_owned()
            }
            Self::Internal(cause) => {
                error!(error_code, "unexpected failure: {cause:#}");
                "Something went wrong!".to_owned()
            }
        };

        (
            status,
            axum::Json(BasicErrorResponse {
                error_code: error_code.to_owned(),
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.0)
    }
}

impl From<TaskError> for ApiErrorResponse {
    fn from(value: TaskError) -> Self {
        match value {
            TaskError::NotFound => Self::NotFound("Task not found".to_owned()),
            TaskError::UnknownCategory(_) => Self::Validation(value.to_string()),
            TaskError::PortError(cause) => Self::Upstream(cause),
        }
    }
}

impl From<CategoryError> for ApiErrorResponse {
    fn from(value: CategoryError) -> Self {
        match value {
            CategoryError::NotFound => Self::NotFound("Category not found".to_owned()),
            CategoryError::PortError(cause) => Self::Upstream(cause),
        }
    }
}

impl From<AnalyticsError> for ApiErrorResponse {
    fn from(value: AnalyticsError) -> Self {
        match value {
            AnalyticsError::PortError(cause) => Self::Upstream(cause),
        }
    }
}

impl From<AuthError> for ApiErrorResponse {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::SignUpRejected(reason) => Self::Validation(reason),
            AuthError::InvalidCredentials => Self::Unauthorized(value.to_string()),
            AuthError::PortError(cause) => Self::Upstream(cause),
        }
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(value: PathRejection) -> Self {
        if value.status().is_server_error() {
            return Self::Internal(anyhow!(value.body_text()));
        }

        Self::Validation(value.body_text())
    }
}

/// Wrapper for [axum::extract::Path] so unparsable path segments get the same error body as
/// every other failure
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiErrorResponse))]
pub struct Path<T>(pub T);

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[cfg_attr(test, derive(Debug))]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        warn!(error_code = "invalid_json", "request rejected: {}", self.parse_problem);
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error: self.parse_problem,
            }),
        )
            .into_response()
    }
}
