use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatehouse_core::AppError;
use serde::Serialize;
use serde_json::Value;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted: Option<Value>,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    submitted: Option<Value>,
}

impl ApiError {
    /// Attaches the caller's input so a form can be redisplayed.
    pub fn with_submitted(mut self, submitted: &impl Serialize) -> Self {
        self.submitted = serde_json::to_value(submitted).ok();
        self
    }

    fn status(&self) -> StatusCode {
        match self.error {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            submitted: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if self.error.is_user_facing() {
            self.error.to_string()
        } else {
            tracing::error!(error = %self.error, "request failed");
            "internal server error".to_owned()
        };

        let payload = Json(ErrorResponse {
            message,
            submitted: self.submitted,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
