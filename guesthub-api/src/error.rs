use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use guesthub_core::CoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Core(err) => match err {
                CoreError::ValidationError(_) | CoreError::DuplicateEmail => StatusCode::BAD_REQUEST,
                CoreError::InvalidCredentials | CoreError::InvalidToken | CoreError::ExpiredToken => {
                    StatusCode::UNAUTHORIZED
                }
                CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::StoreTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::Store(_) | CoreError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose store or internal details to clients
        let error_message = match &self {
            AppError::Core(CoreError::Store(_) | CoreError::InternalError(_)) => {
                tracing::error!(error = %self, "Internal Server Error");
                "Internal Server Error".to_string()
            }
            AppError::Core(CoreError::StoreTimeout(_)) => {
                "Service temporarily unavailable".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
