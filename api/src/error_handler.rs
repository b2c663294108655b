use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use ticket_ai::AiError;
use ticket_store::StoreError;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type for the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("ticket not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The interactive similarity search ran out of time; distinct from an
    /// empty result so clients can show "search unavailable".
    #[error("similarity search timed out")]
    SearchTimeout,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SearchTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Store(_) => "STORE_ERROR",
            AppError::SearchTimeout => "SEARCH_TIMEOUT",
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::EmbeddingTimeout(_) | AiError::SearchTimeout(_) => AppError::SearchTimeout,
            AiError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let resp: ApiResponse<()> = ApiResponse::error(self.error_code(), self.to_string());
        resp.into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
