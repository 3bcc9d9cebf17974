use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use history_store::StoreError;
use llm_client::LlmError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid prompt: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct JsonError {
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Llm(LlmError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            // Upstream failures are passed through, not synthesized away.
            AppError::Llm(LlmError::Api { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonError {
            error: self.to_string(),
        })
    }
}
