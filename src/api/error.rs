use crate::services::pool::PoolError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;
use utoipa::ToSchema;

/// JSON body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error parsing form data: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("No numbers left to draw")]
    PoolExhausted,

    #[error("{message}: {details}")]
    Internal { message: String, details: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AppError {
    pub fn internal(message: impl Into<String>, cause: impl Display) -> Self {
        AppError::Internal {
            message: message.into(),
            details: cause.to_string(),
        }
    }
}

impl From<PoolError> for AppError {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::Exhausted { .. } => AppError::PoolExhausted,
            PoolError::InvalidRange { .. } => AppError::internal("Draw pool misconfigured", e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::BadRequest(details) => {
                tracing::warn!("Rejected form: {}", details);
                (
                    StatusCode::BAD_REQUEST,
                    "Error parsing form data".to_string(),
                    Some(details),
                )
            }
            // Duplicates are reported as 400, the status existing clients expect
            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::BAD_REQUEST, msg, None)
            }
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            AppError::PoolExhausted => {
                tracing::error!("Draw pool exhausted");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No numbers left to draw".to_string(),
                    None,
                )
            }
            AppError::Internal { message, details } => {
                tracing::error!("Internal error: {}: {}", message, details);
                (StatusCode::INTERNAL_SERVER_ERROR, message, Some(details))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}
