use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::guard::Denied;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Denied: {0}")]
    Denied(#[from] Denied),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
}

fn internal(kind: &str, e: &dyn std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("{}: {}", kind, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Denied(denied) => {
                tracing::warn!("Request denied: {}", denied);
                return denied.into_response();
            }
            AppError::Multipart(e) => {
                tracing::warn!("Rejected upload: {}", e);
                (e.status(), e.body_text())
            }
            AppError::Database(e) => internal("Database error", e),
            AppError::Pool(e) => internal("Pool error", e),
            AppError::Password(e) => internal("Password hashing error", e),
            AppError::Io(e) => internal("I/O error", e),
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
