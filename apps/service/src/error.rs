use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures that abort startup. Steady-state probe failures never surface
/// here; they are recorded as offline statuses instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),
    #[error("database pool setup failed: {0}")]
    PoolBuild(#[from] deadpool::managed::BuildError),
    #[error("database connection failed: {0}")]
    PoolGet(#[from] deadpool::managed::PoolError<libsql::Error>),
    #[error("migration failed: {0:#}")]
    Migration(anyhow::Error),
    #[error("http client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Failures surfaced to API clients as JSON error bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("target not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(format!("{error:#}"))
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // The detail stays in the log; clients get the generic message.
        if let ApiError::Internal(detail) = self {
            tracing::error!("request failed: {detail}");
        }

        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
