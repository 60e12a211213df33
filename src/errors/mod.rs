use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    /// The mutation would push the day's logged minutes past the 1440 budget.
    #[error("Cannot exceed 1440 minutes (24 hours) per day: {current_total} logged, {attempted_total} attempted")]
    BudgetExceeded {
        current_total: i64,
        attempted_total: i64,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct BudgetErrorResponse {
    error: &'static str,
    current_total: i64,
    attempted_total: i64,
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {}", err);
        AppError::InternalServerError("Database error".to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        error!("Migration error: {}", err);
        AppError::InternalServerError("Migration error".to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BudgetExceeded { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::BudgetExceeded { current_total, attempted_total } => builder.json(BudgetErrorResponse {
                error: "Cannot exceed 1440 minutes (24 hours) per day",
                current_total: *current_total,
                attempted_total: *attempted_total,
            }),
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::InternalServerError(msg) => builder.json(ErrorResponse { error: msg.clone() }),
        }
    }
}
