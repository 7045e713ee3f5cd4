use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

/// Form-level failures. Each message is shown verbatim above the form
/// that produced it, so the wording is part of the interface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username is required.")]
    UsernameRequired,
    #[error("Password is required.")]
    PasswordRequired,
    #[error("User {0} is already registered.")]
    UsernameTaken(String),
    #[error("Task name is required.")]
    TaskRequired,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Login required")]
    LoginRequired,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Forbidden")]
    Forbidden,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

/// True for the unique-constraint error codes of both supported backends.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    if let Some(db_err) = e.as_database_error() {
        let code = db_err.code().unwrap_or_default();

        // 2067 = SQLite Unique Constraint
        // 23505 = PostgreSQL Unique Violation
        code == "2067" || code == "23505"
    } else {
        false
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    (StatusCode::CONFLICT, "Resource already exists".to_string())
                } else {
                    error!("Database error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            }
            // Validation failures that reach this far were not caught by a
            // form handler, so a plain error page is the best we can do.
            AppError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::LoginRequired => {
                return Redirect::to("/auth/login").into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Html(format!(
            "<!doctype html>\n<html lang=\"en\"><head><title>{status}</title></head>\
             <body><h1>{status}</h1><p>{message}</p></body></html>"
        ));

        (status, body).into_response()
    }
}
