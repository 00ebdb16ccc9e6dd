use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Film {0} not found")]
    FilmNotFound(i64),

    #[error("Director {0} not found")]
    DirectorNotFound(i64),

    #[error("Genre {0} not found")]
    GenreNotFound(i32),

    #[error("MPA rating {0} not found")]
    MpaNotFound(i32),

    #[error("Review {0} not found")]
    ReviewNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for every "entity not found" variant
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::UserNotFound(_)
                | AppError::FilmNotFound(_)
                | AppError::DirectorNotFound(_)
                | AppError::GenreNotFound(_)
                | AppError::MpaNotFound(_)
                | AppError::ReviewNotFound(_)
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            _ if self.is_not_found() => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
