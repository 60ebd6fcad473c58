use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Note not found")]
    NotFound,
    #[error("External dependency error: {0}")]
    External(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn external(message: impl Into<String>) -> Self {
        Self::External(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::External(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<folio_core::Error> for AppError {
    fn from(error: folio_core::Error) -> Self {
        match error {
            folio_core::Error::NotFound(_) => Self::NotFound,
            other => Self::external(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
