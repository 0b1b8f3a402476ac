use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::usecases::u501_bulk_import::{ImportError, SessionError};

/// Ошибка HTTP-обработчика; тело ответа `{ "error": "..." }`
#[derive(Debug)]
pub enum ApiError {
    Import(ImportError),
    BadRequest(String),
    Upload { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Import(ImportError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Import(ImportError::Session(SessionError::Busy(_)))
            | ApiError::Import(ImportError::Session(SessionError::InvalidState { .. })) => {
                StatusCode::CONFLICT
            }
            ApiError::Import(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload { status, .. } => *status,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Import(e) => e.to_string(),
            ApiError::BadRequest(message) | ApiError::Upload { message, .. } => message.clone(),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        ApiError::Import(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Upload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!("{}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
