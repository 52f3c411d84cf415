//! Error responses for the HTTP API.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Consent required for data persistence")]
    ConsentRequired,

    #[error("No update data provided")]
    NoUpdateData,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Admin access is not configured")]
    AdminDisabled,

    #[error("Too many failed attempts. Try again later.")]
    RateLimited,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ConsentRequired
            | AppError::NoUpdateData
            | AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::AdminDisabled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        let mut response = (status, body).into_response();

        if matches!(self, AppError::InvalidCredentials) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}
