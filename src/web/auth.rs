//! HTTP Basic gate for admin routes.
//!
//! Any handler that takes an [`AdminUser`] only runs after the
//! [`AccessGuard`](crate::auth::AccessGuard) has accepted the request's
//! credentials.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};

use crate::auth::AuthResult;
use crate::web::api::AppState;
use crate::web::error::AppError;

/// Username of the authenticated admin, kept for audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub String);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A disabled surface answers 503 even to requests without credentials.
        if !state.guard.is_enabled() {
            return Err(AppError::AdminDisabled);
        }

        // Missing or undecodable credentials have no username to count
        // against, so they are rejected without touching the guard.
        let Some(credentials) = parts.headers.typed_get::<Authorization<Basic>>() else {
            return Err(AppError::InvalidCredentials);
        };

        match state
            .guard
            .authenticate(credentials.username(), credentials.password())
        {
            AuthResult::Authenticated(username) => Ok(AdminUser(username)),
            AuthResult::ServiceUnavailable => Err(AppError::AdminDisabled),
            AuthResult::RateLimited => Err(AppError::RateLimited),
            AuthResult::InvalidCredentials => Err(AppError::InvalidCredentials),
        }
    }
}
