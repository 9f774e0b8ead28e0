use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;
use crate::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated user id forwarded by the upstream gateway.
pub struct Caller(pub String);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts.headers.get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();

        Span::current().record("user_id", &user_id);

        Ok(Caller(user_id))
    }
}
