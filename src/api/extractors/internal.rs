use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use std::sync::Arc;
use crate::error::AppError;
use crate::state::AppState;

pub const INTERNAL_TOKEN_HEADER: &str = "X-Internal-Token";

/// Guard for collaborator-only endpoints such as payment completion.
pub struct InternalCaller;

impl<S> FromRequestParts<S> for InternalCaller
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let expected = app_state.config.internal_api_token.as_bytes();

        let supplied = parts.headers.get(INTERNAL_TOKEN_HEADER)
            .map(|v| v.as_bytes())
            .ok_or(AppError::Unauthorized)?;

        if expected.is_empty() || !constant_time_eq(supplied, expected) {
            return Err(AppError::Unauthorized);
        }
        Ok(InternalCaller)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
