use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{caller::Caller, internal::InternalCaller};
use crate::domain::models::user_package::PaymentCompleted;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_my_packages(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.ledger_service.list(&user_id).await?))
}

/// Called by the payment collaborator once a checkout has settled.
pub async fn payment_completed(
    State(state): State<Arc<AppState>>,
    _internal: InternalCaller,
    Json(payment): Json<PaymentCompleted>,
) -> Result<impl IntoResponse, AppError> {
    info!(payment_id = %payment.payment_id, user_id = %payment.user_id, "Payment completion received");
    Ok(Json(state.ledger_service.apply_payment(&payment).await?))
}
