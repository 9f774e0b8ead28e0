use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CheckoutRequest, CreateBookingRequest};
use crate::api::extractors::caller::Caller;
use crate::domain::models::pagination::PageParams;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service
        .create(&user_id, &payload.package_id, &payload.class_schedule_id)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.list(&user_id, &page).await?))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.detail(&user_id, &booking_id).await?))
}

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.check_in(&user_id, &booking_id).await?))
}

pub async fn check_out(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(booking_id): Path<String>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.check_out(&user_id, &booking_id, &payload.verification_code).await?))
}
