use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateReviewRequest;
use crate::api::extractors::caller::Caller;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let review = state.review_service
        .create(&user_id, &payload.booking_id, payload.rating, payload.comment.unwrap_or_default())
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn list_class_reviews(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.review_service.list_by_class(&class_id).await?))
}
