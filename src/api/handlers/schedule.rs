use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{
    InstructorScheduleParams, OpenScheduleRequest, ScheduleListQuery, ScheduleRequest, TemplateRequest,
};
use crate::api::dtos::responses::MessageResponse;
use crate::api::extractors::caller::Caller;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(payload): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.schedule_service.create(payload.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_recurring_schedule(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(payload): Json<TemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.schedule_service.create_recurring(payload.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(schedule_id): Path<String>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.schedule_service.update(&schedule_id, payload.into_input()?).await?;
    Ok(Json(updated))
}

pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(schedule_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.schedule_service.delete(&schedule_id).await?;
    Ok(Json(MessageResponse::new("Schedule deleted")))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(schedule_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.get(&schedule_id, &user_id).await?))
}

pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScheduleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.list(&query.into_filter()?).await?))
}

pub async fn list_my_schedules(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.list_for_user(&user_id).await?))
}

pub async fn open_schedule(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(schedule_id): Path<String>,
    payload: Option<Json<OpenScheduleRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let req = payload.map(|Json(r)| r).unwrap_or_default();
    let opened = state.schedule_service
        .open(&schedule_id, &user_id, req.zoom_link, req.verification_code)
        .await?;
    Ok(Json(opened))
}

pub async fn get_roster(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Path(schedule_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedule_service.roster(&schedule_id, &user_id).await?))
}

pub async fn list_instructor_schedules(
    State(state): State<Arc<AppState>>,
    Caller(user_id): Caller,
    Query(params): Query<InstructorScheduleParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.into_query()?;
    Ok(Json(state.schedule_service.list_for_instructor(&user_id, &query).await?))
}
