use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::TemplateRequest;
use crate::api::dtos::responses::MessageResponse;
use crate::api::extractors::caller::Caller;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.template_service.list().await?))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.template_service.get(&template_id).await?))
}

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(payload): Json<TemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.template_service.create(payload.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_template(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(template_id): Path<String>,
    Json(payload): Json<TemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.template_service.update(&template_id, payload.into_input()?).await?))
}

pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.template_service.delete(&template_id).await?;
    Ok(Json(MessageResponse::new("Template deleted")))
}

pub async fn run_template(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.template_service.run(&template_id).await?))
}

pub async fn stop_template(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.template_service.stop(&template_id).await?))
}

pub async fn generate_from_template(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.template_service.generate(&template_id).await?))
}
