use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, schedule, template, booking, review, user_package};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Class schedules
        .route("/api/v1/schedules", get(schedule::list_schedules).post(schedule::create_schedule))
        .route("/api/v1/schedules/recurring", post(schedule::create_recurring_schedule))
        .route("/api/v1/schedules/me", get(schedule::list_my_schedules))
        .route("/api/v1/schedules/{schedule_id}", get(schedule::get_schedule).put(schedule::update_schedule).delete(schedule::delete_schedule))
        .route("/api/v1/schedules/{schedule_id}/open", post(schedule::open_schedule))
        .route("/api/v1/schedules/{schedule_id}/attendances", get(schedule::get_roster))
        .route("/api/v1/instructor/schedules", get(schedule::list_instructor_schedules))

        // Recurring templates
        .route("/api/v1/templates", get(template::list_templates).post(template::create_template))
        .route("/api/v1/templates/{template_id}", get(template::get_template).put(template::update_template).delete(template::delete_template))
        .route("/api/v1/templates/{template_id}/run", post(template::run_template))
        .route("/api/v1/templates/{template_id}/stop", post(template::stop_template))
        .route("/api/v1/templates/{template_id}/generate", post(template::generate_from_template))

        // Bookings & attendance
        .route("/api/v1/bookings", get(booking::list_bookings).post(booking::create_booking))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/check-in", post(booking::check_in))
        .route("/api/v1/bookings/{booking_id}/check-out", post(booking::check_out))

        // Reviews
        .route("/api/v1/reviews", post(review::create_review))
        .route("/api/v1/classes/{class_id}/reviews", get(review::list_class_reviews))

        // Credit ledger
        .route("/api/v1/user-packages", get(user_package::list_my_packages))
        .route("/api/v1/internal/payments/completed", post(user_package::payment_completed))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
