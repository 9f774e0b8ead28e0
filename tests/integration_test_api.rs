mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{parse_body, TestApp, INSTRUCTOR_USER, INTERNAL_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_payment(app: &TestApp, token: Option<&str>, body: Value) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/internal/payments/completed")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("X-Internal-Token", token);
    }
    app.router.clone().oneshot(builder.body(Body::from(body.to_string())).unwrap()).await.unwrap()
}

fn schedule_payload(app: &TestApp, date: &str, hour: i32) -> Value {
    json!({
        "class_id": app.class_id,
        "instructor_id": app.instructor_id,
        "date": date,
        "start_hour": hour,
        "start_minute": 0,
        "capacity": 5,
        "color": "#f97316"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let res = app.request("GET", "/health", None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["status"], "ok");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let app = TestApp::new().await;
    let res = app.request("GET", "/api/v1/bookings", None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.request("GET", "/api/v1/bookings", Some("  "), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_internal_payment_requires_token() {
    let app = TestApp::new().await;
    let body = json!({
        "payment_id": "pay-http-1",
        "user_id": "alice",
        "package_id": app.package_id,
        "amount": 250000.0
    });

    assert_eq!(post_payment(&app, None, body.clone()).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(post_payment(&app, Some("nope"), body.clone()).await.status(), StatusCode::UNAUTHORIZED);

    let res = post_payment(&app, Some(INTERNAL_TOKEN), body.clone()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let applied = parse_body(res).await;
    assert_eq!(applied["applied"], true);
    assert_eq!(applied["user_package"]["remaining_credit"], 10);

    let replay = parse_body(post_payment(&app, Some(INTERNAL_TOKEN), body).await).await;
    assert_eq!(replay["applied"], false);

    let res = app.request("GET", "/api/v1/user-packages", Some("alice"), None).await;
    let packages = parse_body(res).await;
    assert_eq!(packages.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_schedule_endpoints() {
    let app = TestApp::new().await;

    let res = app.request("POST", "/api/v1/schedules", Some("admin"), Some(schedule_payload(&app, "2030-01-07", 9))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = parse_body(res).await;
    let schedule_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["class_name"], "Morning Yoga");
    assert_eq!(created["instructor_name"], "Ayu Lestari");
    assert_eq!(created["date"], "2030-01-07");
    assert_eq!(created["booked"], 0);

    let res = app.request("POST", "/api/v1/schedules", Some("admin"), Some(schedule_payload(&app, "2030-01-07", 9))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(parse_body(res).await["error"].as_str().unwrap().contains("already scheduled"));

    let res = app.request("POST", "/api/v1/schedules", Some("admin"), Some(schedule_payload(&app, "07-01-2030", 9))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.request("POST", "/api/v1/schedules", Some("admin"), Some(schedule_payload(&app, "2030-01-05", 9))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    app.request("POST", "/api/v1/schedules", Some("admin"), Some(schedule_payload(&app, "2030-02-11", 9))).await;

    let res = app.request("GET", "/api/v1/schedules?start_date=2030-01-01&end_date=2030-01-31", None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await.as_array().unwrap().len(), 1);

    let res = app.request("GET", "/api/v1/schedules", None, None).await;
    assert_eq!(parse_body(res).await.as_array().unwrap().len(), 2);

    let mut update = schedule_payload(&app, "2030-01-07", 10);
    update["capacity"] = json!(8);
    let res = app.request("PUT", &format!("/api/v1/schedules/{}", schedule_id), Some("admin"), Some(update)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = parse_body(res).await;
    assert_eq!(updated["start_hour"], 10);
    assert_eq!(updated["capacity"], 8);

    let res = app.request("DELETE", &format!("/api/v1/schedules/{}", schedule_id), Some("admin"), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = app.request("GET", &format!("/api/v1/schedules/{}", schedule_id), Some("admin"), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_attendance_and_review_over_http() {
    let app = TestApp::new().await;
    app.give_credit("alice").await;
    let schedule = app.schedule_on("2030-01-07", 9, 0, 5).await;

    let res = app.request("POST", "/api/v1/bookings", Some("alice"), Some(json!({
        "package_id": app.package_id,
        "class_schedule_id": schedule.id
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let booking_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.request("DELETE", &format!("/api/v1/schedules/{}", schedule.id), Some("admin"), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.request("GET", "/api/v1/schedules/me", Some("alice"), None).await;
    let mine = parse_body(res).await;
    assert_eq!(mine[0]["is_booked"], true);

    let res = app.request("GET", "/api/v1/bookings?page=1&limit=5", Some("alice"), None).await;
    let history = parse_body(res).await;
    assert_eq!(history["pagination"]["total"], 1);
    assert_eq!(history["data"][0]["attendance_status"], "not-join");

    let res = app.request("POST", &format!("/api/v1/bookings/{}/check-in", booking_id), Some("alice"), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request("POST", &format!("/api/v1/schedules/{}/open", schedule.id), Some("alice"), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request(
        "POST",
        &format!("/api/v1/schedules/{}/open", schedule.id),
        Some(INSTRUCTOR_USER),
        Some(json!({ "zoom_link": "https://zoom.example/j/9", "verification_code": "XYZ789" })),
    ).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["is_opened"], true);

    let res = app.request("POST", &format!("/api/v1/bookings/{}/check-in", booking_id), Some("alice"), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["status"], "entered");

    let res = app.request(
        "POST",
        &format!("/api/v1/bookings/{}/check-out", booking_id),
        Some("alice"),
        Some(json!({ "verification_code": "BAD000" })),
    ).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.request(
        "POST",
        &format!("/api/v1/bookings/{}/check-out", booking_id),
        Some("alice"),
        Some(json!({ "verification_code": "XYZ789" })),
    ).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["status"], "attended");

    let res = app.request("GET", &format!("/api/v1/schedules/{}/attendances", schedule.id), Some(INSTRUCTOR_USER), None).await;
    let roster = parse_body(res).await;
    assert_eq!(roster[0]["status"], "attended");

    let res = app.request("POST", "/api/v1/reviews", Some("alice"), Some(json!({
        "booking_id": booking_id,
        "rating": 5,
        "comment": "Best class this week"
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.request("POST", "/api/v1/reviews", Some("alice"), Some(json!({
        "booking_id": booking_id,
        "rating": 4
    }))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.request("GET", &format!("/api/v1/classes/{}/reviews", app.class_id), None, None).await;
    let reviews = parse_body(res).await;
    assert_eq!(reviews.as_array().unwrap().len(), 1);
    assert_eq!(reviews[0]["rating"], 5);
}

#[tokio::test]
async fn test_instructor_schedule_listing() {
    let app = TestApp::new().await;
    let yoga_late = app.schedule_on("2030-01-09", 9, 0, 5).await;
    let pilates_class = app.seed_class("Pilates", 60).await;
    let pilates = app.state.schedule_service.create(class_booking_backend::domain::services::schedule_service::ScheduleInput {
        class_id: pilates_class,
        instructor_id: app.instructor_id.clone(),
        date: common::date("2030-01-08"),
        start_hour: 9,
        start_minute: 0,
        capacity: 5,
        color: String::new(),
    }).await.unwrap();
    let past = app.insert_schedule("2030-01-04", 9, 0, 5).await;
    app.schedule_on("2030-01-10", 9, 0, 5).await;

    app.give_credit("alice").await;
    for id in [&yoga_late.id, &pilates.id, &past.id] {
        app.book("alice", id).await.unwrap();
    }

    let res = app.request("GET", "/api/v1/instructor/schedules?sort=name_asc", Some(INSTRUCTOR_USER), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let all = parse_body(res).await;
    // Only schedules with bookings are listed.
    assert_eq!(all["pagination"]["total"], 3);
    assert_eq!(all["data"][0]["class_name"], "Morning Yoga");
    assert_eq!(all["data"][2]["class_name"], "Pilates");

    let res = app.request("GET", "/api/v1/instructor/schedules?status=upcoming&sort=date_asc", Some(INSTRUCTOR_USER), None).await;
    let upcoming = parse_body(res).await;
    assert_eq!(upcoming["pagination"]["total"], 2);
    assert_eq!(upcoming["data"][0]["id"], pilates.id.as_str());

    let res = app.request("GET", "/api/v1/instructor/schedules?status=past", Some(INSTRUCTOR_USER), None).await;
    let past_page = parse_body(res).await;
    assert_eq!(past_page["data"][0]["id"], past.id.as_str());

    let res = app.request("GET", "/api/v1/instructor/schedules?sort=sideways", Some(INSTRUCTOR_USER), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.request("GET", "/api/v1/instructor/schedules", Some("alice"), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_template_endpoints() {
    let app = TestApp::new().await;
    let payload = json!({
        "class_id": app.class_id,
        "instructor_id": app.instructor_id,
        "day_of_weeks": [1],
        "start_hour": 6,
        "start_minute": 30,
        "capacity": 20,
        "end_date": "2030-01-31"
    });

    let res = app.request("POST", "/api/v1/templates", Some("admin"), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let template_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.request("POST", &format!("/api/v1/templates/{}/generate", template_id), Some("admin"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.request("POST", &format!("/api/v1/templates/{}/run", template_id), Some("admin"), None).await;
    assert_eq!(parse_body(res).await["is_active"], true);

    let res = app.request("POST", &format!("/api/v1/templates/{}/generate", template_id), Some("admin"), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["created"].as_array().unwrap().len(), 4);

    let res = app.request("GET", "/api/v1/templates", Some("admin"), None).await;
    assert_eq!(parse_body(res).await.as_array().unwrap().len(), 1);

    let res = app.request("DELETE", &format!("/api/v1/templates/{}", template_id), Some("admin"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    app.request("POST", &format!("/api/v1/templates/{}/stop", template_id), Some("admin"), None).await;
    let res = app.request("DELETE", &format!("/api/v1/templates/{}", template_id), Some("admin"), None).await;
    assert_eq!(res.status(), StatusCode::OK);
}
