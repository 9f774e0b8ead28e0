mod common;

use class_booking_backend::error::AppError;
use common::{TestApp, INSTRUCTOR_USER};

async fn attended_booking(app: &TestApp, user: &str, schedule_id: &str) -> String {
    app.give_credit(user).await;
    let booking = app.book(user, schedule_id).await.unwrap();
    app.state.booking_service.check_in(user, &booking.id).await.unwrap();
    app.state.booking_service.check_out(user, &booking.id, "CODE42").await.unwrap();
    booking.id
}

async fn opened_schedule(app: &TestApp) -> String {
    let schedule = app.schedule_on("2030-01-07", 9, 0, 10).await;
    app.state.schedule_service
        .open(&schedule.id, INSTRUCTOR_USER, None, Some("CODE42".into()))
        .await
        .unwrap();
    schedule.id
}

async fn instructor_rating(app: &TestApp) -> f64 {
    sqlx::query_scalar("SELECT rating FROM instructors WHERE id = ?")
        .bind(&app.instructor_id)
        .fetch_one(&app.pool).await.unwrap()
}

#[tokio::test]
async fn test_review_requires_attendance() {
    let app = TestApp::new().await;
    let schedule_id = opened_schedule(&app).await;
    app.give_credit("alice").await;
    let booking = app.book("alice", &schedule_id).await.unwrap();

    match app.state.review_service.create("alice", &booking.id, 5, "Great".into()).await {
        Err(AppError::Forbidden(_)) => {}
        other => panic!("expected forbidden, got {:?}", other),
    }

    assert!(matches!(
        app.state.review_service.create("bob", &booking.id, 5, String::new()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_single_review_per_booking() {
    let app = TestApp::new().await;
    let schedule_id = opened_schedule(&app).await;
    let booking_id = attended_booking(&app, "alice", &schedule_id).await;

    let review = app.state.review_service.create("alice", &booking_id, 4, "  Lovely flow  ".into()).await.unwrap();
    assert_eq!(review.rating, 4);
    assert_eq!(review.comment, "Lovely flow");
    assert_eq!(review.instructor_id, app.instructor_id);

    match app.state.review_service.create("alice", &booking_id, 5, String::new()).await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "You have already reviewed this class"),
        other => panic!("expected conflict, got {:?}", other),
    }

    let attendance = app.state.repos.bookings.find_attendance(&booking_id).await.unwrap().unwrap();
    assert!(attendance.is_reviewed);
}

#[tokio::test]
async fn test_rating_out_of_range_rejected() {
    let app = TestApp::new().await;
    let schedule_id = opened_schedule(&app).await;
    let booking_id = attended_booking(&app, "alice", &schedule_id).await;

    for rating in [0, 6] {
        assert!(matches!(
            app.state.review_service.create("alice", &booking_id, rating, String::new()).await,
            Err(AppError::Validation(_))
        ));
    }
}

#[tokio::test]
async fn test_instructor_rating_is_mean_of_reviews() {
    let app = TestApp::new().await;
    let schedule_id = opened_schedule(&app).await;
    let first = attended_booking(&app, "alice", &schedule_id).await;
    let second = attended_booking(&app, "bob", &schedule_id).await;

    app.state.review_service.create("alice", &first, 4, String::new()).await.unwrap();
    assert!((instructor_rating(&app).await - 4.0).abs() < f64::EPSILON);

    app.state.review_service.create("bob", &second, 2, String::new()).await.unwrap();
    assert!((instructor_rating(&app).await - 3.0).abs() < f64::EPSILON);

    let reviews = app.state.review_service.list_by_class(&app.class_id).await.unwrap();
    assert_eq!(reviews.len(), 2);
}
