mod common;

use class_booking_backend::error::AppError;
use common::{default_now, TestApp, INSTRUCTOR_USER};

#[tokio::test]
async fn test_check_in_and_out_flow() {
    let app = TestApp::new().await;
    app.give_credit("alice").await;
    let schedule = app.schedule_on("2030-01-07", 9, 0, 10).await;
    let booking = app.book("alice", &schedule.id).await.unwrap();

    match app.state.booking_service.check_in("alice", &booking.id).await {
        Err(AppError::Forbidden(msg)) => assert_eq!(msg, "Class schedule is not opened yet"),
        other => panic!("expected forbidden, got {:?}", other),
    }

    let opened = app.state.schedule_service
        .open(&schedule.id, INSTRUCTOR_USER, Some("https://zoom.example/j/1".into()), Some("ABC123".into()))
        .await
        .unwrap();
    assert!(opened.is_opened);
    assert_eq!(opened.verification_code.as_deref(), Some("ABC123"));

    match app.state.booking_service.check_out("alice", &booking.id, "ABC123").await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "You have not checked in to this class"),
        other => panic!("expected conflict, got {:?}", other),
    }

    let entered = app.state.booking_service.check_in("alice", &booking.id).await.unwrap();
    assert_eq!(entered.status, "entered");
    assert!(entered.checked_in);
    assert!(entered.checked_at.is_some());

    assert!(matches!(
        app.state.booking_service.check_in("alice", &booking.id).await,
        Err(AppError::Conflict(_))
    ));

    for wrong in ["WRONG1", " ABC123", "abc123"] {
        match app.state.booking_service.check_out("alice", &booking.id, wrong).await {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Invalid verification code"),
            other => panic!("expected validation error for {:?}, got {:?}", wrong, other),
        }
    }
    let unchanged = app.state.repos.bookings.find_attendance(&booking.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, "entered");
    assert!(unchanged.checked_in);
    assert!(!unchanged.checked_out);
    assert!(unchanged.verified_at.is_none());

    let attended = app.state.booking_service.check_out("alice", &booking.id, "ABC123").await.unwrap();
    assert_eq!(attended.status, "attended");
    assert!(attended.checked_out);
    assert!(attended.verified_at.is_some());

    assert!(matches!(
        app.state.booking_service.check_out("alice", &booking.id, "ABC123").await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_only_the_assigned_instructor_opens_once() {
    let app = TestApp::new().await;
    app.seed_instructor("someone-else", "Citra Dewi").await;
    let schedule = app.schedule_on("2030-01-07", 9, 0, 10).await;

    assert!(matches!(
        app.state.schedule_service.open(&schedule.id, "someone-else", None, None).await,
        Err(AppError::Forbidden(_))
    ));

    let opened = app.state.schedule_service.open(&schedule.id, INSTRUCTOR_USER, None, None).await.unwrap();
    let code = opened.verification_code.unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(opened.zoom_link.is_none());

    assert!(matches!(
        app.state.schedule_service.open(&schedule.id, INSTRUCTOR_USER, None, None).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_roster_lists_attendance_for_instructor() {
    let app = TestApp::new().await;
    let schedule = app.schedule_on("2030-01-07", 9, 0, 10).await;
    for user in ["alice", "bob"] {
        app.give_credit(user).await;
        app.book(user, &schedule.id).await.unwrap();
    }

    let roster = app.state.schedule_service.roster(&schedule.id, INSTRUCTOR_USER).await.unwrap();
    assert_eq!(roster.len(), 2);
    assert!(roster.iter().all(|r| r.status == "not-join"));

    assert!(matches!(
        app.state.schedule_service.roster(&schedule.id, "alice").await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_absence_sweep_marks_ended_classes_once() {
    // Clock is 2030-01-06 03:00 UTC.
    let app = TestApp::new().await;
    for user in ["alice", "bob", "carol", "dave"] {
        app.give_credit(user).await;
    }

    let yesterday = app.insert_schedule("2030-01-05", 9, 0, 10).await;
    let ended_today = app.insert_schedule("2030-01-06", 2, 0, 10).await;
    let later_today = app.schedule_on("2030-01-06", 5, 0, 10).await;

    let missed = app.book("alice", &yesterday.id).await.unwrap();
    let present = app.book("bob", &yesterday.id).await.unwrap();
    let just_ended = app.book("carol", &ended_today.id).await.unwrap();
    let upcoming = app.book("dave", &later_today.id).await.unwrap();

    app.state.schedule_service.open(&yesterday.id, INSTRUCTOR_USER, None, None).await.unwrap();
    app.state.booking_service.check_in("bob", &present.id).await.unwrap();

    let report = app.state.booking_service.sweep_absent().await.unwrap();
    assert_eq!(report.marked_absent, 2);
    assert!(report.failures.is_empty());

    let status = |id: String| {
        let repo = app.state.repos.bookings.clone();
        async move { repo.find_attendance(&id).await.unwrap().unwrap().status }
    };
    assert_eq!(status(missed.id.clone()).await, "absent");
    assert_eq!(status(present.id.clone()).await, "entered");
    assert_eq!(status(just_ended.id.clone()).await, "absent");
    assert_eq!(status(upcoming.id.clone()).await, "not-join");

    let again = app.state.booking_service.sweep_absent().await.unwrap();
    assert_eq!(again.marked_absent, 0);
}

#[tokio::test]
async fn test_absent_booking_cannot_check_in() {
    let app = TestApp::new().await;
    app.give_credit("alice").await;
    let schedule = app.insert_schedule("2030-01-05", 9, 0, 10).await;
    let booking = app.book("alice", &schedule.id).await.unwrap();

    app.state.booking_service.sweep_absent().await.unwrap();
    app.state.schedule_service.open(&schedule.id, INSTRUCTOR_USER, None, None).await.unwrap();

    match app.state.booking_service.check_in("alice", &booking.id).await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Attendance is already absent"),
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sweep_creates_missing_attendance_at_clock_time() {
    let app = TestApp::new().await;
    app.give_credit("alice").await;
    let schedule = app.insert_schedule("2030-01-05", 9, 0, 10).await;
    let booking = app.book("alice", &schedule.id).await.unwrap();
    sqlx::query("DELETE FROM attendances WHERE booking_id = ?")
        .bind(&booking.id)
        .execute(&app.pool).await.unwrap();

    let report = app.state.booking_service.sweep_absent().await.unwrap();
    assert_eq!(report.marked_absent, 1);

    let attendance = app.state.repos.bookings.find_attendance(&booking.id).await.unwrap().unwrap();
    assert_eq!(attendance.status, "absent");
    assert_eq!(attendance.created_at, default_now());
}
