use class_booking_backend::{
    api::router::create_router,
    config::Config,
    domain::{
        models::{booking::Booking, schedule::{ClassSchedule, NewScheduleParams, Snapshot}},
        ports::NotificationService,
        services::{
            conflict::ConflictWindow,
            recurrence::Clock,
            schedule_service::ScheduleInput,
        },
    },
    error::AppError,
    infra::factory::sqlite_repositories,
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
    Router,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::str::FromStr;
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::Value;

pub const INTERNAL_TOKEN: &str = "test-internal-token";
pub const INSTRUCTOR_USER: &str = "instructor-user";

/// 2030-01-06 is a Sunday.
pub fn default_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 6, 3, 0, 0).unwrap()
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub struct SentNotification {
    pub user_id: String,
    pub kind: String,
    pub title: String,
}

#[derive(Default)]
pub struct MockNotificationService {
    pub sent: Mutex<Vec<SentNotification>>,
    pub fail: bool,
}

#[async_trait]
impl NotificationService for MockNotificationService {
    async fn send_to_user(&self, user_id: &str, kind: &str, title: &str, _message: &str) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::InternalWithMsg("notification service unavailable".into()));
        }
        self.sent.lock().unwrap().push(SentNotification {
            user_id: user_id.to_string(),
            kind: kind.to_string(),
            title: title.to_string(),
        });
        Ok(())
    }
}

pub struct TestOptions {
    pub now: DateTime<Utc>,
    pub window: ConflictWindow,
    pub failing_notifier: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self { now: default_now(), window: ConflictWindow::Fixed, failing_notifier: false }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub notifier: Arc<MockNotificationService>,
    pub class_id: String,
    pub instructor_id: String,
    pub package_id: String,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_options(options: TestOptions) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            timezone: chrono_tz::UTC,
            notification_service_url: None,
            notification_service_token: String::new(),
            internal_api_token: INTERNAL_TOKEN.to_string(),
            generation_interval_secs: 3600,
            absence_sweep_interval_secs: 3600,
            conflict_window: options.window,
        };

        let notifier = Arc::new(MockNotificationService { fail: options.failing_notifier, ..Default::default() });
        let clock = Clock::fixed(chrono_tz::UTC, options.now);
        let state = Arc::new(AppState::build(config, sqlite_repositories(pool.clone()), notifier.clone(), clock));
        let router = create_router(state.clone());

        let mut app = Self {
            router,
            pool,
            db_filename,
            state,
            notifier,
            class_id: String::new(),
            instructor_id: String::new(),
            package_id: String::new(),
        };
        app.class_id = app.seed_class("Morning Yoga", 60).await;
        app.instructor_id = app.seed_instructor(INSTRUCTOR_USER, "Ayu Lestari").await;
        app.package_id = app.seed_package("Ten Pack", 10, 30).await;
        app
    }

    pub async fn seed_class(&self, title: &str, duration: i32) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO classes (id, title, image, duration, location, created_at) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(&id).bind(title).bind("yoga.png").bind(duration).bind("Studio A").bind(Utc::now())
            .execute(&self.pool).await.unwrap();
        id
    }

    pub async fn seed_instructor(&self, user_id: &str, fullname: &str) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO instructors (id, user_id, fullname, rating, created_at) VALUES (?, ?, ?, 0, ?)")
            .bind(&id).bind(user_id).bind(fullname).bind(Utc::now())
            .execute(&self.pool).await.unwrap();
        id
    }

    pub async fn seed_package(&self, name: &str, credit: i32, valid_days: i32) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO packages (id, name, credit, valid_days, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&id).bind(name).bind(credit).bind(valid_days).bind(Utc::now())
            .execute(&self.pool).await.unwrap();
        id
    }

    /// Credits the default package to `user_id` through the payment ledger.
    pub async fn give_credit(&self, user_id: &str) {
        let payment = class_booking_backend::domain::models::user_package::PaymentCompleted {
            payment_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            package_id: self.package_id.clone(),
            amount: 100.0,
        };
        self.state.ledger_service.apply_payment(&payment).await.unwrap();
    }

    pub async fn set_credit(&self, user_id: &str, credit: i32) {
        sqlx::query("UPDATE user_packages SET remaining_credit = ? WHERE user_id = ?")
            .bind(credit).bind(user_id)
            .execute(&self.pool).await.unwrap();
    }

    pub async fn remaining_credit(&self, user_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COALESCE(SUM(remaining_credit), 0) FROM user_packages WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool).await.unwrap()
    }

    pub async fn schedule_on(&self, day: &str, hour: i32, minute: i32, capacity: i32) -> ClassSchedule {
        self.state.schedule_service.create(ScheduleInput {
            class_id: self.class_id.clone(),
            instructor_id: self.instructor_id.clone(),
            date: date(day),
            start_hour: hour,
            start_minute: minute,
            capacity,
            color: "#22c55e".into(),
        }).await.unwrap()
    }

    /// Writes a schedule straight to the repository, skipping the past-date and conflict checks.
    pub async fn insert_schedule(&self, day: &str, hour: i32, minute: i32, capacity: i32) -> ClassSchedule {
        let class = self.state.repos.catalog.find_class(&self.class_id).await.unwrap().unwrap();
        let instructor = self.state.repos.catalog.find_instructor(&self.instructor_id).await.unwrap().unwrap();
        let schedule = ClassSchedule::new(Snapshot::capture(&class, &instructor), NewScheduleParams {
            date: date(day),
            start_hour: hour,
            start_minute: minute,
            capacity,
            color: String::new(),
        });
        self.state.repos.schedules.create(&schedule).await.unwrap()
    }

    pub async fn book(&self, user_id: &str, schedule_id: &str) -> Result<Booking, AppError> {
        self.state.booking_service.create(user_id, &self.package_id, schedule_id).await
    }

    pub async fn booked_count(&self, schedule_id: &str) -> i64 {
        sqlx::query_scalar("SELECT booked FROM class_schedules WHERE id = ?")
            .bind(schedule_id)
            .fetch_one(&self.pool).await.unwrap()
    }

    pub async fn request(&self, method: &str, uri: &str, user_id: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("X-User-Id", user_id);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
