use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::NotificationService;
use crate::domain::services::recurrence::Clock;
use crate::error::AppError;
use crate::state::{AppState, Repositories};
use crate::infra::notification::http_notification_service::{HttpNotificationService, LogOnlyNotificationService};
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_catalog_repo::PostgresCatalogRepo,
    postgres_review_repo::PostgresReviewRepo, postgres_schedule_repo::PostgresScheduleRepo,
    postgres_template_repo::PostgresTemplateRepo, postgres_user_package_repo::PostgresUserPackageRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_catalog_repo::SqliteCatalogRepo,
    sqlite_review_repo::SqliteReviewRepo, sqlite_schedule_repo::SqliteScheduleRepo,
    sqlite_template_repo::SqliteTemplateRepo, sqlite_user_package_repo::SqliteUserPackageRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let database_url = &config.database_url;

    let notifier: Arc<dyn NotificationService> = match &config.notification_service_url {
        Some(url) => Arc::new(HttpNotificationService::new(url.clone(), config.notification_service_token.clone())),
        None => {
            warn!("NOTIFICATION_SERVICE_URL not set, notifications will only be logged");
            Arc::new(LogOnlyNotificationService)
        }
    };

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().map_err(AppError::Database)?;
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .map_err(AppError::Database)?;

        run_postgres_migrations(&pool).await?;
        postgres_repositories(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(AppError::Database)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(AppError::Database)?;

        run_sqlite_migrations(&pool).await?;
        sqlite_repositories(pool)
    };

    info!(timezone = %config.timezone, window = ?config.conflict_window, "Scheduling engine configured");
    Ok(AppState::build(config.clone(), repos, notifier, Clock::new(config.timezone)))
}

pub fn sqlite_repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        catalog: Arc::new(SqliteCatalogRepo::new(pool.clone())),
        schedules: Arc::new(SqliteScheduleRepo::new(pool.clone())),
        templates: Arc::new(SqliteTemplateRepo::new(pool.clone())),
        bookings: Arc::new(SqliteBookingRepo::new(pool.clone())),
        user_packages: Arc::new(SqliteUserPackageRepo::new(pool.clone())),
        reviews: Arc::new(SqliteReviewRepo::new(pool)),
    }
}

pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        catalog: Arc::new(PostgresCatalogRepo::new(pool.clone())),
        schedules: Arc::new(PostgresScheduleRepo::new(pool.clone())),
        templates: Arc::new(PostgresTemplateRepo::new(pool.clone())),
        bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
        user_packages: Arc::new(PostgresUserPackageRepo::new(pool.clone())),
        reviews: Arc::new(PostgresReviewRepo::new(pool)),
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run Postgres migrations: {}", e)))
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run SQLite migrations: {}", e)))
}
