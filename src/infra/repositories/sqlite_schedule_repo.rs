use crate::domain::{models::schedule::{ClassSchedule, ScheduleFilter}, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepo {
    async fn create(&self, s: &ClassSchedule) -> Result<ClassSchedule, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "INSERT INTO class_schedules (id, class_id, class_name, class_image, instructor_id, instructor_name, location, duration, date, start_hour, start_minute, capacity, booked, is_opened, zoom_link, verification_code, color, template_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&s.id).bind(&s.snapshot.class_id).bind(&s.snapshot.class_name).bind(&s.snapshot.class_image)
            .bind(&s.snapshot.instructor_id).bind(&s.snapshot.instructor_name).bind(&s.snapshot.location).bind(s.snapshot.duration)
            .bind(s.date).bind(s.start_hour).bind(s.start_minute).bind(s.capacity).bind(s.booked).bind(s.is_opened)
            .bind(&s.zoom_link).bind(&s.verification_code).bind(&s.color).bind(&s.template_id).bind(s.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>("SELECT * FROM class_schedules WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "SELECT * FROM class_schedules
             WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)
             ORDER BY date ASC, start_hour ASC, start_minute ASC"
        )
            .bind(filter.start_date).bind(filter.end_date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_instructor_on(&self, instructor_id: &str, date: NaiveDate) -> Result<Vec<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>("SELECT * FROM class_schedules WHERE instructor_id = ? AND date = ?").bind(instructor_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_booked_by_instructor(&self, instructor_id: &str) -> Result<Vec<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>("SELECT * FROM class_schedules WHERE instructor_id = ? AND booked > 0").bind(instructor_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, s: &ClassSchedule) -> Result<Option<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "UPDATE class_schedules SET class_id=?, class_name=?, class_image=?, instructor_id=?, instructor_name=?, location=?, duration=?,
                date=?, start_hour=?, start_minute=?, capacity=?, color=?
             WHERE id=? AND booked <= ?
             RETURNING *"
        )
            .bind(&s.snapshot.class_id).bind(&s.snapshot.class_name).bind(&s.snapshot.class_image)
            .bind(&s.snapshot.instructor_id).bind(&s.snapshot.instructor_name).bind(&s.snapshot.location).bind(s.snapshot.duration)
            .bind(s.date).bind(s.start_hour).bind(s.start_minute).bind(s.capacity).bind(&s.color)
            .bind(&s.id).bind(s.capacity)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn delete_unbooked(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM class_schedules WHERE id = ? AND booked = 0
             AND NOT EXISTS (SELECT 1 FROM bookings WHERE class_schedule_id = ?)"
        ).bind(id).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn open(&self, id: &str, zoom_link: Option<String>, verification_code: &str) -> Result<Option<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "UPDATE class_schedules SET is_opened = TRUE, zoom_link = ?, verification_code = ?
             WHERE id = ? AND is_opened = FALSE
             RETURNING *"
        )
            .bind(zoom_link).bind(verification_code).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
