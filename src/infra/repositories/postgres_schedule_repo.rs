use crate::domain::{models::schedule::{ClassSchedule, ScheduleFilter}, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepo {
    async fn create(&self, s: &ClassSchedule) -> Result<ClassSchedule, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "INSERT INTO class_schedules (id, class_id, class_name, class_image, instructor_id, instructor_name, location, duration, date, start_hour, start_minute, capacity, booked, is_opened, zoom_link, verification_code, color, template_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING *"
        )
            .bind(&s.id).bind(&s.snapshot.class_id).bind(&s.snapshot.class_name).bind(&s.snapshot.class_image)
            .bind(&s.snapshot.instructor_id).bind(&s.snapshot.instructor_name).bind(&s.snapshot.location).bind(s.snapshot.duration)
            .bind(s.date).bind(s.start_hour).bind(s.start_minute).bind(s.capacity).bind(s.booked).bind(s.is_opened)
            .bind(&s.zoom_link).bind(&s.verification_code).bind(&s.color).bind(&s.template_id).bind(s.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>("SELECT * FROM class_schedules WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "SELECT * FROM class_schedules
             WHERE ($1::DATE IS NULL OR date >= $1) AND ($2::DATE IS NULL OR date <= $2)
             ORDER BY date ASC, start_hour ASC, start_minute ASC"
        )
            .bind(filter.start_date).bind(filter.end_date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_instructor_on(&self, instructor_id: &str, date: NaiveDate) -> Result<Vec<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>("SELECT * FROM class_schedules WHERE instructor_id = $1 AND date = $2").bind(instructor_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_booked_by_instructor(&self, instructor_id: &str) -> Result<Vec<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>("SELECT * FROM class_schedules WHERE instructor_id = $1 AND booked > 0").bind(instructor_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, s: &ClassSchedule) -> Result<Option<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "UPDATE class_schedules SET class_id=$1, class_name=$2, class_image=$3, instructor_id=$4, instructor_name=$5, location=$6, duration=$7,
                date=$8, start_hour=$9, start_minute=$10, capacity=$11, color=$12
             WHERE id=$13 AND booked <= $14
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
            "DELETE FROM class_schedules WHERE id = $1 AND booked = 0
             AND NOT EXISTS (SELECT 1 FROM bookings WHERE class_schedule_id = $2)"
        ).bind(id).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn open(&self, id: &str, zoom_link: Option<String>, verification_code: &str) -> Result<Option<ClassSchedule>, AppError> {
        sqlx::query_as::<_, ClassSchedule>(
            "UPDATE class_schedules SET is_opened = TRUE, zoom_link = $1, verification_code = $2
             WHERE id = $3 AND is_opened = FALSE
             RETURNING *"
        )
            .bind(zoom_link).bind(verification_code).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
