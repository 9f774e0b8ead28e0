use crate::domain::{models::template::ScheduleTemplate, ports::TemplateRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteTemplateRepo {
    pool: SqlitePool,
}

impl SqliteTemplateRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for SqliteTemplateRepo {
    async fn create(&self, t: &ScheduleTemplate) -> Result<ScheduleTemplate, AppError> {
        sqlx::query_as::<_, ScheduleTemplate>(
            "INSERT INTO schedule_templates (id, class_id, class_name, class_image, instructor_id, instructor_name, location, duration, day_of_weeks, start_hour, start_minute, capacity, color, is_active, end_date, last_generated_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&t.id).bind(&t.snapshot.class_id).bind(&t.snapshot.class_name).bind(&t.snapshot.class_image)
            .bind(&t.snapshot.instructor_id).bind(&t.snapshot.instructor_name).bind(&t.snapshot.location).bind(t.snapshot.duration)
            .bind(&t.day_of_weeks).bind(t.start_hour).bind(t.start_minute).bind(t.capacity).bind(&t.color)
            .bind(t.is_active).bind(t.end_date).bind(t.last_generated_at).bind(t.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleTemplate>, AppError> {
        sqlx::query_as::<_, ScheduleTemplate>("SELECT * FROM schedule_templates WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self) -> Result<Vec<ScheduleTemplate>, AppError> {
        sqlx::query_as::<_, ScheduleTemplate>("SELECT * FROM schedule_templates ORDER BY created_at DESC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active(&self) -> Result<Vec<ScheduleTemplate>, AppError> {
        sqlx::query_as::<_, ScheduleTemplate>("SELECT * FROM schedule_templates WHERE is_active = TRUE ORDER BY created_at ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active_by_instructor(&self, instructor_id: &str) -> Result<Vec<ScheduleTemplate>, AppError> {
        sqlx::query_as::<_, ScheduleTemplate>("SELECT * FROM schedule_templates WHERE is_active = TRUE AND instructor_id = ?").bind(instructor_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update_inactive(&self, t: &ScheduleTemplate) -> Result<Option<ScheduleTemplate>, AppError> {
        sqlx::query_as::<_, ScheduleTemplate>(
            "UPDATE schedule_templates SET class_id=?, class_name=?, class_image=?, instructor_id=?, instructor_name=?, location=?, duration=?,
                day_of_weeks=?, start_hour=?, start_minute=?, capacity=?, color=?, end_date=?
             WHERE id=? AND is_active = FALSE
             RETURNING *"
        )
            .bind(&t.snapshot.class_id).bind(&t.snapshot.class_name).bind(&t.snapshot.class_image)
            .bind(&t.snapshot.instructor_id).bind(&t.snapshot.instructor_name).bind(&t.snapshot.location).bind(t.snapshot.duration)
            .bind(&t.day_of_weeks).bind(t.start_hour).bind(t.start_minute).bind(t.capacity).bind(&t.color).bind(t.end_date)
            .bind(&t.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn set_active(&self, id: &str, active: bool) -> Result<Option<ScheduleTemplate>, AppError> {
        sqlx::query_as::<_, ScheduleTemplate>("UPDATE schedule_templates SET is_active = ? WHERE id = ? AND is_active = ? RETURNING *")
            .bind(active).bind(id).bind(!active)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_generated(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE schedule_templates SET last_generated_at = ? WHERE id = ?").bind(at).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
    async fn delete_inactive(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM schedule_templates WHERE id = ? AND is_active = FALSE").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
