use crate::domain::{models::review::Review, ports::ReviewRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresReviewRepo {
    pool: PgPool,
}

impl PostgresReviewRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepo {
    async fn create(&self, review: &Review) -> Result<Option<Review>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let flagged = sqlx::query(
            "UPDATE attendances SET is_reviewed = TRUE WHERE booking_id = $1 AND is_reviewed = FALSE AND status = 'attended'"
        ).bind(&review.booking_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if flagged.rows_affected() == 0 { return Ok(None); }

        let created = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, user_id, booking_id, class_id, instructor_id, rating, comment, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *"
        )
            .bind(&review.id).bind(&review.user_id).bind(&review.booking_id).bind(&review.class_id)
            .bind(&review.instructor_id).bind(review.rating).bind(&review.comment).bind(review.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(created))
    }
    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Review>, AppError> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE class_id = $1 ORDER BY created_at DESC").bind(class_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn average_for_instructor(&self, instructor_id: &str) -> Result<Option<f64>, AppError> {
        sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(rating)::DOUBLE PRECISION FROM reviews WHERE instructor_id = $1")
            .bind(instructor_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
