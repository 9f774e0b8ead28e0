use crate::domain::{models::catalog::{ClassInfo, InstructorInfo, PackageInfo}, ports::CatalogRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCatalogRepo {
    pool: SqlitePool,
}

impl SqliteCatalogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepo {
    async fn find_class(&self, id: &str) -> Result<Option<ClassInfo>, AppError> {
        sqlx::query_as::<_, ClassInfo>("SELECT * FROM classes WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_instructor(&self, id: &str) -> Result<Option<InstructorInfo>, AppError> {
        sqlx::query_as::<_, InstructorInfo>("SELECT * FROM instructors WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_instructor_by_user(&self, user_id: &str) -> Result<Option<InstructorInfo>, AppError> {
        sqlx::query_as::<_, InstructorInfo>("SELECT * FROM instructors WHERE user_id = ?").bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_package(&self, id: &str) -> Result<Option<PackageInfo>, AppError> {
        sqlx::query_as::<_, PackageInfo>("SELECT * FROM packages WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn update_instructor_rating(&self, instructor_id: &str, rating: f64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE instructors SET rating = ? WHERE id = ?").bind(rating).bind(instructor_id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Instructor not found".into())); }
        Ok(())
    }
}
