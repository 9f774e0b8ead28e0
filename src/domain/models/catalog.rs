use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ClassInfo {
    pub id: String,
    pub title: String,
    pub image: String,
    pub duration: i32,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct InstructorInfo {
    pub id: String,
    pub user_id: String,
    pub fullname: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PackageInfo {
    pub id: String,
    pub name: String,
    pub credit: i32,
    pub valid_days: i32,
    pub created_at: DateTime<Utc>,
}
