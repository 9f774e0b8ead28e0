use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub booking_id: String,
    pub class_id: String,
    pub instructor_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewReviewParams {
    pub user_id: String,
    pub booking_id: String,
    pub class_id: String,
    pub instructor_id: String,
    pub rating: i32,
    pub comment: String,
}

impl Review {
    pub fn new(params: NewReviewParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            booking_id: params.booking_id,
            class_id: params.class_id,
            instructor_id: params.instructor_id,
            rating: params.rating,
            comment: params.comment,
            created_at: Utc::now(),
        }
    }
}
