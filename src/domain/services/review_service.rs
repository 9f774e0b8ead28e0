use std::sync::Arc;
use tracing::info;
use crate::domain::models::{
    booking::ATTENDANCE_ATTENDED,
    review::{NewReviewParams, Review},
};
use crate::domain::ports::{BookingRepository, CatalogRepository, ReviewRepository};
use crate::error::AppError;

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    bookings: Arc<dyn BookingRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        bookings: Arc<dyn BookingRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self { reviews, bookings, catalog }
    }

    /// One review per attended booking; refreshes the instructor's mean rating.
    pub async fn create(&self, user_id: &str, booking_id: &str, rating: i32, comment: String) -> Result<Review, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation("Rating must be between 1 and 5".into()));
        }

        let view = self.bookings.find_view(user_id, booking_id).await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
        if view.is_reviewed {
            return Err(AppError::Conflict("You have already reviewed this class".into()));
        }
        if view.attendance_status != ATTENDANCE_ATTENDED {
            return Err(AppError::Forbidden("Only attended classes can be reviewed".into()));
        }

        let review = Review::new(NewReviewParams {
            user_id: user_id.to_string(),
            booking_id: view.id.clone(),
            class_id: view.class_id.clone(),
            instructor_id: view.instructor_id.clone(),
            rating,
            comment: comment.trim().to_string(),
        });

        let created = self.reviews.create(&review).await?
            .ok_or_else(|| AppError::Conflict("You have already reviewed this class".into()))?;

        let average = self.reviews.average_for_instructor(&view.instructor_id).await?.unwrap_or(0.0);
        self.catalog.update_instructor_rating(&view.instructor_id, average).await?;
        info!(instructor_id = %view.instructor_id, rating = average, "Instructor rating recomputed");

        Ok(created)
    }

    pub async fn list_by_class(&self, class_id: &str) -> Result<Vec<Review>, AppError> {
        self.reviews.list_by_class(class_id).await
    }
}
