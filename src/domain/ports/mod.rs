use crate::domain::models::{
    booking::{Attendance, Booking, BookingView, RosterEntry, SweepCandidate},
    catalog::{ClassInfo, InstructorInfo, PackageInfo},
    review::Review,
    schedule::{ClassSchedule, ScheduleFilter},
    template::ScheduleTemplate,
    user_package::{LedgerEntry, PaymentCompleted, UserPackage},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Read access to classes, instructors and packages owned by the catalog layer.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_class(&self, id: &str) -> Result<Option<ClassInfo>, AppError>;
    async fn find_instructor(&self, id: &str) -> Result<Option<InstructorInfo>, AppError>;
    async fn find_instructor_by_user(&self, user_id: &str) -> Result<Option<InstructorInfo>, AppError>;
    async fn find_package(&self, id: &str) -> Result<Option<PackageInfo>, AppError>;
    async fn update_instructor_rating(&self, instructor_id: &str, rating: f64) -> Result<(), AppError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: &ClassSchedule) -> Result<ClassSchedule, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ClassSchedule>, AppError>;
    async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<ClassSchedule>, AppError>;
    async fn list_by_instructor_on(&self, instructor_id: &str, date: NaiveDate) -> Result<Vec<ClassSchedule>, AppError>;
    async fn list_booked_by_instructor(&self, instructor_id: &str) -> Result<Vec<ClassSchedule>, AppError>;
    /// Returns `None` when the row is gone or already holds more bookings than the new capacity.
    async fn update(&self, schedule: &ClassSchedule) -> Result<Option<ClassSchedule>, AppError>;
    /// Deletes only while no booking references the schedule. Returns whether a row was removed.
    async fn delete_unbooked(&self, id: &str) -> Result<bool, AppError>;
    /// One-way transition to opened. Returns `None` if the schedule was already opened.
    async fn open(&self, id: &str, zoom_link: Option<String>, verification_code: &str) -> Result<Option<ClassSchedule>, AppError>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, template: &ScheduleTemplate) -> Result<ScheduleTemplate, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleTemplate>, AppError>;
    async fn list(&self) -> Result<Vec<ScheduleTemplate>, AppError>;
    async fn list_active(&self) -> Result<Vec<ScheduleTemplate>, AppError>;
    async fn list_active_by_instructor(&self, instructor_id: &str) -> Result<Vec<ScheduleTemplate>, AppError>;
    /// Updates an inactive template. Returns `None` if it is active or missing.
    async fn update_inactive(&self, template: &ScheduleTemplate) -> Result<Option<ScheduleTemplate>, AppError>;
    /// Flips `is_active` only when it currently holds the opposite value.
    async fn set_active(&self, id: &str, active: bool) -> Result<Option<ScheduleTemplate>, AppError>;
    async fn mark_generated(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError>;
    async fn delete_inactive(&self, id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking and its attendance while spending one credit and one seat,
    /// all in one transaction.
    async fn create_with_attendance(
        &self,
        booking: &Booking,
        attendance: &Attendance,
        now: DateTime<Utc>,
    ) -> Result<Booking, AppError>;
    async fn find_view(&self, user_id: &str, booking_id: &str) -> Result<Option<BookingView>, AppError>;
    async fn list_views_by_user(&self, user_id: &str, limit: i64, offset: i64) -> Result<Vec<BookingView>, AppError>;
    async fn count_by_user(&self, user_id: &str) -> Result<i64, AppError>;
    async fn schedule_ids_booked_by(&self, user_id: &str) -> Result<Vec<String>, AppError>;
    async fn find_attendance(&self, booking_id: &str) -> Result<Option<Attendance>, AppError>;
    async fn check_in(&self, booking_id: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
    async fn check_out(&self, booking_id: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
    async fn roster(&self, schedule_id: &str) -> Result<Vec<RosterEntry>, AppError>;
    /// Bookings on or before `up_to` whose attendance was never marked.
    async fn sweep_candidates(&self, up_to: NaiveDate) -> Result<Vec<SweepCandidate>, AppError>;
    async fn mark_absent(&self, booking_id: &str, now: DateTime<Utc>) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserPackageRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserPackage>, AppError>;
    async fn find_active(&self, user_id: &str, package_id: &str, now: DateTime<Utc>) -> Result<Option<UserPackage>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<UserPackage>, AppError>;
    async fn find_ledger_entry(&self, payment_id: &str) -> Result<Option<LedgerEntry>, AppError>;
    /// Tops up the active row for the payment's (user, package), or creates one, and
    /// records the payment in the ledger. Returns `None` if the payment id was already applied.
    async fn apply_payment(
        &self,
        payment: &PaymentCompleted,
        package: &PackageInfo,
        now: DateTime<Utc>,
    ) -> Result<Option<UserPackage>, AppError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Inserts the review and flags the attendance as reviewed. Returns `None` if
    /// the booking was already reviewed.
    async fn create(&self, review: &Review) -> Result<Option<Review>, AppError>;
    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Review>, AppError>;
    async fn average_for_instructor(&self, instructor_id: &str) -> Result<Option<f64>, AppError>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_to_user(&self, user_id: &str, kind: &str, title: &str, message: &str) -> Result<(), AppError>;
}
