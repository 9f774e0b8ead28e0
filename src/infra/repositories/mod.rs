pub mod sqlite_booking_repo;
pub mod sqlite_catalog_repo;
pub mod sqlite_review_repo;
pub mod sqlite_schedule_repo;
pub mod sqlite_template_repo;
pub mod sqlite_user_package_repo;

pub mod postgres_booking_repo;
pub mod postgres_catalog_repo;
pub mod postgres_review_repo;
pub mod postgres_schedule_repo;
pub mod postgres_template_repo;
pub mod postgres_user_package_repo;
