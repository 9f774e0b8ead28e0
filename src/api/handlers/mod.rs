pub mod booking;
pub mod health;
pub mod review;
pub mod schedule;
pub mod template;
pub mod user_package;
