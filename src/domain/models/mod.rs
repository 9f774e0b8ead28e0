pub mod booking;
pub mod catalog;
pub mod pagination;
pub mod review;
pub mod schedule;
pub mod template;
pub mod user_package;
