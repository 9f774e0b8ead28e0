pub mod booking_service;
pub mod conflict;
pub mod ledger_service;
pub mod recurrence;
pub mod review_service;
pub mod schedule_service;
pub mod template_service;
