use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

pub const BOOKING_BOOKED: &str = "booked";

pub const ATTENDANCE_NOT_JOIN: &str = "not-join";
pub const ATTENDANCE_ATTENDED: &str = "attended";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub class_schedule_id: String,
    pub user_package_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(user_id: String, class_schedule_id: String, user_package_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            class_schedule_id,
            user_package_id,
            status: BOOKING_BOOKED.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Attendance {
    pub id: String,
    pub booking_id: String,
    pub status: String,
    pub checked_in: bool,
    pub checked_out: bool,
    pub is_reviewed: bool,
    pub checked_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Attendance {
    pub fn for_booking(booking_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            status: ATTENDANCE_NOT_JOIN.to_string(),
            checked_in: false,
            checked_out: false,
            is_reviewed: false,
            checked_at: None,
            verified_at: None,
            created_at: Utc::now(),
        }
    }
}

/// A booking joined with its attendance row and schedule snapshot.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingView {
    pub id: String,
    pub user_id: String,
    pub class_schedule_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub class_id: String,
    pub class_name: String,
    pub class_image: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub location: String,
    pub duration: i32,
    pub date: NaiveDate,
    pub start_hour: i32,
    pub start_minute: i32,
    pub is_opened: bool,
    pub zoom_link: Option<String>,
    pub attendance_status: String,
    pub checked_in: bool,
    pub checked_out: bool,
    pub is_reviewed: bool,
    pub checked_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Roster row for an instructor looking at one schedule.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RosterEntry {
    pub booking_id: String,
    pub user_id: String,
    pub status: String,
    pub checked_in: bool,
    pub checked_out: bool,
    pub checked_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// A booking that has not been marked yet, with enough of its schedule to compute the end time.
#[derive(Debug, FromRow, Clone)]
pub struct SweepCandidate {
    pub booking_id: String,
    pub date: NaiveDate,
    pub start_hour: i32,
    pub start_minute: i32,
    pub duration: i32,
}
