use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::catalog::{ClassInfo, InstructorInfo};

/// Class and instructor fields copied onto schedules and templates at write time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Snapshot {
    pub class_id: String,
    pub class_name: String,
    pub class_image: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub location: String,
    pub duration: i32,
}

impl Snapshot {
    pub fn capture(class: &ClassInfo, instructor: &InstructorInfo) -> Self {
        Self {
            class_id: class.id.clone(),
            class_name: class.title.clone(),
            class_image: class.image.clone(),
            instructor_id: instructor.id.clone(),
            instructor_name: instructor.fullname.clone(),
            location: class.location.clone(),
            duration: class.duration,
        }
    }

    pub fn set_class(&mut self, class: &ClassInfo) {
        self.class_id = class.id.clone();
        self.class_name = class.title.clone();
        self.class_image = class.image.clone();
        self.location = class.location.clone();
        self.duration = class.duration;
    }

    pub fn set_instructor(&mut self, instructor: &InstructorInfo) {
        self.instructor_id = instructor.id.clone();
        self.instructor_name = instructor.fullname.clone();
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ClassSchedule {
    pub id: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub date: NaiveDate,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub booked: i32,
    pub is_opened: bool,
    pub zoom_link: Option<String>,
    pub verification_code: Option<String>,
    pub color: String,
    /// Template this schedule was generated from, if any.
    pub template_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewScheduleParams {
    pub date: NaiveDate,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub color: String,
}

impl ClassSchedule {
    pub fn new(snapshot: Snapshot, params: NewScheduleParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            snapshot,
            date: params.date,
            start_hour: params.start_hour,
            start_minute: params.start_minute,
            capacity: params.capacity,
            booked: 0,
            is_opened: false,
            zoom_link: None,
            verification_code: None,
            color: params.color,
            template_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn has_spare_seat(&self) -> bool {
        self.booked < self.capacity
    }
}

/// Optional date window for the public schedule listing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ScheduleFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
