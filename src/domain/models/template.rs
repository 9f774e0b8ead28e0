use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::schedule::{ClassSchedule, NewScheduleParams, Snapshot};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleTemplate {
    pub id: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub snapshot: Snapshot,
    /// Weekdays as 0 (Sunday) through 6 (Saturday), stored as a JSON array.
    pub day_of_weeks: Json<Vec<i32>>,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub color: String,
    pub is_active: bool,
    pub end_date: NaiveDate,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub struct NewTemplateParams {
    pub day_of_weeks: Vec<i32>,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub color: String,
    pub end_date: NaiveDate,
}

impl ScheduleTemplate {
    pub fn new(snapshot: Snapshot, params: NewTemplateParams) -> Self {
        let mut days = params.day_of_weeks;
        days.sort_unstable();
        days.dedup();

        Self {
            id: Uuid::new_v4().to_string(),
            snapshot,
            day_of_weeks: Json(days),
            start_hour: params.start_hour,
            start_minute: params.start_minute,
            capacity: params.capacity,
            color: params.color,
            is_active: false,
            end_date: params.end_date,
            last_generated_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn runs_on(&self, weekday: i32) -> bool {
        self.day_of_weeks.0.contains(&weekday)
    }

    pub fn instance_on(&self, date: NaiveDate) -> ClassSchedule {
        let mut schedule = ClassSchedule::new(self.snapshot.clone(), NewScheduleParams {
            date,
            start_hour: self.start_hour,
            start_minute: self.start_minute,
            capacity: self.capacity,
            color: self.color.clone(),
        });
        schedule.template_id = Some(self.id.clone());
        schedule
    }
}
