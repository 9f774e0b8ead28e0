use chrono::NaiveDate;
use serde::Deserialize;
use crate::domain::models::{pagination::PageParams, schedule::ScheduleFilter};
use crate::domain::services::recurrence::parse_date;
use crate::domain::services::schedule_service::{InstructorScheduleQuery, ScheduleInput, ScheduleSort, ScheduleStatus};
use crate::domain::services::template_service::TemplateInput;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub class_id: String,
    pub instructor_id: String,
    pub date: String,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub color: Option<String>,
}

impl ScheduleRequest {
    pub fn into_input(self) -> Result<ScheduleInput, AppError> {
        Ok(ScheduleInput {
            date: parse_date(&self.date)?,
            class_id: self.class_id,
            instructor_id: self.instructor_id,
            start_hour: self.start_hour,
            start_minute: self.start_minute,
            capacity: self.capacity,
            color: self.color.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
pub struct TemplateRequest {
    pub class_id: String,
    pub instructor_id: String,
    pub day_of_weeks: Vec<i32>,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub color: Option<String>,
    pub end_date: String,
}

impl TemplateRequest {
    pub fn into_input(self) -> Result<TemplateInput, AppError> {
        Ok(TemplateInput {
            end_date: parse_date(&self.end_date)?,
            class_id: self.class_id,
            instructor_id: self.instructor_id,
            day_of_weeks: self.day_of_weeks,
            start_hour: self.start_hour,
            start_minute: self.start_minute,
            capacity: self.capacity,
            color: self.color.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize, Default)]
pub struct ScheduleListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ScheduleListQuery {
    pub fn into_filter(self) -> Result<ScheduleFilter, AppError> {
        let parse = |raw: Option<String>| -> Result<Option<NaiveDate>, AppError> {
            raw.filter(|s| !s.trim().is_empty()).map(|s| parse_date(&s)).transpose()
        };
        Ok(ScheduleFilter {
            start_date: parse(self.start_date)?,
            end_date: parse(self.end_date)?,
        })
    }
}

#[derive(Deserialize, Default)]
pub struct InstructorScheduleParams {
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl InstructorScheduleParams {
    pub fn into_query(self) -> Result<InstructorScheduleQuery, AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some("upcoming") => Some(ScheduleStatus::Upcoming),
            Some("past") => Some(ScheduleStatus::Past),
            Some(other) => return Err(AppError::Validation(format!("Unknown status '{}'", other))),
        };
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => ScheduleSort::default(),
            Some(raw) => raw.parse()?,
        };
        Ok(InstructorScheduleQuery {
            status,
            sort,
            page: PageParams { page: self.page, limit: self.limit },
        })
    }
}

#[derive(Deserialize, Default)]
pub struct OpenScheduleRequest {
    pub zoom_link: Option<String>,
    pub verification_code: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub package_id: String,
    pub class_schedule_id: String,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub verification_code: String,
}

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub booking_id: String,
    pub rating: i32,
    pub comment: Option<String>,
}
