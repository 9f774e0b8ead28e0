use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use chrono::NaiveDate;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::domain::models::{
    booking::RosterEntry,
    catalog::InstructorInfo,
    pagination::{PageParams, Paginated},
    schedule::{ClassSchedule, NewScheduleParams, ScheduleFilter, Snapshot},
};
use crate::domain::ports::{BookingRepository, CatalogRepository, ScheduleRepository};
use crate::domain::services::conflict::{ConflictChecker, SlotProbe};
use crate::domain::services::recurrence::{validate_time_of_day, Clock};
use crate::domain::services::template_service::{GenerationReport, TemplateInput, TemplateService};
use crate::error::AppError;

const VERIFICATION_CODE_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub class_id: String,
    pub instructor_id: String,
    pub date: NaiveDate,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: ClassSchedule,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Upcoming,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSort {
    NameAsc,
    NameDesc,
    DateAsc,
    #[default]
    DateDesc,
}

impl FromStr for ScheduleSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name_asc" => Ok(ScheduleSort::NameAsc),
            "name_desc" => Ok(ScheduleSort::NameDesc),
            "date_asc" => Ok(ScheduleSort::DateAsc),
            "date_desc" => Ok(ScheduleSort::DateDesc),
            other => Err(AppError::Validation(format!("Unknown sort '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstructorScheduleQuery {
    pub status: Option<ScheduleStatus>,
    pub sort: ScheduleSort,
    pub page: PageParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurringCreated {
    pub template_id: String,
    pub generation: GenerationReport,
}

pub struct ScheduleService {
    schedules: Arc<dyn ScheduleRepository>,
    bookings: Arc<dyn BookingRepository>,
    catalog: Arc<dyn CatalogRepository>,
    conflicts: Arc<ConflictChecker>,
    templates: Arc<TemplateService>,
    clock: Clock,
}

impl ScheduleService {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        bookings: Arc<dyn BookingRepository>,
        catalog: Arc<dyn CatalogRepository>,
        conflicts: Arc<ConflictChecker>,
        templates: Arc<TemplateService>,
        clock: Clock,
    ) -> Self {
        Self { schedules, bookings, catalog, conflicts, templates, clock }
    }

    pub async fn create(&self, input: ScheduleInput) -> Result<ClassSchedule, AppError> {
        self.validate_slot(&input)?;

        let class = self.catalog.find_class(&input.class_id).await?
            .ok_or_else(|| AppError::NotFound("Class not found".into()))?;
        let instructor = self.catalog.find_instructor(&input.instructor_id).await?
            .ok_or_else(|| AppError::NotFound("Instructor not found".into()))?;
        let snapshot = Snapshot::capture(&class, &instructor);

        let probe = SlotProbe {
            instructor_id: &snapshot.instructor_id,
            start_hour: input.start_hour,
            start_minute: input.start_minute,
            duration: snapshot.duration,
            exclude_schedule_id: None,
            exclude_template_id: None,
            exclude_template_schedules: false,
        };
        self.conflicts.ensure_free(&probe, input.date).await?;

        let schedule = ClassSchedule::new(snapshot, NewScheduleParams {
            date: input.date,
            start_hour: input.start_hour,
            start_minute: input.start_minute,
            capacity: input.capacity,
            color: input.color,
        });
        let created = self.schedules.create(&schedule).await?;
        info!(schedule_id = %created.id, date = %created.date, "Class schedule created");
        Ok(created)
    }

    /// Creates a template, activates it and materializes its first month.
    /// Nothing is left behind when activation or generation fails.
    pub async fn create_recurring(&self, input: TemplateInput) -> Result<RecurringCreated, AppError> {
        let template = self.templates.create(input).await?;
        let generated = async {
            self.templates.run(&template.id).await?;
            self.templates.generate(&template.id).await
        }
        .await;

        match generated {
            Ok(generation) => Ok(RecurringCreated { template_id: template.id, generation }),
            Err(e) => {
                if let Err(cleanup) = self.templates.discard(&template.id).await {
                    warn!(template_id = %template.id, "Failed to discard template: {}", cleanup);
                }
                Err(e)
            }
        }
    }

    pub async fn update(&self, id: &str, input: ScheduleInput) -> Result<ClassSchedule, AppError> {
        self.validate_slot(&input)?;
        let mut schedule = self.find(id).await?;

        if input.capacity < schedule.booked {
            return Err(AppError::Validation(format!(
                "Capacity cannot be less than booked participants ({})",
                schedule.booked
            )));
        }

        let class_changed = input.class_id != schedule.snapshot.class_id;
        let instructor_changed = input.instructor_id != schedule.snapshot.instructor_id;
        let slot_changed = input.date != schedule.date
            || input.start_hour != schedule.start_hour
            || input.start_minute != schedule.start_minute;

        if class_changed {
            let class = self.catalog.find_class(&input.class_id).await?
                .ok_or_else(|| AppError::NotFound("Class not found".into()))?;
            schedule.snapshot.set_class(&class);
        }
        if instructor_changed {
            let instructor = self.catalog.find_instructor(&input.instructor_id).await?
                .ok_or_else(|| AppError::NotFound("Instructor not found".into()))?;
            schedule.snapshot.set_instructor(&instructor);
        }

        if class_changed || instructor_changed || slot_changed {
            let probe = SlotProbe {
                instructor_id: &schedule.snapshot.instructor_id,
                start_hour: input.start_hour,
                start_minute: input.start_minute,
                duration: schedule.snapshot.duration,
                exclude_schedule_id: Some(&schedule.id),
                exclude_template_id: schedule.template_id.as_deref(),
                exclude_template_schedules: false,
            };
            self.conflicts.ensure_free(&probe, input.date).await?;
        }

        schedule.date = input.date;
        schedule.start_hour = input.start_hour;
        schedule.start_minute = input.start_minute;
        schedule.capacity = input.capacity;
        schedule.color = input.color;

        self.schedules.update(&schedule).await?
            .ok_or_else(|| AppError::Validation("Capacity cannot be less than booked participants".into()))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let schedule = self.find(id).await?;
        if self.clock.is_in_past(schedule.date, schedule.start_hour, schedule.start_minute) {
            return Err(AppError::Validation("Cannot delete a schedule that has already started".into()));
        }
        if !self.schedules.delete_unbooked(id).await? {
            return Err(AppError::Validation("Cannot delete schedule with active bookings".into()));
        }
        info!(schedule_id = %id, "Class schedule deleted");
        Ok(())
    }

    pub async fn get(&self, id: &str, user_id: &str) -> Result<ScheduleDetail, AppError> {
        let schedule = self.find(id).await?;
        let booked = self.bookings.schedule_ids_booked_by(user_id).await?;
        let is_booked = booked.iter().any(|s| *s == schedule.id);
        Ok(ScheduleDetail { schedule, is_booked })
    }

    pub async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<ClassSchedule>, AppError> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
            && start > end
        {
            return Err(AppError::Validation("start_date must not be after end_date".into()));
        }
        self.schedules.list(filter).await
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ScheduleDetail>, AppError> {
        let schedules = self.schedules.list(&ScheduleFilter::default()).await?;
        let booked: HashSet<String> = self.bookings.schedule_ids_booked_by(user_id).await?.into_iter().collect();
        Ok(schedules
            .into_iter()
            .map(|schedule| {
                let is_booked = booked.contains(&schedule.id);
                ScheduleDetail { schedule, is_booked }
            })
            .collect())
    }

    /// Instructor opens the session, publishing the join link and checkout code.
    pub async fn open(
        &self,
        id: &str,
        instructor_user_id: &str,
        zoom_link: Option<String>,
        verification_code: Option<String>,
    ) -> Result<ClassSchedule, AppError> {
        let schedule = self.find(id).await?;
        self.ensure_teaches(&schedule, instructor_user_id).await?;
        if schedule.is_opened {
            return Err(AppError::Conflict("Schedule already opened".into()));
        }

        let code = verification_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(generate_verification_code);
        let zoom_link = zoom_link.filter(|l| !l.trim().is_empty());

        let opened = self.schedules.open(id, zoom_link, &code).await?
            .ok_or_else(|| AppError::Conflict("Schedule already opened".into()))?;
        info!(schedule_id = %id, "Class schedule opened");
        Ok(opened)
    }

    pub async fn roster(&self, id: &str, instructor_user_id: &str) -> Result<Vec<RosterEntry>, AppError> {
        let schedule = self.find(id).await?;
        self.ensure_teaches(&schedule, instructor_user_id).await?;
        self.bookings.roster(&schedule.id).await
    }

    pub async fn list_for_instructor(
        &self,
        instructor_user_id: &str,
        query: &InstructorScheduleQuery,
    ) -> Result<Paginated<ClassSchedule>, AppError> {
        let instructor = self.instructor_for_user(instructor_user_id).await?;
        let now = self.clock.now();

        let mut schedules: Vec<ClassSchedule> = self.schedules
            .list_booked_by_instructor(&instructor.id).await?
            .into_iter()
            .filter(|s| match query.status {
                None => true,
                Some(status) => {
                    let ended = self.clock
                        .end_instant(s.date, s.start_hour, s.start_minute, s.snapshot.duration)
                        .is_some_and(|end| end <= now);
                    match status {
                        ScheduleStatus::Upcoming => !ended,
                        ScheduleStatus::Past => ended,
                    }
                }
            })
            .collect();

        let by_date = |a: &ClassSchedule, b: &ClassSchedule| {
            (a.date, a.start_hour, a.start_minute).cmp(&(b.date, b.start_hour, b.start_minute))
        };
        match query.sort {
            ScheduleSort::NameAsc => schedules.sort_by(|a, b| a.snapshot.class_name.cmp(&b.snapshot.class_name).then_with(|| by_date(a, b))),
            ScheduleSort::NameDesc => schedules.sort_by(|a, b| b.snapshot.class_name.cmp(&a.snapshot.class_name).then_with(|| by_date(a, b))),
            ScheduleSort::DateAsc => schedules.sort_by(by_date),
            ScheduleSort::DateDesc => schedules.sort_by(|a, b| by_date(b, a)),
        }

        Ok(Paginated::from_vec(schedules, &query.page))
    }

    async fn find(&self, id: &str) -> Result<ClassSchedule, AppError> {
        self.schedules.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Class schedule not found".into()))
    }

    async fn instructor_for_user(&self, user_id: &str) -> Result<InstructorInfo, AppError> {
        self.catalog.find_instructor_by_user(user_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Instructor not found for user {}", user_id)))
    }

    async fn ensure_teaches(&self, schedule: &ClassSchedule, user_id: &str) -> Result<(), AppError> {
        let instructor = self.catalog.find_instructor_by_user(user_id).await?
            .ok_or_else(|| AppError::Forbidden("Only the class instructor can do this".into()))?;
        if instructor.id != schedule.snapshot.instructor_id {
            return Err(AppError::Forbidden("Only the class instructor can do this".into()));
        }
        Ok(())
    }

    fn validate_slot(&self, input: &ScheduleInput) -> Result<(), AppError> {
        validate_time_of_day(input.start_hour, input.start_minute)?;
        if input.capacity <= 0 {
            return Err(AppError::Validation("Capacity must be greater than zero".into()));
        }
        if self.clock.is_in_past(input.date, input.start_hour, input.start_minute) {
            return Err(AppError::Validation("Schedule cannot be in the past".into()));
        }
        Ok(())
    }
}

fn generate_verification_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_CODE_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = generate_verification_code();
        assert_eq!(code.len(), VERIFICATION_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("name_desc".parse::<ScheduleSort>().unwrap(), ScheduleSort::NameDesc);
        assert!("random".parse::<ScheduleSort>().is_err());
        assert_eq!(ScheduleSort::default(), ScheduleSort::DateDesc);
    }
}
