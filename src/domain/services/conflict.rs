use std::str::FromStr;
use std::sync::Arc;
use chrono::NaiveDate;
use crate::domain::models::{schedule::ClassSchedule, template::ScheduleTemplate};
use crate::domain::ports::{ScheduleRepository, TemplateRepository};
use crate::domain::services::recurrence::{weekday_index, TimeSlot, DATE_FORMAT};
use crate::error::AppError;

const FIXED_WINDOW_MINUTES: i32 = 60;

/// How long an occupied slot is assumed to last when testing for overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictWindow {
    /// Every slot occupies one hour from its start.
    #[default]
    Fixed,
    /// Every slot occupies its class duration.
    Duration,
}

impl ConflictWindow {
    fn length(&self, duration: i32) -> i32 {
        match self {
            ConflictWindow::Fixed => FIXED_WINDOW_MINUTES,
            ConflictWindow::Duration => duration.max(1),
        }
    }
}

impl FromStr for ConflictWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(ConflictWindow::Fixed),
            "duration" => Ok(ConflictWindow::Duration),
            other => Err(format!("unknown conflict window '{}'", other)),
        }
    }
}

/// The slot being proposed for an instructor.
#[derive(Debug, Clone)]
pub struct SlotProbe<'a> {
    pub instructor_id: &'a str,
    pub start_hour: i32,
    pub start_minute: i32,
    pub duration: i32,
    pub exclude_schedule_id: Option<&'a str>,
    /// Ignores this template's recurrence rule.
    pub exclude_template_id: Option<&'a str>,
    /// Also ignores schedules already generated from `exclude_template_id`.
    pub exclude_template_schedules: bool,
}

impl SlotProbe<'_> {
    fn skips_schedule(&self, schedule: &ClassSchedule) -> bool {
        if self.exclude_schedule_id == Some(schedule.id.as_str()) {
            return true;
        }
        self.exclude_template_schedules
            && self.exclude_template_id.is_some()
            && schedule.template_id.as_deref() == self.exclude_template_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    Schedule { id: String, description: String },
    Template { id: String, description: String },
}

impl Collision {
    pub fn description(&self) -> &str {
        match self {
            Collision::Schedule { description, .. } | Collision::Template { description, .. } => description,
        }
    }
}

pub struct ConflictChecker {
    schedules: Arc<dyn ScheduleRepository>,
    templates: Arc<dyn TemplateRepository>,
    window: ConflictWindow,
}

impl ConflictChecker {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        templates: Arc<dyn TemplateRepository>,
        window: ConflictWindow,
    ) -> Self {
        Self { schedules, templates, window }
    }

    pub async fn check(&self, probe: &SlotProbe<'_>, date: NaiveDate) -> Result<Option<Collision>, AppError> {
        let templates = self.templates.list_active_by_instructor(probe.instructor_id).await?;
        self.check_with(probe, date, &templates).await
    }

    pub async fn ensure_free(&self, probe: &SlotProbe<'_>, date: NaiveDate) -> Result<(), AppError> {
        match self.check(probe, date).await? {
            Some(collision) => Err(AppError::Conflict(collision.description().to_string())),
            None => Ok(()),
        }
    }

    /// Checks every date, stopping at the first collision.
    pub async fn ensure_free_on(&self, probe: &SlotProbe<'_>, dates: &[NaiveDate]) -> Result<(), AppError> {
        let templates = self.templates.list_active_by_instructor(probe.instructor_id).await?;
        for date in dates {
            if let Some(collision) = self.check_with(probe, *date, &templates).await? {
                return Err(AppError::Conflict(collision.description().to_string()));
            }
        }
        Ok(())
    }

    /// Like `check`, but against a template list the caller already loaded.
    pub async fn check_with(
        &self,
        probe: &SlotProbe<'_>,
        date: NaiveDate,
        active_templates: &[ScheduleTemplate],
    ) -> Result<Option<Collision>, AppError> {
        let candidate = TimeSlot::new(probe.start_hour, probe.start_minute, self.window.length(probe.duration));

        let same_day = self.schedules.list_by_instructor_on(probe.instructor_id, date).await?;
        if let Some(hit) = same_day
            .iter()
            .filter(|s| !probe.skips_schedule(s))
            .find(|s| candidate.overlaps(&self.slot_of_schedule(s)))
        {
            return Ok(Some(Collision::Schedule {
                id: hit.id.clone(),
                description: format!(
                    "Instructor {} is already scheduled on {} at {:02}:{:02} ({})",
                    hit.snapshot.instructor_name,
                    date.format(DATE_FORMAT),
                    hit.start_hour,
                    hit.start_minute,
                    hit.snapshot.class_name
                ),
            }));
        }

        let weekday = weekday_index(date);
        if let Some(hit) = active_templates
            .iter()
            .filter(|t| t.is_active && t.snapshot.instructor_id == probe.instructor_id)
            .filter(|t| probe.exclude_template_id != Some(t.id.as_str()))
            .filter(|t| t.runs_on(weekday) && date <= t.end_date)
            .find(|t| candidate.overlaps(&TimeSlot::new(t.start_hour, t.start_minute, self.window.length(t.snapshot.duration))))
        {
            return Ok(Some(Collision::Template {
                id: hit.id.clone(),
                description: format!(
                    "Instructor {} is already booked on {} at {:02}:{:02} (from template)",
                    hit.snapshot.instructor_name,
                    date.format(DATE_FORMAT),
                    hit.start_hour,
                    hit.start_minute
                ),
            }));
        }

        Ok(None)
    }

    fn slot_of_schedule(&self, schedule: &ClassSchedule) -> TimeSlot {
        TimeSlot::new(schedule.start_hour, schedule.start_minute, self.window.length(schedule.snapshot.duration))
    }
}
