use std::sync::Arc;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use crate::domain::models::{
    schedule::Snapshot,
    template::{NewTemplateParams, ScheduleTemplate},
};
use crate::domain::ports::{CatalogRepository, ScheduleRepository, TemplateRepository};
use crate::domain::services::conflict::{ConflictChecker, SlotProbe};
use crate::domain::services::recurrence::{
    matching_days, one_month_after, validate_time_of_day, validate_weekdays, Clock, DATE_FORMAT,
};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct TemplateInput {
    pub class_id: String,
    pub instructor_id: String,
    pub day_of_weeks: Vec<i32>,
    pub start_hour: i32,
    pub start_minute: i32,
    pub capacity: i32,
    pub color: String,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub template_id: String,
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AutoGenerationReport {
    pub templates: usize,
    pub schedules_created: usize,
    pub failures: Vec<String>,
}

pub struct TemplateService {
    templates: Arc<dyn TemplateRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    catalog: Arc<dyn CatalogRepository>,
    conflicts: Arc<ConflictChecker>,
    clock: Clock,
}

impl TemplateService {
    pub fn new(
        templates: Arc<dyn TemplateRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        catalog: Arc<dyn CatalogRepository>,
        conflicts: Arc<ConflictChecker>,
        clock: Clock,
    ) -> Self {
        Self { templates, schedules, catalog, conflicts, clock }
    }

    pub async fn list(&self) -> Result<Vec<ScheduleTemplate>, AppError> {
        self.templates.list().await
    }

    pub async fn get(&self, id: &str) -> Result<ScheduleTemplate, AppError> {
        self.templates.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Schedule template not found".into()))
    }

    pub async fn create(&self, input: TemplateInput) -> Result<ScheduleTemplate, AppError> {
        self.validate(&input)?;
        let snapshot = self.resolve_snapshot(&input.class_id, &input.instructor_id).await?;

        let days = matching_days(self.clock.today(), input.end_date, &input.day_of_weeks);
        let probe = SlotProbe {
            instructor_id: &snapshot.instructor_id,
            start_hour: input.start_hour,
            start_minute: input.start_minute,
            duration: snapshot.duration,
            exclude_schedule_id: None,
            exclude_template_id: None,
            exclude_template_schedules: false,
        };
        self.conflicts.ensure_free_on(&probe, &days).await?;

        let template = ScheduleTemplate::new(snapshot, NewTemplateParams {
            day_of_weeks: input.day_of_weeks,
            start_hour: input.start_hour,
            start_minute: input.start_minute,
            capacity: input.capacity,
            color: input.color,
            end_date: input.end_date,
        });

        let created = self.templates.create(&template).await?;
        info!(template_id = %created.id, "Schedule template created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, input: TemplateInput) -> Result<ScheduleTemplate, AppError> {
        let mut template = self.get(id).await?;
        if template.is_active {
            return Err(AppError::Conflict("Cannot update an active template, please stop it first".into()));
        }
        self.validate(&input)?;

        let mut days = input.day_of_weeks.clone();
        days.sort_unstable();
        days.dedup();

        let class_changed = template.snapshot.class_id != input.class_id;
        let instructor_changed = template.snapshot.instructor_id != input.instructor_id;
        let slot_changed = template.day_of_weeks.0 != days
            || template.start_hour != input.start_hour
            || template.start_minute != input.start_minute
            || template.end_date != input.end_date;

        if class_changed || instructor_changed {
            template.snapshot = self.resolve_snapshot(&input.class_id, &input.instructor_id).await?;
        }

        if class_changed || instructor_changed || slot_changed {
            let window = matching_days(self.clock.today(), input.end_date, &days);
            let probe = SlotProbe {
                instructor_id: &template.snapshot.instructor_id,
                start_hour: input.start_hour,
                start_minute: input.start_minute,
                duration: template.snapshot.duration,
                exclude_schedule_id: None,
                exclude_template_id: Some(&template.id),
                exclude_template_schedules: true,
            };
            self.conflicts.ensure_free_on(&probe, &window).await?;
        }

        template.day_of_weeks.0 = days;
        template.start_hour = input.start_hour;
        template.start_minute = input.start_minute;
        template.capacity = input.capacity;
        template.color = input.color;
        template.end_date = input.end_date;

        self.templates.update_inactive(&template).await?
            .ok_or_else(|| AppError::Conflict("Template was activated while being updated".into()))
    }

    /// Activates the template once its remaining days are clear of other
    /// schedules and active templates for the same instructor.
    pub async fn run(&self, id: &str) -> Result<ScheduleTemplate, AppError> {
        let template = self.get(id).await?;
        if template.is_active {
            return Err(AppError::Conflict("Template is already active".into()));
        }

        let days = matching_days(self.clock.today(), template.end_date, &template.day_of_weeks.0);
        let probe = SlotProbe {
            instructor_id: &template.snapshot.instructor_id,
            start_hour: template.start_hour,
            start_minute: template.start_minute,
            duration: template.snapshot.duration,
            exclude_schedule_id: None,
            exclude_template_id: Some(&template.id),
            exclude_template_schedules: true,
        };
        self.conflicts.ensure_free_on(&probe, &days).await?;

        let template = self.templates.set_active(id, true).await?
            .ok_or_else(|| AppError::Conflict("Template is already active".into()))?;
        info!(template_id = %id, "Schedule template activated");
        Ok(template)
    }

    pub async fn stop(&self, id: &str) -> Result<ScheduleTemplate, AppError> {
        self.get(id).await?;
        let template = self.templates.set_active(id, false).await?
            .ok_or_else(|| AppError::Conflict("Template is already inactive".into()))?;
        info!(template_id = %id, "Schedule template stopped");
        Ok(template)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let template = self.get(id).await?;
        if template.is_active || !self.templates.delete_inactive(&template.id).await? {
            return Err(AppError::Conflict("Cannot delete an active template, please stop it first".into()));
        }
        Ok(())
    }

    /// Stops and removes a template whose first generation failed.
    pub async fn discard(&self, id: &str) -> Result<(), AppError> {
        self.templates.set_active(id, false).await?;
        if !self.templates.delete_inactive(id).await? {
            return Err(AppError::Conflict("Template was reactivated before it could be removed".into()));
        }
        warn!(template_id = %id, "Discarded template after failed generation");
        Ok(())
    }

    /// Materializes the template for every matching day after today, up to one month ahead.
    /// Days that collide or fail to persist are skipped and reported.
    pub async fn generate(&self, id: &str) -> Result<GenerationReport, AppError> {
        let template = self.get(id).await?;
        if !template.is_active {
            return Err(AppError::Conflict("Template is not active".into()));
        }

        let today = self.clock.today();
        let from = today + Duration::days(1);
        let until = one_month_after(today).min(template.end_date);
        let days = matching_days(from, until, &template.day_of_weeks.0);
        if days.is_empty() {
            return Err(AppError::Validation("No matching days left in the generation window".into()));
        }

        let active = self.templates.list_active_by_instructor(&template.snapshot.instructor_id).await?;
        let probe = SlotProbe {
            instructor_id: &template.snapshot.instructor_id,
            start_hour: template.start_hour,
            start_minute: template.start_minute,
            duration: template.snapshot.duration,
            exclude_schedule_id: None,
            exclude_template_id: Some(&template.id),
            exclude_template_schedules: false,
        };

        let mut report = GenerationReport { template_id: template.id.clone(), ..Default::default() };

        for date in days {
            let label = date.format(DATE_FORMAT);
            if let Some(collision) = self.conflicts.check_with(&probe, date, &active).await? {
                report.skipped.push(format!("conflict on {}: {}", label, collision.description()));
                continue;
            }
            match self.schedules.create(&template.instance_on(date)).await {
                Ok(schedule) => report.created.push(schedule.id),
                Err(e) => report.skipped.push(format!("failed on {}: {}", label, e)),
            }
        }

        if report.created.is_empty() {
            return Err(AppError::Conflict(format!("Failed to generate any schedule: {}", report.skipped.join("; "))));
        }

        self.templates.mark_generated(&template.id, self.clock.now()).await?;

        if !report.skipped.is_empty() {
            warn!(template_id = %template.id, skipped = report.skipped.len(), "Partial generation: {}", report.skipped.join("; "));
        }
        info!(template_id = %template.id, created = report.created.len(), "Generated schedules from template");
        Ok(report)
    }

    /// Runs generation for every active template. One template failing does not stop the others.
    pub async fn auto_generate(&self) -> Result<AutoGenerationReport, AppError> {
        let active = self.templates.list_active().await?;
        let mut report = AutoGenerationReport { templates: active.len(), ..Default::default() };
        let mut any_success = false;

        for template in active {
            let span = info_span!("generate_template", template_id = %template.id);
            match self.generate(&template.id).instrument(span).await {
                Ok(generated) => {
                    any_success = true;
                    report.schedules_created += generated.created.len();
                }
                Err(e) => report.failures.push(format!("template {}: {}", template.id, e)),
            }
        }

        if report.templates > 0 && !any_success {
            return Err(AppError::Conflict(format!("No schedules generated: {}", report.failures.join("; "))));
        }
        Ok(report)
    }

    fn validate(&self, input: &TemplateInput) -> Result<(), AppError> {
        validate_weekdays(&input.day_of_weeks)?;
        validate_time_of_day(input.start_hour, input.start_minute)?;
        if input.capacity <= 0 {
            return Err(AppError::Validation("Capacity must be greater than zero".into()));
        }
        if input.end_date <= self.clock.today() {
            return Err(AppError::Validation("End date must be in the future".into()));
        }
        Ok(())
    }

    async fn resolve_snapshot(&self, class_id: &str, instructor_id: &str) -> Result<Snapshot, AppError> {
        let class = self.catalog.find_class(class_id).await?
            .ok_or_else(|| AppError::NotFound("Class not found".into()))?;
        let instructor = self.catalog.find_instructor(instructor_id).await?
            .ok_or_else(|| AppError::NotFound("Instructor not found".into()))?;
        Ok(Snapshot::capture(&class, &instructor))
    }
}
