use std::sync::Arc;
use serde::Serialize;
use tracing::{info, warn};
use crate::domain::models::{
    booking::{Attendance, Booking, BookingView, ATTENDANCE_NOT_JOIN},
    pagination::{PageParams, Paginated, Pagination},
};
use crate::domain::ports::{BookingRepository, NotificationService, ScheduleRepository, UserPackageRepository};
use crate::domain::services::recurrence::Clock;
use crate::error::AppError;

pub const NOTIFICATION_SYSTEM_MESSAGE: &str = "system_message";

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub marked_absent: usize,
    pub failures: Vec<String>,
}

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    user_packages: Arc<dyn UserPackageRepository>,
    notifier: Arc<dyn NotificationService>,
    clock: Clock,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        user_packages: Arc<dyn UserPackageRepository>,
        notifier: Arc<dyn NotificationService>,
        clock: Clock,
    ) -> Self {
        Self { bookings, schedules, user_packages, notifier, clock }
    }

    /// Reserves one seat using one credit from the caller's active package.
    ///
    /// The reads here only produce friendly errors; the repository re-checks
    /// seat and credit inside the write transaction.
    pub async fn create(&self, user_id: &str, package_id: &str, schedule_id: &str) -> Result<Booking, AppError> {
        let now = self.clock.now();

        let schedule = self.schedules.find_by_id(schedule_id).await?
            .ok_or_else(|| AppError::NotFound("Class schedule not found".into()))?;

        let user_package = self.user_packages.find_active(user_id, package_id, now).await?
            .ok_or_else(|| AppError::NotFound("You don't have an active package for this class".into()))?;
        if !user_package.is_active(now) {
            return Err(AppError::Conflict("Not enough credit".into()));
        }

        if !schedule.has_spare_seat() {
            return Err(AppError::Conflict("Class schedule is full".into()));
        }

        let booking = Booking::new(user_id.to_string(), schedule.id.clone(), user_package.id.clone());
        let attendance = Attendance::for_booking(booking.id.clone());
        let created = self.bookings.create_with_attendance(&booking, &attendance, now).await?;

        info!(booking_id = %created.id, schedule_id = %schedule.id, user_id = %user_id, "Booking created");

        let message = format!(
            "You have successfully booked the class \"{}\" on {} at {:02}:{:02}. 1 credit has been deducted from your package.",
            schedule.snapshot.class_name,
            schedule.date.format("%B %-d, %Y"),
            schedule.start_hour,
            schedule.start_minute,
        );
        if let Err(e) = self.notifier
            .send_to_user(user_id, NOTIFICATION_SYSTEM_MESSAGE, "Class Booked Successfully", &message)
            .await
        {
            warn!(user_id = %user_id, "Failed sending booking notification: {}", e);
        }

        Ok(created)
    }

    pub async fn detail(&self, user_id: &str, booking_id: &str) -> Result<BookingView, AppError> {
        self.bookings.find_view(user_id, booking_id).await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))
    }

    pub async fn list(&self, user_id: &str, page: &PageParams) -> Result<Paginated<BookingView>, AppError> {
        let total = self.bookings.count_by_user(user_id).await?;
        let data = self.bookings.list_views_by_user(user_id, page.limit(), page.offset()).await?;
        Ok(Paginated { data, pagination: Pagination::new(page, total) })
    }

    pub async fn check_in(&self, user_id: &str, booking_id: &str) -> Result<Attendance, AppError> {
        let view = self.detail(user_id, booking_id).await?;

        if !view.is_opened {
            return Err(AppError::Forbidden("Class schedule is not opened yet".into()));
        }
        if view.checked_in {
            return Err(AppError::Conflict("You have already checked in to this class".into()));
        }
        if view.attendance_status != ATTENDANCE_NOT_JOIN {
            return Err(AppError::Conflict(format!("Attendance is already {}", view.attendance_status)));
        }

        if !self.bookings.check_in(booking_id, self.clock.now()).await? {
            return Err(AppError::Conflict("You have already checked in to this class".into()));
        }
        info!(booking_id = %booking_id, "Checked in");
        self.attendance(booking_id).await
    }

    pub async fn check_out(&self, user_id: &str, booking_id: &str, verification_code: &str) -> Result<Attendance, AppError> {
        let view = self.detail(user_id, booking_id).await?;

        if view.checked_out {
            return Err(AppError::Conflict("You have already checked out from this class".into()));
        }
        if !view.checked_in {
            return Err(AppError::Conflict("You have not checked in to this class".into()));
        }

        let schedule = self.schedules.find_by_id(&view.class_schedule_id).await?
            .ok_or_else(|| AppError::NotFound("Class schedule not found".into()))?;
        if schedule.verification_code.as_deref() != Some(verification_code) {
            return Err(AppError::Validation("Invalid verification code".into()));
        }

        if !self.bookings.check_out(booking_id, self.clock.now()).await? {
            return Err(AppError::Conflict("You have already checked out from this class".into()));
        }
        info!(booking_id = %booking_id, "Checked out");
        self.attendance(booking_id).await
    }

    /// Marks every unattended booking whose class has ended as absent.
    pub async fn sweep_absent(&self) -> Result<SweepReport, AppError> {
        let now = self.clock.now();
        let candidates = self.bookings.sweep_candidates(self.clock.today()).await?;
        let mut report = SweepReport { examined: candidates.len(), ..Default::default() };

        for candidate in candidates {
            let ended = self.clock
                .end_instant(candidate.date, candidate.start_hour, candidate.start_minute, candidate.duration)
                .is_some_and(|end| end <= now);
            if !ended {
                continue;
            }
            match self.bookings.mark_absent(&candidate.booking_id, now).await {
                Ok(true) => report.marked_absent += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(booking_id = %candidate.booking_id, "Failed to mark booking absent: {}", e);
                    report.failures.push(format!("booking {}: {}", candidate.booking_id, e));
                }
            }
        }

        if report.marked_absent > 0 {
            info!(marked = report.marked_absent, "Marked bookings absent");
        }
        Ok(report)
    }

    async fn attendance(&self, booking_id: &str) -> Result<Attendance, AppError> {
        self.bookings.find_attendance(booking_id).await?
            .ok_or_else(|| AppError::NotFound("Attendance not found".into()))
    }
}
