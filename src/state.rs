use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    BookingRepository, CatalogRepository, NotificationService, ReviewRepository,
    ScheduleRepository, TemplateRepository, UserPackageRepository,
};
use crate::domain::services::{
    booking_service::BookingService,
    conflict::ConflictChecker,
    ledger_service::LedgerService,
    recurrence::Clock,
    review_service::ReviewService,
    schedule_service::ScheduleService,
    template_service::TemplateService,
};

/// Repository handles for one backing database.
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub user_packages: Arc<dyn UserPackageRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repos: Repositories,
    pub schedule_service: Arc<ScheduleService>,
    pub template_service: Arc<TemplateService>,
    pub booking_service: Arc<BookingService>,
    pub ledger_service: Arc<LedgerService>,
    pub review_service: Arc<ReviewService>,
}

impl AppState {
    pub fn build(config: Config, repos: Repositories, notifier: Arc<dyn NotificationService>, clock: Clock) -> Self {
        let conflicts = Arc::new(ConflictChecker::new(
            repos.schedules.clone(),
            repos.templates.clone(),
            config.conflict_window,
        ));
        let template_service = Arc::new(TemplateService::new(
            repos.templates.clone(),
            repos.schedules.clone(),
            repos.catalog.clone(),
            conflicts.clone(),
            clock.clone(),
        ));
        let schedule_service = Arc::new(ScheduleService::new(
            repos.schedules.clone(),
            repos.bookings.clone(),
            repos.catalog.clone(),
            conflicts,
            template_service.clone(),
            clock.clone(),
        ));
        let booking_service = Arc::new(BookingService::new(
            repos.bookings.clone(),
            repos.schedules.clone(),
            repos.user_packages.clone(),
            notifier,
            clock.clone(),
        ));
        let ledger_service = Arc::new(LedgerService::new(
            repos.user_packages.clone(),
            repos.catalog.clone(),
            clock,
        ));
        let review_service = Arc::new(ReviewService::new(
            repos.reviews.clone(),
            repos.bookings.clone(),
            repos.catalog.clone(),
        ));

        Self {
            config,
            repos,
            schedule_service,
            template_service,
            booking_service,
            ledger_service,
            review_service,
        }
    }
}
