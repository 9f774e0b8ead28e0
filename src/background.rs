use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, info_span, warn, Instrument};
use crate::state::AppState;

/// Spawns the periodic jobs. They call the same services as the HTTP handlers.
pub fn start_background_workers(state: Arc<AppState>) {
    let generation_state = state.clone();
    tokio::spawn(async move {
        run_template_generation(generation_state).await;
    });

    tokio::spawn(async move {
        run_absence_sweep(state).await;
    });
}

pub async fn run_template_generation(state: Arc<AppState>) {
    let period = Duration::from_secs(state.config.generation_interval_secs.max(1));
    info!("Starting template auto-generation every {:?}", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let span = info_span!("background_job", job_type = "template_generation");
        async {
            match state.template_service.auto_generate().await {
                Ok(report) => {
                    if !report.failures.is_empty() {
                        warn!(failures = report.failures.len(), "Some templates failed: {}", report.failures.join("; "));
                    }
                    info!(templates = report.templates, created = report.schedules_created, "Template generation finished");
                }
                Err(e) => error!("Template generation failed: {}", e),
            }
        }
            .instrument(span)
            .await;
    }
}

pub async fn run_absence_sweep(state: Arc<AppState>) {
    let period = Duration::from_secs(state.config.absence_sweep_interval_secs.max(1));
    info!("Starting absence sweep every {:?}", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let span = info_span!("background_job", job_type = "absence_sweep");
        async {
            match state.booking_service.sweep_absent().await {
                Ok(report) => {
                    for failure in &report.failures {
                        error!("Absence sweep item failed: {}", failure);
                    }
                }
                Err(e) => error!("Failed to fetch sweep candidates: {:?}", e),
            }
        }
            .instrument(span)
            .await;
    }
}
