use std::env;
use std::str::FromStr;
use chrono_tz::Tz;
use crate::domain::services::conflict::ConflictWindow;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub timezone: Tz,
    pub notification_service_url: Option<String>,
    pub notification_service_token: String,
    pub internal_api_token: String,
    pub generation_interval_secs: u64,
    pub absence_sweep_interval_secs: u64,
    pub conflict_window: ConflictWindow,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Validation("DATABASE_URL must be set".into()))?,
            port: parse_var("PORT", 3000)?,
            timezone: parse_var("APP_TIMEZONE", chrono_tz::Asia::Jakarta)?,
            notification_service_url: env::var("NOTIFICATION_SERVICE_URL").ok().filter(|u| !u.is_empty()),
            notification_service_token: env::var("NOTIFICATION_SERVICE_TOKEN").unwrap_or_default(),
            internal_api_token: env::var("INTERNAL_API_TOKEN")
                .map_err(|_| AppError::Validation("INTERNAL_API_TOKEN must be set".into()))?,
            generation_interval_secs: parse_var("GENERATION_INTERVAL_SECS", 86_400)?,
            absence_sweep_interval_secs: parse_var("ABSENCE_SWEEP_INTERVAL_SECS", 300)?,
            conflict_window: parse_var("CONFLICT_WINDOW", ConflictWindow::Fixed)?,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Validation(format!("{} is invalid: {}", key, e))),
        _ => Ok(default),
    }
}
