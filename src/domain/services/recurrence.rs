use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "now" and "today" in the business timezone. Tests pin it to a fixed instant.
#[derive(Clone, Debug)]
pub struct Clock {
    tz: Tz,
    fixed: Option<DateTime<Utc>>,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        Self { tz, fixed: None }
    }

    pub fn fixed(tz: Tz, at: DateTime<Utc>) -> Self {
        Self { tz, fixed: Some(at) }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed.unwrap_or_else(Utc::now)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.tz).date_naive()
    }

    /// Resolves a wall-clock time on `date` to an instant. Ambiguous times pick the
    /// earlier offset; times skipped by a DST jump resolve to `None`.
    pub fn local_instant(&self, date: NaiveDate, hour: i32, minute: i32) -> Option<DateTime<Utc>> {
        let time = date.and_hms_opt(hour as u32, minute as u32, 0)?;
        self.tz
            .from_local_datetime(&time)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_in_past(&self, date: NaiveDate, hour: i32, minute: i32) -> bool {
        match self.local_instant(date, hour, minute) {
            Some(start) => start <= self.now(),
            None => date <= self.today(),
        }
    }

    /// Instant at which a class starting at the given wall-clock time ends.
    pub fn end_instant(&self, date: NaiveDate, hour: i32, minute: i32, duration: i32) -> Option<DateTime<Utc>> {
        self.local_instant(date, hour, minute)
            .map(|start| start + Duration::minutes(duration as i64))
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// 0 = Sunday through 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

pub fn validate_time_of_day(hour: i32, minute: i32) -> Result<(), AppError> {
    if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
        return Err(AppError::Validation(format!("Invalid start time {:02}:{:02}", hour, minute)));
    }
    Ok(())
}

pub fn validate_weekdays(days: &[i32]) -> Result<(), AppError> {
    if days.is_empty() {
        return Err(AppError::Validation("At least one weekday is required".into()));
    }
    if let Some(bad) = days.iter().find(|d| !(0..=6).contains(*d)) {
        return Err(AppError::Validation(format!("Invalid weekday {}, expected 0-6", bad)));
    }
    Ok(())
}

/// Half-open interval in minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: i32,
    pub end: i32,
}

impl TimeSlot {
    pub fn new(hour: i32, minute: i32, length_minutes: i32) -> Self {
        let start = hour * 60 + minute;
        Self { start, end: start + length_minutes }
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub fn one_month_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX)
}

/// Every date in `[from, to]` whose weekday is in `days`.
pub fn matching_days(from: NaiveDate, to: NaiveDate, days: &[i32]) -> Vec<NaiveDate> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| days.contains(&weekday_index(*d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(d("2024-06-09")), 0);
        assert_eq!(weekday_index(d("2024-06-10")), 1);
        assert_eq!(weekday_index(d("2024-06-15")), 6);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("10/06/2024").is_err());
        assert_eq!(parse_date(" 2024-06-10 ").unwrap(), d("2024-06-10"));
    }

    #[test]
    fn test_slots_are_half_open() {
        let nine = TimeSlot::new(9, 0, 60);
        assert!(nine.overlaps(&TimeSlot::new(9, 30, 60)));
        assert!(!nine.overlaps(&TimeSlot::new(10, 0, 60)));
        assert!(!TimeSlot::new(10, 0, 60).overlaps(&nine));
        assert!(TimeSlot::new(8, 0, 90).overlaps(&nine));
    }

    #[test]
    fn test_matching_days_is_inclusive() {
        let days = matching_days(d("2024-06-10"), d("2024-06-24"), &[1]);
        assert_eq!(days, vec![d("2024-06-10"), d("2024-06-17"), d("2024-06-24")]);
        assert!(matching_days(d("2024-06-11"), d("2024-06-10"), &[1, 2]).is_empty());
    }

    #[test]
    fn test_one_month_after_clamps_month_end() {
        assert_eq!(one_month_after(d("2024-01-31")), d("2024-02-29"));
        assert_eq!(one_month_after(d("2024-06-10")), d("2024-07-10"));
    }

    #[test]
    fn test_past_is_relative_to_business_timezone() {
        // 2024-06-10 02:30 UTC is 09:30 in Jakarta
        let at = Utc.with_ymd_and_hms(2024, 6, 10, 2, 30, 0).unwrap();
        let clock = Clock::fixed(chrono_tz::Asia::Jakarta, at);
        assert_eq!(clock.today(), d("2024-06-10"));
        assert!(clock.is_in_past(d("2024-06-10"), 9, 0));
        assert!(!clock.is_in_past(d("2024-06-10"), 10, 0));
        assert!(clock.is_in_past(d("2024-06-09"), 23, 0));
    }

    #[test]
    fn test_end_instant_adds_duration() {
        let clock = Clock::new(chrono_tz::UTC);
        let end = clock.end_instant(d("2024-06-10"), 9, 0, 90).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 6, 10, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_validation_helpers() {
        assert!(validate_time_of_day(23, 59).is_ok());
        assert!(validate_time_of_day(24, 0).is_err());
        assert!(validate_weekdays(&[]).is_err());
        assert!(validate_weekdays(&[0, 7]).is_err());
        assert!(validate_weekdays(&[0, 6]).is_ok());
    }
}
