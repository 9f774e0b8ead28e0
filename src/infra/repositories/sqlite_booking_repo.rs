use crate::domain::{
    models::booking::{Attendance, Booking, BookingView, RosterEntry, SweepCandidate},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const VIEW_SELECT: &str =
    "SELECT b.id, b.user_id, b.class_schedule_id, b.status, b.created_at,
            s.class_id, s.class_name, s.class_image, s.instructor_id, s.instructor_name, s.location, s.duration,
            s.date, s.start_hour, s.start_minute, s.is_opened, s.zoom_link,
            a.status AS attendance_status, a.checked_in, a.checked_out, a.is_reviewed, a.checked_at, a.verified_at
     FROM bookings b
     JOIN class_schedules s ON s.id = b.class_schedule_id
     JOIN attendances a ON a.booking_id = b.id";

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_with_attendance(&self, booking: &Booking, attendance: &Attendance, now: DateTime<Utc>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let credit = sqlx::query(
            "UPDATE user_packages SET remaining_credit = remaining_credit - 1
             WHERE id = ? AND remaining_credit > 0 AND (expired_at IS NULL OR expired_at > ?)"
        ).bind(&booking.user_package_id).bind(now).execute(&mut *tx).await.map_err(AppError::Database)?;
        if credit.rows_affected() == 0 { return Err(AppError::Conflict("Not enough credit".to_string())); }

        let seat = sqlx::query("UPDATE class_schedules SET booked = booked + 1 WHERE id = ? AND booked < capacity")
            .bind(&booking.class_schedule_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if seat.rows_affected() == 0 { return Err(AppError::Conflict("Class schedule is full".to_string())); }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, class_schedule_id, user_package_id, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.class_schedule_id)
            .bind(&booking.user_package_id).bind(&booking.status).bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO attendances (id, booking_id, status, checked_in, checked_out, is_reviewed, checked_at, verified_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&attendance.id).bind(&attendance.booking_id).bind(&attendance.status)
            .bind(attendance.checked_in).bind(attendance.checked_out).bind(attendance.is_reviewed)
            .bind(attendance.checked_at).bind(attendance.verified_at).bind(attendance.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
    async fn find_view(&self, user_id: &str, booking_id: &str) -> Result<Option<BookingView>, AppError> {
        sqlx::query_as::<_, BookingView>(&format!("{} WHERE b.user_id = ? AND b.id = ?", VIEW_SELECT))
            .bind(user_id).bind(booking_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_views_by_user(&self, user_id: &str, limit: i64, offset: i64) -> Result<Vec<BookingView>, AppError> {
        sqlx::query_as::<_, BookingView>(&format!("{} WHERE b.user_id = ? ORDER BY b.created_at DESC LIMIT ? OFFSET ?", VIEW_SELECT))
            .bind(user_id).bind(limit).bind(offset)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn count_by_user(&self, user_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE user_id = ?").bind(user_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn schedule_ids_booked_by(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT class_schedule_id FROM bookings WHERE user_id = ?").bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_attendance(&self, booking_id: &str) -> Result<Option<Attendance>, AppError> {
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendances WHERE booking_id = ?").bind(booking_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn check_in(&self, booking_id: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE attendances SET checked_in = TRUE, status = 'entered', checked_at = ?
             WHERE booking_id = ? AND checked_in = FALSE AND status = 'not-join'"
        ).bind(at).bind(booking_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn check_out(&self, booking_id: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE attendances SET checked_out = TRUE, status = 'attended', verified_at = ?
             WHERE booking_id = ? AND checked_in = TRUE AND checked_out = FALSE"
        ).bind(at).bind(booking_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn roster(&self, schedule_id: &str) -> Result<Vec<RosterEntry>, AppError> {
        sqlx::query_as::<_, RosterEntry>(
            "SELECT b.id AS booking_id, b.user_id, a.status, a.checked_in, a.checked_out, a.checked_at, a.verified_at
             FROM bookings b JOIN attendances a ON a.booking_id = b.id
             WHERE b.class_schedule_id = ?
             ORDER BY b.created_at ASC"
        ).bind(schedule_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn sweep_candidates(&self, up_to: NaiveDate) -> Result<Vec<SweepCandidate>, AppError> {
        sqlx::query_as::<_, SweepCandidate>(
            "SELECT b.id AS booking_id, s.date, s.start_hour, s.start_minute, s.duration
             FROM bookings b
             JOIN class_schedules s ON s.id = b.class_schedule_id
             LEFT JOIN attendances a ON a.booking_id = b.id
             WHERE b.status = 'booked' AND s.date <= ? AND (a.id IS NULL OR a.status = 'not-join')"
        ).bind(up_to).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_absent(&self, booking_id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO attendances (id, booking_id, status, checked_in, checked_out, is_reviewed, created_at)
             VALUES (?, ?, 'absent', FALSE, FALSE, FALSE, ?)
             ON CONFLICT(booking_id) DO UPDATE SET status = 'absent' WHERE attendances.status = 'not-join'"
        ).bind(Uuid::new_v4().to_string()).bind(booking_id).bind(now).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
