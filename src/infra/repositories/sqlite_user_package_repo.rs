use crate::domain::{
    models::{catalog::PackageInfo, user_package::{LedgerEntry, PaymentCompleted, UserPackage}},
    ports::UserPackageRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteUserPackageRepo {
    pool: SqlitePool,
}

impl SqliteUserPackageRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserPackageRepository for SqliteUserPackageRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserPackage>, AppError> {
        sqlx::query_as::<_, UserPackage>("SELECT * FROM user_packages WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_active(&self, user_id: &str, package_id: &str, now: DateTime<Utc>) -> Result<Option<UserPackage>, AppError> {
        sqlx::query_as::<_, UserPackage>(
            "SELECT * FROM user_packages
             WHERE user_id = ? AND package_id = ? AND (expired_at IS NULL OR expired_at > ?)
             ORDER BY remaining_credit DESC, purchased_at DESC
             LIMIT 1"
        ).bind(user_id).bind(package_id).bind(now).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<UserPackage>, AppError> {
        sqlx::query_as::<_, UserPackage>("SELECT * FROM user_packages WHERE user_id = ? ORDER BY purchased_at DESC").bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_ledger_entry(&self, payment_id: &str) -> Result<Option<LedgerEntry>, AppError> {
        sqlx::query_as::<_, LedgerEntry>("SELECT * FROM ledger_entries WHERE payment_id = ?").bind(payment_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn apply_payment(&self, payment: &PaymentCompleted, package: &PackageInfo, now: DateTime<Utc>) -> Result<Option<UserPackage>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // A deferred transaction that reads first cannot wait for the write lock,
        // so open with a write and let concurrent payments queue on busy_timeout.
        sqlx::query("UPDATE user_packages SET remaining_credit = remaining_credit WHERE user_id = ? AND package_id = ?")
            .bind(&payment.user_id).bind(&package.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let seen = sqlx::query_scalar::<_, String>("SELECT payment_id FROM ledger_entries WHERE payment_id = ?")
            .bind(&payment.payment_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
        if seen.is_some() { return Ok(None); }

        let active = sqlx::query_as::<_, UserPackage>(
            "SELECT * FROM user_packages
             WHERE user_id = ? AND package_id = ? AND remaining_credit > 0 AND (expired_at IS NULL OR expired_at > ?)
             ORDER BY purchased_at DESC
             LIMIT 1"
        ).bind(&payment.user_id).bind(&package.id).bind(now).fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let row = match active {
            Some(mut existing) => {
                existing.top_up(package, now);
                sqlx::query_as::<_, UserPackage>(
                    "UPDATE user_packages SET remaining_credit = ?, expired_at = ?, purchased_at = ? WHERE id = ? RETURNING *"
                )
                    .bind(existing.remaining_credit).bind(existing.expired_at).bind(existing.purchased_at).bind(&existing.id)
                    .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            }
            None => {
                let fresh = UserPackage::purchase(payment.user_id.clone(), package, now);
                sqlx::query_as::<_, UserPackage>(
                    "INSERT INTO user_packages (id, user_id, package_id, package_name, remaining_credit, purchased_at, expired_at, created_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                     RETURNING *"
                )
                    .bind(&fresh.id).bind(&fresh.user_id).bind(&fresh.package_id).bind(&fresh.package_name)
                    .bind(fresh.remaining_credit).bind(fresh.purchased_at).bind(fresh.expired_at).bind(fresh.created_at)
                    .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            }
        };

        let recorded = sqlx::query(
            "INSERT INTO ledger_entries (payment_id, user_id, package_id, user_package_id, credit, amount, applied_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(payment_id) DO NOTHING"
        )
            .bind(&payment.payment_id).bind(&payment.user_id).bind(&package.id).bind(&row.id)
            .bind(package.credit).bind(payment.amount).bind(now)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if recorded.rows_affected() == 0 { return Ok(None); }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(row))
    }
}
