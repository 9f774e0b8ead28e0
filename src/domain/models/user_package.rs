use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::catalog::PackageInfo;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct UserPackage {
    pub id: String,
    pub user_id: String,
    pub package_id: String,
    pub package_name: String,
    pub remaining_credit: i32,
    pub purchased_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserPackage {
    pub fn purchase(user_id: String, package: &PackageInfo, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            package_id: package.id.clone(),
            package_name: package.name.clone(),
            remaining_credit: package.credit,
            purchased_at: now,
            expired_at: Some(now + Duration::days(package.valid_days as i64)),
            created_at: now,
        }
    }

    /// Adds the package's credit and pushes expiry out by its validity,
    /// counting from the current expiry when one is set.
    pub fn top_up(&mut self, package: &PackageInfo, now: DateTime<Utc>) {
        self.remaining_credit += package.credit;
        let base = self.expired_at.unwrap_or(now);
        self.expired_at = Some(base + Duration::days(package.valid_days as i64));
        self.purchased_at = now;
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.remaining_credit > 0 && self.expired_at.is_none_or(|exp| exp > now)
    }
}

/// A completed payment as delivered by the payment collaborator.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentCompleted {
    pub payment_id: String,
    pub user_id: String,
    pub package_id: String,
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct LedgerEntry {
    pub payment_id: String,
    pub user_id: String,
    pub package_id: String,
    pub user_package_id: String,
    pub credit: i32,
    pub amount: f64,
    pub applied_at: DateTime<Utc>,
}
