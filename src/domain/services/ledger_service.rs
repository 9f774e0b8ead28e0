use std::sync::Arc;
use serde::Serialize;
use tracing::info;
use crate::domain::models::user_package::{PaymentCompleted, UserPackage};
use crate::domain::ports::{CatalogRepository, UserPackageRepository};
use crate::domain::services::recurrence::Clock;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct PaymentApplied {
    pub user_package: UserPackage,
    /// False when this payment id had already been applied.
    pub applied: bool,
}

pub struct LedgerService {
    user_packages: Arc<dyn UserPackageRepository>,
    catalog: Arc<dyn CatalogRepository>,
    clock: Clock,
}

impl LedgerService {
    pub fn new(
        user_packages: Arc<dyn UserPackageRepository>,
        catalog: Arc<dyn CatalogRepository>,
        clock: Clock,
    ) -> Self {
        Self { user_packages, catalog, clock }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<UserPackage>, AppError> {
        self.user_packages.list_by_user(user_id).await
    }

    /// Credits a completed payment to the user's package. Replaying the same
    /// payment id returns the row it was applied to without changing it.
    pub async fn apply_payment(&self, payment: &PaymentCompleted) -> Result<PaymentApplied, AppError> {
        if payment.payment_id.trim().is_empty() || payment.user_id.trim().is_empty() {
            return Err(AppError::Validation("payment_id and user_id are required".into()));
        }

        let package = self.catalog.find_package(&payment.package_id).await?
            .ok_or_else(|| AppError::NotFound("Package not found".into()))?;

        if let Some(replayed) = self.already_applied(&payment.payment_id).await? {
            return Ok(replayed);
        }

        match self.user_packages.apply_payment(payment, &package, self.clock.now()).await? {
            Some(user_package) => {
                info!(
                    payment_id = %payment.payment_id,
                    user_package_id = %user_package.id,
                    remaining_credit = user_package.remaining_credit,
                    "Payment credited"
                );
                Ok(PaymentApplied { user_package, applied: true })
            }
            None => self.already_applied(&payment.payment_id).await?
                .ok_or_else(|| AppError::InternalWithMsg(format!("Ledger entry for {} vanished", payment.payment_id))),
        }
    }

    async fn already_applied(&self, payment_id: &str) -> Result<Option<PaymentApplied>, AppError> {
        let Some(entry) = self.user_packages.find_ledger_entry(payment_id).await? else {
            return Ok(None);
        };
        let user_package = self.user_packages.find_by_id(&entry.user_package_id).await?
            .ok_or_else(|| AppError::NotFound("User package not found".into()))?;
        Ok(Some(PaymentApplied { user_package, applied: false }))
    }
}
