//! Driving port for due assignment and maintenance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Due, DueId, DuesBatchOutcome, Error, MonthLabel, MonthlyDuesOutcome};

use super::BillingScope;

/// Manual bulk assignment of a month's dues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDuesRequest {
    pub scope: BillingScope,
    pub month: MonthLabel,
    /// Fixed amount for every student; each student's class fee when absent.
    pub amount: Option<u32>,
    pub is_paid: bool,
}

/// Replacement values for a single due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDueRequest {
    pub due_id: DueId,
    pub month: MonthLabel,
    pub amount: u32,
    pub is_paid: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DuesCommand: Send + Sync {
    /// Assign the monthly due for the month containing the current time.
    async fn assign_current_month(&self) -> Result<MonthlyDuesOutcome, Error>;

    /// Assign the monthly due for the month containing `now`.
    ///
    /// Every student receives the month's locked amount; students who
    /// already hold a due for that month are skipped.
    async fn assign_monthly_dues(&self, now: DateTime<Utc>) -> Result<MonthlyDuesOutcome, Error>;

    async fn add_dues(&self, request: AddDuesRequest) -> Result<DuesBatchOutcome, Error>;

    async fn update_due(&self, request: UpdateDueRequest) -> Result<Due, Error>;

    async fn delete_due(&self, due_id: DueId) -> Result<(), Error>;

    async fn toggle_paid(&self, due_id: DueId) -> Result<Due, Error>;
}
