//! Fee engine: monthly due assignment with month-amount locking.
//!
//! The first due created for a month fixes that month's amount. Every later
//! assignment in the same month reuses it, even if the configured
//! `monthly_due_amount` changes in between. Only when a month has no dues yet
//! is the setting consulted, falling back to
//! [`DEFAULT_MONTHLY_DUE_AMOUNT`](super::DEFAULT_MONTHLY_DUE_AMOUNT).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AddDuesRequest, BillingScope, DueChanges, DuesCommand, DuesQuery, LedgerRepository,
    LedgerRepositoryError, RealtimePublisher, SettingsRepository, SettingsRepositoryError,
    UpdateDueRequest,
};
use crate::domain::{
    DEFAULT_MONTHLY_DUE_AMOUNT, Due, DueDraft, DueId, DuesBatchOutcome, Error, EventKind,
    FeeStatus, MonthLabel, MonthlyDuesOutcome, RealtimeEvent, SettingKey, StudentId,
    due_notification_message, parse_monthly_amount,
};

pub(crate) fn map_ledger_error(error: LedgerRepositoryError) -> Error {
    match error {
        LedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger repository unavailable: {message}"))
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger repository error: {message}"))
        }
        LedgerRepositoryError::DuplicateMonth { month } => {
            Error::conflict(format!("the student already has a due for {month}"))
        }
    }
}

pub(crate) fn map_settings_error(error: SettingsRepositoryError) -> Error {
    match error {
        SettingsRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("settings repository unavailable: {message}"))
        }
        SettingsRepositoryError::Query { message } => {
            Error::internal(format!("settings repository error: {message}"))
        }
    }
}

/// Dues service implementing [`DuesCommand`] and [`DuesQuery`].
#[derive(Clone)]
pub struct FeeEngine<L, S> {
    ledger: Arc<L>,
    settings: Arc<S>,
    publisher: Arc<dyn RealtimePublisher>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl<L, S> FeeEngine<L, S> {
    /// `offset` is the centre's local UTC offset used to name months.
    pub fn new(
        ledger: Arc<L>,
        settings: Arc<S>,
        publisher: Arc<dyn RealtimePublisher>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            ledger,
            settings,
            publisher,
            clock,
            offset,
        }
    }
}

impl<L, S> FeeEngine<L, S>
where
    L: LedgerRepository,
    S: SettingsRepository,
{
    /// Month label for `now` in the centre's offset.
    pub fn month_for(&self, now: DateTime<Utc>) -> MonthLabel {
        MonthLabel::from_instant(&now.with_timezone(&self.offset))
    }

    async fn locked_amount(&self, month: &MonthLabel) -> Result<u32, Error> {
        if let Some(amount) = self
            .ledger
            .locked_amount(month)
            .await
            .map_err(map_ledger_error)?
        {
            return Ok(amount);
        }

        let configured = self
            .settings
            .get(SettingKey::MonthlyDueAmount)
            .await
            .map_err(map_settings_error)?;
        Ok(match configured {
            None => DEFAULT_MONTHLY_DUE_AMOUNT,
            Some(raw) => parse_monthly_amount(&raw).unwrap_or_else(|| {
                warn!(
                    value = raw.as_str(),
                    default = DEFAULT_MONTHLY_DUE_AMOUNT,
                    "monthly_due_amount is not a whole number; using default"
                );
                DEFAULT_MONTHLY_DUE_AMOUNT
            }),
        })
    }

    async fn insert_and_announce(
        &self,
        drafts: Vec<DueDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<(Vec<Due>, usize), Error> {
        if drafts.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let created = self
            .ledger
            .insert_dues(&drafts, created_at)
            .await
            .map_err(map_ledger_error)?;

        for due in &created {
            let announced = drafts
                .iter()
                .find(|draft| draft.student_id == due.student_id)
                .and_then(|draft| draft.notification.clone());
            if let Some(message) = announced {
                self.publisher.publish(RealtimeEvent::for_student(
                    EventKind::FeeNotification,
                    due.student_id,
                    message,
                ));
            }
        }
        let skipped = drafts.len().saturating_sub(created.len());
        Ok((created, skipped))
    }
}

#[async_trait]
impl<L, S> DuesCommand for FeeEngine<L, S>
where
    L: LedgerRepository,
    S: SettingsRepository,
{
    async fn assign_current_month(&self) -> Result<MonthlyDuesOutcome, Error> {
        self.assign_monthly_dues(self.clock.utc()).await
    }

    async fn assign_monthly_dues(&self, now: DateTime<Utc>) -> Result<MonthlyDuesOutcome, Error> {
        let month = self.month_for(now);
        let amount = self.locked_amount(&month).await?;
        let students = self
            .ledger
            .billable_students(&BillingScope::Everyone)
            .await
            .map_err(map_ledger_error)?;

        let message = due_notification_message(&month, amount);
        let drafts = students
            .iter()
            .map(|student| DueDraft {
                student_id: student.id,
                month: month.clone(),
                amount,
                is_paid: false,
                notification: Some(message.clone()),
            })
            .collect();
        let (created, skipped) = self.insert_and_announce(drafts, now).await?;

        info!(
            month = %month,
            amount,
            created = created.len(),
            skipped,
            "monthly dues assigned"
        );
        Ok(MonthlyDuesOutcome {
            month,
            amount,
            created: created.len(),
            skipped,
        })
    }

    async fn add_dues(&self, request: AddDuesRequest) -> Result<DuesBatchOutcome, Error> {
        if matches!(&request.scope, BillingScope::Students(ids) if ids.is_empty()) {
            return Err(Error::invalid_request("select at least one student")
                .with_details(serde_json::json!({ "field": "studentIds" })));
        }
        let students = self
            .ledger
            .billable_students(&request.scope)
            .await
            .map_err(map_ledger_error)?;

        let drafts = students
            .iter()
            .map(|student| {
                let amount = request
                    .amount
                    .unwrap_or_else(|| student.class_key.monthly_fee());
                DueDraft {
                    student_id: student.id,
                    month: request.month.clone(),
                    amount,
                    is_paid: request.is_paid,
                    notification: (!request.is_paid)
                        .then(|| due_notification_message(&request.month, amount)),
                }
            })
            .collect();
        let (created, skipped) = self.insert_and_announce(drafts, self.clock.utc()).await?;

        info!(month = %request.month, added = created.len(), skipped, "manual dues added");
        Ok(DuesBatchOutcome {
            added: created.len(),
            skipped,
        })
    }

    async fn update_due(&self, request: UpdateDueRequest) -> Result<Due, Error> {
        let changes = DueChanges {
            month: request.month,
            amount: request.amount,
            is_paid: request.is_paid,
        };
        self.ledger
            .update_due(&request.due_id, &changes)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| due_not_found(&request.due_id))
    }

    async fn delete_due(&self, due_id: DueId) -> Result<(), Error> {
        let deleted = self
            .ledger
            .delete_due(&due_id)
            .await
            .map_err(map_ledger_error)?;
        if deleted {
            Ok(())
        } else {
            Err(due_not_found(&due_id))
        }
    }

    async fn toggle_paid(&self, due_id: DueId) -> Result<Due, Error> {
        self.ledger
            .toggle_paid(&due_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| due_not_found(&due_id))
    }
}

#[async_trait]
impl<L, S> DuesQuery for FeeEngine<L, S>
where
    L: LedgerRepository,
    S: SettingsRepository,
{
    async fn fee_status(&self, student_id: StudentId) -> Result<FeeStatus, Error> {
        let known = self
            .ledger
            .billable_students(&BillingScope::Students(vec![student_id]))
            .await
            .map_err(map_ledger_error)?;
        if known.is_empty() {
            return Err(Error::not_found(format!("student {student_id} not found")));
        }
        let dues = self
            .ledger
            .dues_for_student(&student_id)
            .await
            .map_err(map_ledger_error)?;
        Ok(FeeStatus::from_dues(dues))
    }
}

fn due_not_found(id: &DueId) -> Error {
    Error::not_found(format!("due {id} not found"))
}

#[cfg(test)]
#[path = "fee_engine_tests.rs"]
mod tests;
