//! Port for due persistence.
//!
//! Adapters must enforce one due per `(student, month)` in storage and treat a
//! duplicate as "already assigned": [`LedgerRepository::insert_dues`] silently
//! skips such rows and only returns the ones it created.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ClassKey, Due, DueDraft, DueId, MonthLabel, StudentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger repository adapters.
    pub enum LedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "ledger repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "ledger repository query failed: {message}",
        /// Another due already covers this student and month.
        DuplicateMonth { month: String } =>
            "a due for {month} already exists for this student",
    }
}

/// Which students a bulk due assignment targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingScope {
    /// Every non-admin user with a profile.
    Everyone,
    /// Every student in one class.
    Class(ClassKey),
    /// An explicit list of students; unknown ids are ignored.
    Students(Vec<StudentId>),
}

/// A student eligible for dues, with the class that prices them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillableStudent {
    pub id: StudentId,
    pub class_key: ClassKey,
}

/// Changes applied by [`LedgerRepository::update_due`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueChanges {
    pub month: MonthLabel,
    pub amount: u32,
    pub is_paid: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Amount of the earliest due already created for `month`, if any.
    async fn locked_amount(&self, month: &MonthLabel)
    -> Result<Option<u32>, LedgerRepositoryError>;

    /// Students covered by `scope`, excluding administrators.
    async fn billable_students(
        &self,
        scope: &BillingScope,
    ) -> Result<Vec<BillableStudent>, LedgerRepositoryError>;

    /// Insert dues plus their notifications in one transaction.
    ///
    /// Drafts colliding with an existing `(student, month)` due are skipped;
    /// the returned vector holds only the dues that were created.
    async fn insert_dues(
        &self,
        drafts: &[DueDraft],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<Due>, LedgerRepositoryError>;

    async fn find_due(&self, id: &DueId) -> Result<Option<Due>, LedgerRepositoryError>;

    /// Apply `changes`; `None` when the due does not exist.
    async fn update_due(
        &self,
        id: &DueId,
        changes: &DueChanges,
    ) -> Result<Option<Due>, LedgerRepositoryError>;

    /// Delete a due; `false` when it did not exist.
    async fn delete_due(&self, id: &DueId) -> Result<bool, LedgerRepositoryError>;

    /// Flip the paid flag; `None` when the due does not exist.
    async fn toggle_paid(&self, id: &DueId) -> Result<Option<Due>, LedgerRepositoryError>;

    /// Every due of a student, newest month first.
    async fn dues_for_student(&self, id: &StudentId) -> Result<Vec<Due>, LedgerRepositoryError>;

    /// Sum of the student's unpaid dues.
    async fn outstanding_total(&self, id: &StudentId) -> Result<u64, LedgerRepositoryError>;
}

/// Fixture ledger with no students and no dues.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLedgerRepository;

#[async_trait]
impl LedgerRepository for FixtureLedgerRepository {
    async fn locked_amount(
        &self,
        _month: &MonthLabel,
    ) -> Result<Option<u32>, LedgerRepositoryError> {
        Ok(None)
    }

    async fn billable_students(
        &self,
        _scope: &BillingScope,
    ) -> Result<Vec<BillableStudent>, LedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert_dues(
        &self,
        _drafts: &[DueDraft],
        _created_at: DateTime<Utc>,
    ) -> Result<Vec<Due>, LedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_due(&self, _id: &DueId) -> Result<Option<Due>, LedgerRepositoryError> {
        Ok(None)
    }

    async fn update_due(
        &self,
        _id: &DueId,
        _changes: &DueChanges,
    ) -> Result<Option<Due>, LedgerRepositoryError> {
        Ok(None)
    }

    async fn delete_due(&self, _id: &DueId) -> Result<bool, LedgerRepositoryError> {
        Ok(false)
    }

    async fn toggle_paid(&self, _id: &DueId) -> Result<Option<Due>, LedgerRepositoryError> {
        Ok(None)
    }

    async fn dues_for_student(
        &self,
        _id: &StudentId,
    ) -> Result<Vec<Due>, LedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn outstanding_total(&self, _id: &StudentId) -> Result<u64, LedgerRepositoryError> {
        Ok(0)
    }
}
