//! PostgreSQL-backed `LedgerRepository`.
//!
//! Dues are inserted with `ON CONFLICT (user_id, month) DO NOTHING`, so a
//! rerun of the monthly job or a concurrent manual assignment can never
//! create a second due for the same student and month. Only the rows that
//! were actually created are returned, together with their notifications
//! written in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    BillableStudent, BillingScope, DueChanges, LedgerRepository, LedgerRepositoryError,
};
use crate::domain::{ClassKey, Due, DueDraft, DueId, MonthLabel, StudentId};

use super::diesel_helpers::{basic_error_mapping, collect_rows, unique_violation};
use super::models::{FeeRow, FeeUpdate, NewFeeRow, NotificationRow, to_db_amount};
use super::pool::DbPool;
use super::schema::{fees, notifications, profiles, users};

#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(LedgerRepositoryError);

fn to_due(row: FeeRow) -> Result<Due, LedgerRepositoryError> {
    Due::try_from(row).map_err(LedgerRepositoryError::query)
}

fn to_dues(rows: Vec<FeeRow>) -> Result<Vec<Due>, LedgerRepositoryError> {
    collect_rows(rows.into_iter().map(Due::try_from), LedgerRepositoryError::query)
}

/// Personal notifications for the freshly created dues whose draft carries
/// a message.
fn notifications_for(
    created: &[FeeRow],
    drafts: &[DueDraft],
    created_at: DateTime<Utc>,
) -> Vec<NotificationRow> {
    created
        .iter()
        .filter_map(|row| {
            let message = drafts
                .iter()
                .find(|draft| {
                    *draft.student_id.as_uuid() == row.user_id && draft.month.as_str() == row.month
                })?
                .notification
                .as_ref()?;
            Some(NotificationRow {
                id: Uuid::new_v4(),
                user_id: Some(row.user_id),
                class_for: None,
                message: message.clone(),
                is_read: false,
                created_at,
            })
        })
        .collect()
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn locked_amount(
        &self,
        month: &MonthLabel,
    ) -> Result<Option<u32>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let amount: Option<i32> = fees::table
            .filter(fees::month.eq(month.as_str()))
            .order((fees::created_at.asc(), fees::id.asc()))
            .select(fees::amount_due)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        amount
            .map(|value| {
                u32::try_from(value).map_err(|_| {
                    LedgerRepositoryError::query(format!("negative amount_due {value} locked"))
                })
            })
            .transpose()
    }

    async fn billable_students(
        &self,
        scope: &BillingScope,
    ) -> Result<Vec<BillableStudent>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = profiles::table
            .inner_join(users::table)
            .filter(users::is_admin.eq(false))
            .select((profiles::user_id, profiles::student_class))
            .order(profiles::roll_number.asc())
            .into_boxed();
        match scope {
            BillingScope::Everyone => {}
            BillingScope::Class(class_key) => {
                query = query.filter(profiles::student_class.eq(class_key.as_str()));
            }
            BillingScope::Students(ids) => {
                let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
                query = query.filter(profiles::user_id.eq_any(ids));
            }
        }

        let rows: Vec<(Uuid, String)> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(|(user_id, class)| {
                class
                    .parse::<ClassKey>()
                    .map(|class_key| BillableStudent {
                        id: StudentId::from_uuid(user_id),
                        class_key,
                    })
                    .map_err(|err| err.to_string())
            }),
            LedgerRepositoryError::query,
        )
    }

    async fn insert_dues(
        &self,
        drafts: &[DueDraft],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<Due>, LedgerRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let rows = drafts
            .iter()
            .map(|draft| {
                Ok::<_, String>(NewFeeRow {
                    id: Uuid::new_v4(),
                    user_id: *draft.student_id.as_uuid(),
                    month: draft.month.as_str(),
                    amount_due: to_db_amount(draft.amount)?,
                    is_paid: draft.is_paid,
                    created_at,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(LedgerRepositoryError::query)?;
        let rows = &rows;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let created: Vec<FeeRow> = conn
            .transaction(|conn| {
                async move {
                    let created: Vec<FeeRow> = diesel::insert_into(fees::table)
                        .values(rows)
                        .on_conflict((fees::user_id, fees::month))
                        .do_nothing()
                        .returning(FeeRow::as_returning())
                        .get_results(conn)
                        .await?;

                    let announcements = notifications_for(&created, drafts, created_at);
                    if !announcements.is_empty() {
                        diesel::insert_into(notifications::table)
                            .values(&announcements)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(created)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        to_dues(created)
    }

    async fn find_due(&self, id: &DueId) -> Result<Option<Due>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<FeeRow> = fees::table
            .find(id.as_uuid())
            .select(FeeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_due).transpose()
    }

    async fn update_due(
        &self,
        id: &DueId,
        changes: &DueChanges,
    ) -> Result<Option<Due>, LedgerRepositoryError> {
        let changeset = FeeUpdate {
            month: changes.month.as_str(),
            amount_due: to_db_amount(changes.amount).map_err(LedgerRepositoryError::query)?,
            is_paid: changes.is_paid,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = diesel::update(fees::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(FeeRow::as_returning())
            .get_result::<FeeRow>(&mut conn)
            .await
            .optional();

        match result {
            Ok(row) => row.map(to_due).transpose(),
            Err(err) if unique_violation(&err).is_some() => Err(
                LedgerRepositoryError::duplicate_month(changes.month.as_str()),
            ),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn delete_due(&self, id: &DueId) -> Result<bool, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(fees::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn toggle_paid(&self, id: &DueId) -> Result<Option<Due>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<FeeRow> = diesel::update(fees::table.find(id.as_uuid()))
            .set(fees::is_paid.eq(diesel::dsl::not(fees::is_paid)))
            .returning(FeeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_due).transpose()
    }

    async fn dues_for_student(&self, id: &StudentId) -> Result<Vec<Due>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FeeRow> = fees::table
            .filter(fees::user_id.eq(id.as_uuid()))
            .order((fees::created_at.desc(), fees::id.asc()))
            .select(FeeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_dues(rows)
    }

    async fn outstanding_total(&self, id: &StudentId) -> Result<u64, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: Option<i64> = fees::table
            .filter(fees::user_id.eq(id.as_uuid()))
            .filter(fees::is_paid.eq(false))
            .select(diesel::dsl::sum(fees::amount_due))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(total.unwrap_or(0))
            .map_err(|_| LedgerRepositoryError::query("outstanding total is negative"))
    }
}
