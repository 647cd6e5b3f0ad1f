//! PostgreSQL-backed `PaymentRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PaymentRepository, PaymentRepositoryError};
use crate::domain::{Payment, PaymentId, PaymentStatus};

use super::diesel_helpers::{basic_error_mapping, collect_rows, unique_violation};
use super::models::PaymentRow;
use super::pool::DbPool;
use super::schema::{fees, payments};

/// Partial unique index allowing one pending payment per due.
const ONE_PENDING_PER_FEE: &str = "payments_one_pending_per_fee";

#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(PaymentRepositoryError);

fn to_payment(row: PaymentRow) -> Result<Payment, PaymentRepositoryError> {
    Payment::try_from(row).map_err(PaymentRepositoryError::query)
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), PaymentRepositoryError> {
        let row = PaymentRow::from(payment);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        match diesel::insert_into(payments::table)
            .values(&row)
            .execute(&mut conn)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if unique_violation(&err) == Some(ONE_PENDING_PER_FEE) => Err(
                PaymentRepositoryError::pending_exists(payment.due_id.to_string()),
            ),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn find_payment(
        &self,
        id: &PaymentId,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PaymentRow> = payments::table
            .find(id.as_uuid())
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_payment).transpose()
    }

    async fn resolve(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
        processed_at: DateTime<Utc>,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let payment_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The status guard makes a concurrent second review a no-op.
        let resolved: Option<PaymentRow> = conn
            .transaction(|conn| {
                async move {
                    let resolved: Option<PaymentRow> = diesel::update(
                        payments::table
                            .filter(payments::id.eq(payment_id))
                            .filter(payments::status.eq(PaymentStatus::Pending.as_str())),
                    )
                    .set((
                        payments::status.eq(status.as_str()),
                        payments::processed_at.eq(Some(processed_at)),
                    ))
                    .returning(PaymentRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    if let Some(row) = &resolved
                        && status == PaymentStatus::Confirmed
                    {
                        diesel::update(fees::table.find(row.fee_id))
                            .set(fees::is_paid.eq(true))
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(resolved)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        resolved.map(to_payment).transpose()
    }

    async fn pending(&self) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::status.eq(PaymentStatus::Pending.as_str()))
            .order(payments::requested_at.desc())
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(Payment::try_from),
            PaymentRepositoryError::query,
        )
    }
}
