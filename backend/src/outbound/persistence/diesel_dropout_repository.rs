//! PostgreSQL-backed `DropoutRepository`.
//!
//! An approval is settled in one transaction: the decision, a fresh check of
//! unpaid dues and the removal of the student commit together or not at all.
//! The student's account row is locked first, so a due cannot be billed
//! between the check and the delete.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{DropoutRepository, DropoutRepositoryError, DropoutSettlement};
use crate::domain::{DropoutId, DropoutRequest, DropoutStatus, RemovedStudent, StudentId};

use super::diesel_helpers::{basic_error_mapping, collect_rows, unique_violation};
use super::diesel_roster_repository::{remove_in, removed_student};
use super::models::DropoutRow;
use super::pool::DbPool;
use super::schema::{dropout_requests, fees, users};

/// Partial unique index allowing one pending request per student.
const ONE_PENDING_REQUEST: &str = "dropout_requests_one_pending";

#[derive(Clone)]
pub struct DieselDropoutRepository {
    pool: DbPool,
}

impl DieselDropoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(DropoutRepositoryError);

/// Reasons an approval transaction rolls back.
#[derive(Debug)]
enum Abandoned {
    NotPending,
    Outstanding(u64),
    Undecodable(String),
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for Abandoned {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

async fn approve_in(
    conn: &mut AsyncPgConnection,
    request: &DropoutRequest,
) -> Result<Option<RemovedStudent>, Abandoned> {
    let user_id = *request.student_id.as_uuid();
    users::table
        .find(user_id)
        .select(users::id)
        .for_update()
        .first::<uuid::Uuid>(conn)
        .await
        .optional()?;

    let decided = diesel::update(
        dropout_requests::table
            .filter(dropout_requests::id.eq(request.id.as_uuid()))
            .filter(dropout_requests::status.eq(DropoutStatus::Pending.as_str())),
    )
    .set((
        dropout_requests::status.eq(request.status.as_str()),
        dropout_requests::processed_at.eq(request.processed_at),
    ))
    .execute(conn)
    .await?;
    if decided == 0 {
        return Err(Abandoned::NotPending);
    }

    let unpaid: Option<i64> = fees::table
        .filter(fees::user_id.eq(user_id))
        .filter(fees::is_paid.eq(false))
        .select(diesel::dsl::sum(fees::amount_due))
        .first(conn)
        .await?;
    let unpaid = u64::try_from(unpaid.unwrap_or(0))
        .map_err(|_| Abandoned::Undecodable("outstanding total is negative".to_owned()))?;
    if unpaid > 0 {
        return Err(Abandoned::Outstanding(unpaid));
    }

    // The request row goes with the account.
    match remove_in(conn, user_id).await? {
        Some((class_key, remaining)) => {
            removed_student(StudentId::from_uuid(user_id), class_key, remaining)
                .map(Some)
                .map_err(Abandoned::Undecodable)
        }
        None => {
            diesel::delete(users::table.find(user_id))
                .execute(conn)
                .await?;
            Ok(None)
        }
    }
}

#[async_trait]
impl DropoutRepository for DieselDropoutRepository {
    async fn insert_request(
        &self,
        request: &DropoutRequest,
    ) -> Result<(), DropoutRepositoryError> {
        let row = DropoutRow::from(request);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        match diesel::insert_into(dropout_requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if unique_violation(&err) == Some(ONE_PENDING_REQUEST) => Err(
                DropoutRepositoryError::pending_exists(request.student_id.to_string()),
            ),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn find_request(
        &self,
        id: &DropoutId,
    ) -> Result<Option<DropoutRequest>, DropoutRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DropoutRow> = dropout_requests::table
            .find(id.as_uuid())
            .select(DropoutRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| DropoutRequest::try_from(row).map_err(DropoutRepositoryError::query))
            .transpose()
    }

    async fn list(
        &self,
        status: DropoutStatus,
    ) -> Result<Vec<DropoutRequest>, DropoutRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DropoutRow> = dropout_requests::table
            .filter(dropout_requests::status.eq(status.as_str()))
            .order(dropout_requests::requested_at.desc())
            .select(DropoutRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(DropoutRequest::try_from),
            DropoutRepositoryError::query,
        )
    }

    async fn record_decision(
        &self,
        request: &DropoutRequest,
    ) -> Result<bool, DropoutRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            dropout_requests::table
                .filter(dropout_requests::id.eq(request.id.as_uuid()))
                .filter(dropout_requests::status.eq(DropoutStatus::Pending.as_str())),
        )
        .set((
            dropout_requests::status.eq(request.status.as_str()),
            dropout_requests::admin_response.eq(request.admin_response.as_deref()),
            dropout_requests::processed_at.eq(request.processed_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn settle_approval(
        &self,
        request: &DropoutRequest,
    ) -> Result<DropoutSettlement, DropoutRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .transaction(|conn| async move { approve_in(conn, request).await }.scope_boxed())
            .await;

        match result {
            Ok(removed) => Ok(DropoutSettlement::Approved(removed)),
            Err(Abandoned::NotPending) => Ok(DropoutSettlement::NotPending),
            Err(Abandoned::Outstanding(amount)) => Ok(DropoutSettlement::Outstanding(amount)),
            Err(Abandoned::Undecodable(message)) => Err(DropoutRepositoryError::query(message)),
            Err(Abandoned::Database(err)) => Err(map_diesel_error(err)),
        }
    }
}
