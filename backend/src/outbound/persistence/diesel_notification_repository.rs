//! PostgreSQL-backed `NotificationRepository`.
//!
//! A student sees personal rows (`user_id` set) plus announcements addressed
//! to their class or to everyone (`class_for` set). Reading and marking use
//! the same visibility predicate, so a student can never mark another
//! student's notification as read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Audience, Notification, NotificationId, StudentId};

use super::diesel_helpers::{basic_error_mapping, collect_rows};
use super::models::NotificationRow;
use super::pool::DbPool;
use super::schema::{notifications, profiles};

type Visibility = Box<dyn BoxableExpression<notifications::table, Pg, SqlType = Nullable<Bool>>>;

fn visible_to_student(user_id: Uuid, class: String) -> Visibility {
    Box::new(
        notifications::user_id
            .eq(user_id)
            .or(notifications::class_for.eq(Audience::Everyone.as_str()))
            .or(notifications::class_for.eq(class)),
    )
}

async fn class_of(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
) -> Result<Option<String>, diesel::result::Error> {
    profiles::table
        .find(user_id)
        .select(profiles::student_class)
        .first(conn)
        .await
        .optional()
}

#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(NotificationRepositoryError);

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let row = NotificationRow::from(notification);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn visible_to(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Vec<Notification>>, NotificationRepositoryError> {
        let user_id = *student_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(class) = class_of(&mut conn, user_id)
            .await
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let rows: Vec<NotificationRow> = notifications::table
            .filter(visible_to_student(user_id, class))
            .order((notifications::created_at.desc(), notifications::id.asc()))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(Notification::try_from),
            NotificationRepositoryError::query,
        )
        .map(Some)
    }

    async fn mark_read(
        &self,
        student_id: &StudentId,
        notification_id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let user_id = *student_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(class) = class_of(&mut conn, user_id)
            .await
            .map_err(map_diesel_error)?
        else {
            return Ok(false);
        };

        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(notification_id.as_uuid()))
                .filter(visible_to_student(user_id, class)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            notifications::table.filter(notifications::created_at.lt(cutoff)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        u64::try_from(deleted)
            .map_err(|_| NotificationRepositoryError::query("purge count overflowed"))
    }
}
