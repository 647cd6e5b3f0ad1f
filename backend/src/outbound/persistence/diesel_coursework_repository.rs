//! PostgreSQL-backed `CourseworkRepository`.
//!
//! New material (a test, a PDF or a study link) and the announcement about it
//! are written in one transaction, so students never see a notification for
//! material that failed to save.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CourseworkRepository, CourseworkRepositoryError};
use crate::domain::{ClassTest, Mark, Notification, Pdf, Resource, StudentId, TestId};

use super::diesel_helpers::{basic_error_mapping, is_foreign_key_violation};
use super::models::{
    ClassTestRow, NewClassTestRow, NewMarkRow, NewPdfRow, NewResourceRow, NotificationRow,
    to_db_amount,
};
use super::pool::DbPool;
use super::schema::{class_tests, marks, notifications, pdfs, resources};

#[derive(Clone)]
pub struct DieselCourseworkRepository {
    pool: DbPool,
}

impl DieselCourseworkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(CourseworkRepositoryError);

#[async_trait]
impl CourseworkRepository for DieselCourseworkRepository {
    async fn create_test(
        &self,
        test: &ClassTest,
        announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let row = NewClassTestRow {
            id: *test.id.as_uuid(),
            name: &test.name,
            class_for: test.audience.as_str(),
            held_on: test.held_on,
            total_marks: to_db_amount(test.total_marks).map_err(CourseworkRepositoryError::query)?,
        };
        let notice = NotificationRow::from(announcement);
        let (row, notice) = (&row, &notice);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(class_tests::table)
                    .values(row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(notifications::table)
                    .values(notice)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_test(&self, id: &TestId) -> Result<Option<ClassTest>, CourseworkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ClassTestRow> = class_tests::table
            .find(id.as_uuid())
            .select(ClassTestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| ClassTest::try_from(row).map_err(CourseworkRepositoryError::query))
            .transpose()
    }

    async fn upsert_mark(&self, mark: &Mark) -> Result<(), CourseworkRepositoryError> {
        let row = NewMarkRow {
            id: Uuid::new_v4(),
            user_id: *mark.student_id.as_uuid(),
            test_id: *mark.test_id.as_uuid(),
            marks_obtained: to_db_amount(mark.marks_obtained)
                .map_err(CourseworkRepositoryError::query)?,
            updated_at: mark.updated_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = diesel::insert_into(marks::table)
            .values(&row)
            .on_conflict((marks::user_id, marks::test_id))
            .do_update()
            .set((
                marks::marks_obtained.eq(excluded(marks::marks_obtained)),
                marks::updated_at.eq(excluded(marks::updated_at)),
            ))
            .execute(&mut conn)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_foreign_key_violation(&err) => Err(
                CourseworkRepositoryError::unknown_student(mark.student_id.to_string()),
            ),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn delete_mark(
        &self,
        student_id: &StudentId,
        test_id: &TestId,
    ) -> Result<bool, CourseworkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            marks::table
                .filter(marks::user_id.eq(student_id.as_uuid()))
                .filter(marks::test_id.eq(test_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn publish_pdf(
        &self,
        pdf: &Pdf,
        announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let row = NewPdfRow {
            id: *pdf.id.as_uuid(),
            title: &pdf.title,
            file_path: &pdf.file_path,
            class_for: pdf.audience.as_str(),
            uploaded_at: pdf.uploaded_at,
        };
        let notice = NotificationRow::from(announcement);
        let (row, notice) = (&row, &notice);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(pdfs::table)
                    .values(row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(notifications::table)
                    .values(notice)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn publish_resource(
        &self,
        resource: &Resource,
        announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let row = NewResourceRow::from(resource);
        let notice = NotificationRow::from(announcement);
        let (row, notice) = (&row, &notice);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(resources::table)
                    .values(row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(notifications::table)
                    .values(notice)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
