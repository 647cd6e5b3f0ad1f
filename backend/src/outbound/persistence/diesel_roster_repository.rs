//! PostgreSQL-backed `RosterRepository`.
//!
//! `(student_class, roll_number)` is unique in storage, so renumbering a
//! class writes every row twice inside one transaction: first to a negative
//! staging number, then to its final position. A removal deletes the user
//! (profile, dues, payments, marks and notifications cascade) and compacts
//! the vacated class in the same transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{RosterRepository, RosterRepositoryError, StudentRegistration};
use crate::domain::{ClassKey, RemovedStudent, ResequencePlan, Student, StudentId};

use super::diesel_helpers::{basic_error_mapping, collect_rows, unique_violation};
use super::models::{NewProfileRow, NewUserRow, ProfileRow};
use super::pool::DbPool;
use super::schema::{profiles, users};

#[derive(Clone)]
pub struct DieselRosterRepository {
    pool: DbPool,
}

impl DieselRosterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(RosterRepositoryError);

fn to_students(rows: Vec<ProfileRow>) -> Result<Vec<Student>, RosterRepositoryError> {
    collect_rows(
        rows.into_iter().map(Student::try_from),
        RosterRepositoryError::query,
    )
}

fn duplicate_message(constraint: &str) -> &'static str {
    match constraint {
        "users_email_key" => "email already registered",
        "profiles_reg_no_key" => "registration number already issued",
        "profiles_class_roll_key" => "roll number already taken in this class",
        _ => "student already exists",
    }
}

async fn load_class(
    conn: &mut AsyncPgConnection,
    class_key: ClassKey,
) -> Result<Vec<ProfileRow>, diesel::result::Error> {
    profiles::table
        .filter(profiles::student_class.eq(class_key.as_str()))
        .order((profiles::roll_number.asc(), profiles::user_id.asc()))
        .select(ProfileRow::as_select())
        .load(conn)
        .await
}

fn undecodable(message: String) -> diesel::result::Error {
    diesel::result::Error::DeserializationError(message.into())
}

/// Two-phase renumbering of `class_key`; must run inside a transaction.
pub(super) async fn resequence_in(
    conn: &mut AsyncPgConnection,
    class_key: ClassKey,
) -> Result<Vec<ProfileRow>, diesel::result::Error> {
    let rows = load_class(conn, class_key).await?;
    let roster = collect_rows(rows.into_iter().map(Student::try_from), undecodable)?;
    let plan = ResequencePlan::for_roster(&roster);

    for assignment in plan.staging_assignments().chain(plan.final_assignments()) {
        diesel::update(profiles::table.find(assignment.student_id.as_uuid()))
            .set(profiles::roll_number.eq(assignment.roll_number))
            .execute(conn)
            .await?;
    }

    load_class(conn, class_key).await
}

/// Delete a student's account and compact the class they leave; must run
/// inside a transaction. `None` when the user has no profile.
pub(super) async fn remove_in(
    conn: &mut AsyncPgConnection,
    user_id: uuid::Uuid,
) -> Result<Option<(ClassKey, Vec<ProfileRow>)>, diesel::result::Error> {
    let class: Option<String> = profiles::table
        .find(user_id)
        .select(profiles::student_class)
        .first(conn)
        .await
        .optional()?;
    let Some(class) = class else {
        return Ok(None);
    };
    let class_key = class
        .parse::<ClassKey>()
        .map_err(|err| diesel::result::Error::DeserializationError(Box::new(err)))?;
    diesel::delete(users::table.find(user_id))
        .execute(conn)
        .await?;
    let remaining = resequence_in(conn, class_key).await?;
    Ok(Some((class_key, remaining)))
}

/// Convert a removal's surviving rows into the domain outcome.
pub(super) fn removed_student(
    student_id: StudentId,
    class_key: ClassKey,
    remaining: Vec<ProfileRow>,
) -> Result<RemovedStudent, String> {
    Ok(RemovedStudent {
        student_id,
        class_key,
        remaining: remaining
            .into_iter()
            .map(Student::try_from)
            .collect::<Result<_, _>>()?,
    })
}

#[async_trait]
impl RosterRepository for DieselRosterRepository {
    async fn class_roster(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<Student>, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = load_class(&mut conn, class_key)
            .await
            .map_err(map_diesel_error)?;
        to_students(rows)
    }

    async fn find_student(&self, id: &StudentId) -> Result<Option<Student>, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProfileRow> = profiles::table
            .find(id.as_uuid())
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| Student::try_from(row).map_err(RosterRepositoryError::query))
            .transpose()
    }

    async fn max_roll_number(&self) -> Result<Option<i32>, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        profiles::table
            .select(diesel::dsl::max(profiles::roll_number))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn registration_numbers(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<String>, RosterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        profiles::table
            .filter(profiles::student_class.eq(class_key.as_str()))
            .select(profiles::reg_no)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_student(
        &self,
        registration: &StudentRegistration,
    ) -> Result<(), RosterRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let student = &registration.student;
        let user = NewUserRow {
            id: *student.id.as_uuid(),
            email: &registration.email,
            is_admin: false,
        };
        let profile = NewProfileRow {
            user_id: *student.id.as_uuid(),
            full_name: &student.full_name,
            student_class: student.class_key.as_str(),
            roll_number: student.roll_number,
            reg_no: &student.registration_no,
        };
        let (user, profile) = (&user, &profile);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(user)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(profiles::table)
                        .values(profile)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(())
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(err) => match unique_violation(&err) {
                Some(constraint) => Err(RosterRepositoryError::duplicate(duplicate_message(
                    constraint,
                ))),
                None => Err(map_diesel_error(err)),
            },
        }
    }

    async fn resequence_class(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<Student>, RosterRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = conn
            .transaction(|conn| async move { resequence_in(conn, class_key).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)?;
        to_students(rows)
    }

    async fn remove_student(
        &self,
        id: &StudentId,
    ) -> Result<Option<RemovedStudent>, RosterRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let user_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = conn
            .transaction(|conn| async move { remove_in(conn, user_id).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)?;

        removed
            .map(|(class_key, remaining)| {
                removed_student(*id, class_key, remaining).map_err(RosterRepositoryError::query)
            })
            .transpose()
    }
}
