//! Roster service: admissions, removals and roll number resequencing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    RosterCommand, RosterQuery, RosterRepository, RosterRepositoryError, StudentRegistration,
};
use crate::domain::{
    ClassKey, Error, NewStudent, RemovedStudent, Student, StudentId, next_roll_number,
    registration_number, registration_serial,
};

pub(crate) fn map_roster_error(error: RosterRepositoryError) -> Error {
    match error {
        RosterRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("roster repository unavailable: {message}"))
        }
        RosterRepositoryError::Query { message } => {
            Error::internal(format!("roster repository error: {message}"))
        }
        RosterRepositoryError::Duplicate { message } => Error::conflict(message),
    }
}

/// Roster service implementing [`RosterCommand`] and [`RosterQuery`].
#[derive(Clone)]
pub struct RosterService<R> {
    roster_repo: Arc<R>,
}

impl<R> RosterService<R> {
    pub fn new(roster_repo: Arc<R>) -> Self {
        Self { roster_repo }
    }
}

impl<R> RosterService<R>
where
    R: RosterRepository,
{
    async fn next_registration_number(&self, class_key: ClassKey) -> Result<String, Error> {
        let issued = self
            .roster_repo
            .registration_numbers(class_key)
            .await
            .map_err(map_roster_error)?;
        let highest = issued
            .iter()
            .filter_map(|number| registration_serial(class_key, number))
            .max()
            .unwrap_or(0);
        Ok(registration_number(class_key, highest.saturating_add(1)))
    }
}

#[async_trait]
impl<R> RosterCommand for RosterService<R>
where
    R: RosterRepository,
{
    async fn register_student(&self, student: NewStudent) -> Result<Student, Error> {
        let highest_roll = self
            .roster_repo
            .max_roll_number()
            .await
            .map_err(map_roster_error)?;
        let registration_no = self.next_registration_number(student.class_key()).await?;
        let record = Student {
            id: StudentId::random(),
            full_name: student.full_name().to_owned(),
            class_key: student.class_key(),
            roll_number: next_roll_number(highest_roll),
            registration_no,
        };

        self.roster_repo
            .insert_student(&StudentRegistration {
                student: record.clone(),
                email: student.email().to_owned(),
            })
            .await
            .map_err(map_roster_error)?;

        info!(
            student_id = %record.id,
            class = %record.class_key,
            roll_number = record.roll_number,
            "student registered"
        );
        Ok(record)
    }

    async fn remove_student(&self, student_id: StudentId) -> Result<RemovedStudent, Error> {
        let removed = self
            .roster_repo
            .remove_student(&student_id)
            .await
            .map_err(map_roster_error)?
            .ok_or_else(|| {
                Error::not_found(format!("student {student_id} not found"))
                    .with_details(json!({ "studentId": student_id }))
            })?;
        info!(
            student_id = %student_id,
            class = %removed.class_key,
            remaining = removed.remaining.len(),
            "student removed and class resequenced"
        );
        Ok(removed)
    }

    async fn resequence(&self, class_key: ClassKey) -> Result<Vec<Student>, Error> {
        let roster = self
            .roster_repo
            .resequence_class(class_key)
            .await
            .map_err(map_roster_error)?;
        info!(class = %class_key, students = roster.len(), "roster resequenced");
        Ok(roster)
    }
}

#[async_trait]
impl<R> RosterQuery for RosterService<R>
where
    R: RosterRepository,
{
    async fn class_roster(&self, class_key: ClassKey) -> Result<Vec<Student>, Error> {
        self.roster_repo
            .class_roster(class_key)
            .await
            .map_err(map_roster_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockRosterRepository;
    use crate::domain::test_support::student;
    use rstest::rstest;

    fn admission() -> NewStudent {
        NewStudent::try_new("Meera Das", "meera@example.in", ClassKey::ElevenScience)
            .expect("valid admission")
    }

    #[tokio::test]
    async fn registration_uses_global_roll_and_class_serial() {
        let mut repo = MockRosterRepository::new();
        repo.expect_max_roll_number()
            .times(1)
            .return_once(|| Ok(Some(17)));
        repo.expect_registration_numbers()
            .withf(|class_key| *class_key == ClassKey::ElevenScience)
            .times(1)
            .return_once(|_| {
                Ok(vec![
                    "E.T.11S(003)".to_owned(),
                    "E.T.11S(009)".to_owned(),
                    "legacy".to_owned(),
                ])
            });
        repo.expect_insert_student()
            .withf(|registration| registration.email == "meera@example.in")
            .times(1)
            .return_once(|_| Ok(()));

        let service = RosterService::new(Arc::new(repo));
        let registered = service
            .register_student(admission())
            .await
            .expect("registration succeeds");

        assert_eq!(registered.roll_number, 18);
        assert_eq!(registered.registration_no, "E.T.11S(010)");
        assert_eq!(registered.class_key, ClassKey::ElevenScience);
    }

    #[tokio::test]
    async fn first_student_gets_roll_one_and_serial_one() {
        let mut repo = MockRosterRepository::new();
        repo.expect_max_roll_number().return_once(|| Ok(None));
        repo.expect_registration_numbers()
            .return_once(|_| Ok(Vec::new()));
        repo.expect_insert_student().return_once(|_| Ok(()));

        let service = RosterService::new(Arc::new(repo));
        let registered = service
            .register_student(admission())
            .await
            .expect("registration succeeds");
        assert_eq!(registered.roll_number, 1);
        assert_eq!(registered.registration_no, "E.T.11S(001)");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let mut repo = MockRosterRepository::new();
        repo.expect_max_roll_number().return_once(|| Ok(Some(2)));
        repo.expect_registration_numbers()
            .return_once(|_| Ok(Vec::new()));
        repo.expect_insert_student()
            .return_once(|_| Err(RosterRepositoryError::duplicate("email already registered")));

        let service = RosterService::new(Arc::new(repo));
        let error = service
            .register_student(admission())
            .await
            .expect_err("duplicate email");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn removal_reports_the_compacted_class() {
        let survivors = vec![student(ClassKey::Ten, 1), student(ClassKey::Ten, 2)];
        let removed_id = StudentId::random();
        let expected = RemovedStudent {
            student_id: removed_id,
            class_key: ClassKey::Ten,
            remaining: survivors.clone(),
        };
        let mut repo = MockRosterRepository::new();
        let returned = expected.clone();
        repo.expect_remove_student()
            .withf(move |id| *id == removed_id)
            .times(1)
            .return_once(move |_| Ok(Some(returned)));

        let service = RosterService::new(Arc::new(repo));
        let removed = service
            .remove_student(removed_id)
            .await
            .expect("removal succeeds");
        assert_eq!(removed, expected);
    }

    #[tokio::test]
    async fn removing_unknown_student_is_not_found() {
        let mut repo = MockRosterRepository::new();
        repo.expect_remove_student().return_once(|_| Ok(None));

        let service = RosterService::new(Arc::new(repo));
        let error = service
            .remove_student(StudentId::random())
            .await
            .expect_err("unknown student");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(RosterRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RosterRepositoryError::query("deadlock"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn resequence_failures_are_mapped(
        #[case] failure: RosterRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockRosterRepository::new();
        repo.expect_resequence_class()
            .return_once(move |_| Err(failure));

        let service = RosterService::new(Arc::new(repo));
        let error = service
            .resequence(ClassKey::Ten)
            .await
            .expect_err("resequence fails");
        assert_eq!(error.code(), expected);
    }
}
