//! Port for student and profile persistence.
//!
//! Roll numbers are unique per class in storage. Adapters renumber a class by
//! applying a [`crate::domain::ResequencePlan`] in a single transaction, so a
//! failure never leaves the negative staging numbers behind.

use async_trait::async_trait;

use crate::domain::{ClassKey, RemovedStudent, Student, StudentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by roster repository adapters.
    pub enum RosterRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "roster repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "roster repository query failed: {message}",
        /// Email, registration number or roll number is already taken.
        Duplicate { message: String } =>
            "roster entry already exists: {message}",
    }
}

/// A student about to be written together with their login email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRegistration {
    pub student: Student,
    pub email: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// Students of a class ordered by roll number.
    async fn class_roster(&self, class_key: ClassKey) -> Result<Vec<Student>, RosterRepositoryError>;

    async fn find_student(&self, id: &StudentId) -> Result<Option<Student>, RosterRepositoryError>;

    /// Highest roll number across every class.
    async fn max_roll_number(&self) -> Result<Option<i32>, RosterRepositoryError>;

    /// Registration numbers already issued to a class.
    async fn registration_numbers(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<String>, RosterRepositoryError>;

    /// Create the user and profile rows in one transaction.
    async fn insert_student(
        &self,
        registration: &StudentRegistration,
    ) -> Result<(), RosterRepositoryError>;

    /// Renumber a class to `1..=N` in one transaction, returning the result.
    async fn resequence_class(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<Student>, RosterRepositoryError>;

    /// Delete the student with every dependent row, then resequence the
    /// vacated class, all in one transaction. `None` for unknown ids.
    async fn remove_student(
        &self,
        id: &StudentId,
    ) -> Result<Option<RemovedStudent>, RosterRepositoryError>;
}

/// Fixture roster with no students.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRosterRepository;

#[async_trait]
impl RosterRepository for FixtureRosterRepository {
    async fn class_roster(
        &self,
        _class_key: ClassKey,
    ) -> Result<Vec<Student>, RosterRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_student(
        &self,
        _id: &StudentId,
    ) -> Result<Option<Student>, RosterRepositoryError> {
        Ok(None)
    }

    async fn max_roll_number(&self) -> Result<Option<i32>, RosterRepositoryError> {
        Ok(None)
    }

    async fn registration_numbers(
        &self,
        _class_key: ClassKey,
    ) -> Result<Vec<String>, RosterRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert_student(
        &self,
        _registration: &StudentRegistration,
    ) -> Result<(), RosterRepositoryError> {
        Ok(())
    }

    async fn resequence_class(
        &self,
        _class_key: ClassKey,
    ) -> Result<Vec<Student>, RosterRepositoryError> {
        Ok(Vec::new())
    }

    async fn remove_student(
        &self,
        _id: &StudentId,
    ) -> Result<Option<RemovedStudent>, RosterRepositoryError> {
        Ok(None)
    }
}
