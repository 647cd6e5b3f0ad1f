//! Driving port for roster changes.

use async_trait::async_trait;

use crate::domain::{ClassKey, Error, NewStudent, RemovedStudent, Student, StudentId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterCommand: Send + Sync {
    /// Admit a student, issuing roll and registration numbers.
    async fn register_student(&self, student: NewStudent) -> Result<Student, Error>;

    /// Delete a student with all dependent records and compact their class.
    async fn remove_student(&self, student_id: StudentId) -> Result<RemovedStudent, Error>;

    /// Renumber a class to `1..=N`, keeping the current order.
    async fn resequence(&self, class_key: ClassKey) -> Result<Vec<Student>, Error>;
}
