//! Port for mark aggregation.

use async_trait::async_trait;

use crate::domain::{ClassKey, MarkTotals, StudentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by leaderboard repository adapters.
    pub enum LeaderboardRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "leaderboard repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "leaderboard repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Mark totals for every student in a class, including those without
    /// marks (outer join, total 0).
    async fn mark_totals(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<MarkTotals>, LeaderboardRepositoryError>;

    /// Class a student belongs to; `None` for unknown students.
    async fn class_of(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<ClassKey>, LeaderboardRepositoryError>;

    /// Classes with at least one student.
    async fn populated_classes(&self) -> Result<Vec<ClassKey>, LeaderboardRepositoryError>;
}

/// Fixture repository with empty classes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLeaderboardRepository;

#[async_trait]
impl LeaderboardRepository for FixtureLeaderboardRepository {
    async fn mark_totals(
        &self,
        _class_key: ClassKey,
    ) -> Result<Vec<MarkTotals>, LeaderboardRepositoryError> {
        Ok(Vec::new())
    }

    async fn class_of(
        &self,
        _student_id: &StudentId,
    ) -> Result<Option<ClassKey>, LeaderboardRepositoryError> {
        Ok(None)
    }

    async fn populated_classes(&self) -> Result<Vec<ClassKey>, LeaderboardRepositoryError> {
        Ok(Vec::new())
    }
}
