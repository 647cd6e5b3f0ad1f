//! Driving port for class rankings.

use async_trait::async_trait;

use crate::domain::{ClassKey, Error, LeaderboardEntry, StudentId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardQuery: Send + Sync {
    /// Every student of the class ranked by total marks.
    async fn leaderboard_for_class(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<LeaderboardEntry>, Error>;

    /// The student's own row within their class leaderboard.
    async fn leaderboard_position(&self, student_id: StudentId) -> Result<LeaderboardEntry, Error>;

    /// Classes whose leaderboard is non-empty.
    async fn classes_with_data(&self) -> Result<Vec<ClassKey>, Error>;
}
