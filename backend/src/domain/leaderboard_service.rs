//! Leaderboard service implementing [`LeaderboardQuery`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{LeaderboardQuery, LeaderboardRepository, LeaderboardRepositoryError};
use crate::domain::{ClassKey, Error, LeaderboardEntry, StudentId, rank_totals};

fn map_repository_error(error: LeaderboardRepositoryError) -> Error {
    match error {
        LeaderboardRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("leaderboard repository unavailable: {message}"))
        }
        LeaderboardRepositoryError::Query { message } => {
            Error::internal(format!("leaderboard repository error: {message}"))
        }
    }
}

#[derive(Clone)]
pub struct LeaderboardService<R> {
    leaderboard_repo: Arc<R>,
}

impl<R> LeaderboardService<R> {
    pub fn new(leaderboard_repo: Arc<R>) -> Self {
        Self { leaderboard_repo }
    }
}

#[async_trait]
impl<R> LeaderboardQuery for LeaderboardService<R>
where
    R: LeaderboardRepository,
{
    async fn leaderboard_for_class(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<LeaderboardEntry>, Error> {
        let totals = self
            .leaderboard_repo
            .mark_totals(class_key)
            .await
            .map_err(map_repository_error)?;
        Ok(rank_totals(totals))
    }

    async fn leaderboard_position(&self, student_id: StudentId) -> Result<LeaderboardEntry, Error> {
        let not_found = || Error::not_found(format!("student {student_id} not found"));
        let class_key = self
            .leaderboard_repo
            .class_of(&student_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(not_found)?;
        self.leaderboard_for_class(class_key)
            .await?
            .into_iter()
            .find(|entry| entry.student_id == student_id)
            .ok_or_else(not_found)
    }

    async fn classes_with_data(&self) -> Result<Vec<ClassKey>, Error> {
        let mut classes = self
            .leaderboard_repo
            .populated_classes()
            .await
            .map_err(map_repository_error)?;
        classes.sort();
        classes.dedup();
        Ok(classes)
    }
}
