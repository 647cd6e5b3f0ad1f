//! PostgreSQL-backed `LeaderboardRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{LeaderboardRepository, LeaderboardRepositoryError};
use crate::domain::{ClassKey, MarkTotals, StudentId};

use super::diesel_helpers::{basic_error_mapping, collect_rows};
use super::pool::DbPool;
use super::schema::profiles;

/// Every profile of the class, with marks summed through an outer join so
/// students without marks still appear with a total of zero.
const MARK_TOTALS_SQL: &str = r#"
SELECT p.user_id,
       p.full_name,
       p.roll_number,
       COALESCE(SUM(m.marks_obtained), 0)::BIGINT AS total,
       COUNT(m.id) AS tests_taken
FROM profiles p
LEFT JOIN marks m ON m.user_id = p.user_id
WHERE p.student_class = $1
GROUP BY p.user_id, p.full_name, p.roll_number
ORDER BY total DESC, p.roll_number ASC
"#;

#[derive(Debug, QueryableByName)]
struct MarkTotalsRow {
    #[diesel(sql_type = SqlUuid)]
    user_id: Uuid,
    #[diesel(sql_type = Text)]
    full_name: String,
    #[diesel(sql_type = Integer)]
    roll_number: i32,
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    tests_taken: i64,
}

impl From<MarkTotalsRow> for MarkTotals {
    fn from(row: MarkTotalsRow) -> Self {
        Self {
            student_id: StudentId::from_uuid(row.user_id),
            full_name: row.full_name,
            roll_number: row.roll_number,
            total: row.total,
            tests_taken: row.tests_taken,
        }
    }
}

#[derive(Clone)]
pub struct DieselLeaderboardRepository {
    pool: DbPool,
}

impl DieselLeaderboardRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(LeaderboardRepositoryError);

#[async_trait]
impl LeaderboardRepository for DieselLeaderboardRepository {
    async fn mark_totals(
        &self,
        class_key: ClassKey,
    ) -> Result<Vec<MarkTotals>, LeaderboardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MarkTotalsRow> = sql_query(MARK_TOTALS_SQL)
            .bind::<Text, _>(class_key.as_str())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(MarkTotals::from).collect())
    }

    async fn class_of(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<ClassKey>, LeaderboardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let class: Option<String> = profiles::table
            .find(student_id.as_uuid())
            .select(profiles::student_class)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        class
            .map(|raw| {
                raw.parse::<ClassKey>()
                    .map_err(|err| LeaderboardRepositoryError::query(err.to_string()))
            })
            .transpose()
    }

    async fn populated_classes(&self) -> Result<Vec<ClassKey>, LeaderboardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let classes: Vec<String> = profiles::table
            .select(profiles::student_class)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            classes
                .into_iter()
                .map(|raw| raw.parse::<ClassKey>().map_err(|err| err.to_string())),
            LeaderboardRepositoryError::query,
        )
    }
}
