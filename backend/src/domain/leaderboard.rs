//! Per-class ranking by total marks.

use serde::Serialize;

use super::StudentId;

/// Raw aggregate for one student: every student in the class appears, even
/// with no marks recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkTotals {
    pub student_id: StudentId,
    pub full_name: String,
    pub roll_number: i32,
    pub total: i64,
    pub tests_taken: i64,
}

/// A ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub student_id: StudentId,
    pub full_name: String,
    pub roll_number: i32,
    pub total: i64,
    pub total_tests: i64,
}

/// Order totals by total descending, then roll number ascending, and assign
/// 1-based ranks by position.
///
/// # Examples
/// ```
/// use tutorhub::domain::{MarkTotals, StudentId, rank_totals};
///
/// let totals = vec![
///     MarkTotals { student_id: StudentId::random(), full_name: "B".into(), roll_number: 2, total: 80, tests_taken: 2 },
///     MarkTotals { student_id: StudentId::random(), full_name: "A".into(), roll_number: 1, total: 80, tests_taken: 2 },
/// ];
/// let ranked = rank_totals(totals);
/// assert_eq!(ranked[0].full_name, "A");
/// assert_eq!(ranked[1].rank, 2);
/// ```
pub fn rank_totals(mut totals: Vec<MarkTotals>) -> Vec<LeaderboardEntry> {
    totals.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.roll_number.cmp(&b.roll_number))
    });
    totals
        .into_iter()
        .zip(1_u32..)
        .map(|(row, rank)| LeaderboardEntry {
            rank,
            student_id: row.student_id,
            full_name: row.full_name,
            roll_number: row.roll_number,
            total: row.total,
            total_tests: row.tests_taken,
        })
        .collect()
}
