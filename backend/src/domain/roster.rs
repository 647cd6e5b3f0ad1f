//! Roll number planning for class rosters.
//!
//! Roll numbers inside a class form the dense sequence `1..=N`. Because
//! storage enforces uniqueness of `(class, roll_number)`, renumbering happens
//! in two phases: every student first moves to a negative staging number, then
//! to their final position. No intermediate state can collide with a roll
//! number that is still held by another row.

use super::{ClassKey, Student, StudentId};

/// A single roll number write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollAssignment {
    pub student_id: StudentId,
    pub roll_number: i32,
}

/// Two-phase renumbering of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResequencePlan {
    order: Vec<StudentId>,
}

impl ResequencePlan {
    /// Plan a renumbering that keeps the current relative order.
    ///
    /// Students are ordered by their current roll number; ties (which storage
    /// forbids, but staging rows could leave behind) fall back to the id.
    ///
    /// # Examples
    /// ```
    /// use tutorhub::domain::{ClassKey, ResequencePlan, Student, StudentId};
    ///
    /// let roster = [3, 7]
    ///     .into_iter()
    ///     .map(|roll| Student {
    ///         id: StudentId::random(),
    ///         full_name: format!("Student {roll}"),
    ///         class_key: ClassKey::Ten,
    ///         roll_number: roll,
    ///         registration_no: format!("E.T.10({roll:03})"),
    ///     })
    ///     .collect::<Vec<_>>();
    /// let plan = ResequencePlan::for_roster(&roster);
    /// let finals: Vec<i32> = plan.final_assignments().map(|a| a.roll_number).collect();
    /// assert_eq!(finals, vec![1, 2]);
    /// ```
    pub fn for_roster(roster: &[Student]) -> Self {
        let mut ordered: Vec<&Student> = roster.iter().collect();
        ordered.sort_by_key(|student| (student.roll_number, student.id));
        Self {
            order: ordered.into_iter().map(|student| student.id).collect(),
        }
    }

    /// Phase one: `-1, -2, ...` in plan order.
    pub fn staging_assignments(&self) -> impl Iterator<Item = RollAssignment> + '_ {
        self.positions().map(|(student_id, position)| RollAssignment {
            student_id,
            roll_number: -position,
        })
    }

    /// Phase two: `1, 2, ...` in plan order.
    pub fn final_assignments(&self) -> impl Iterator<Item = RollAssignment> + '_ {
        self.positions().map(|(student_id, position)| RollAssignment {
            student_id,
            roll_number: position,
        })
    }

    fn positions(&self) -> impl Iterator<Item = (StudentId, i32)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, roll_for_position(index)))
    }
}

fn roll_for_position(index: usize) -> i32 {
    // Class sizes are bounded by the roster, far below i32::MAX.
    i32::try_from(index).map_or(i32::MAX, |value| value.saturating_add(1))
}

/// Roll number handed to a newly registered student.
///
/// The next number follows the highest roll number held in *any* class, not
/// only the student's own class. Removal resequencing later compacts the
/// class back to `1..=N`.
pub fn next_roll_number(highest_roll_number: Option<i32>) -> i32 {
    highest_roll_number.unwrap_or(0).saturating_add(1)
}

/// Outcome of removing a student from the roster.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedStudent {
    pub student_id: StudentId,
    pub class_key: ClassKey,
    pub remaining: Vec<Student>,
}
