//! Driving port for roster reads.

use async_trait::async_trait;

use crate::domain::{ClassKey, Error, Student};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterQuery: Send + Sync {
    /// Students of a class in roll number order.
    async fn class_roster(&self, class_key: ClassKey) -> Result<Vec<Student>, Error>;
}
