//! Port for dropout request persistence.

use async_trait::async_trait;

use crate::domain::{DropoutId, DropoutRequest, DropoutStatus, RemovedStudent};

use super::define_port_error;

define_port_error! {
    /// Errors raised by dropout repository adapters.
    pub enum DropoutRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "dropout repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "dropout repository query failed: {message}",
        /// The student already has a pending request.
        PendingExists { student_id: String } =>
            "student {student_id} already has a pending dropout request",
    }
}

/// What storage did with an approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropoutSettlement {
    /// The decision is stored and the student is gone. `None` when the
    /// account had no student profile to compact.
    Approved(Option<RemovedStudent>),
    /// Someone decided the request first. Nothing was written.
    NotPending,
    /// Unpaid dues exist. Nothing was written.
    Outstanding(u64),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DropoutRepository: Send + Sync {
    async fn insert_request(&self, request: &DropoutRequest)
    -> Result<(), DropoutRepositoryError>;

    async fn find_request(
        &self,
        id: &DropoutId,
    ) -> Result<Option<DropoutRequest>, DropoutRepositoryError>;

    /// Requests in `status`, newest first.
    async fn list(&self, status: DropoutStatus)
    -> Result<Vec<DropoutRequest>, DropoutRepositoryError>;

    /// Persist a decision for a request that is still pending.
    ///
    /// Returns `false` when the request was decided concurrently.
    async fn record_decision(
        &self,
        request: &DropoutRequest,
    ) -> Result<bool, DropoutRepositoryError>;

    /// Store an approval and remove the student as one unit of work.
    ///
    /// The request must still be pending and the student must owe nothing
    /// at commit time; otherwise the request is left untouched.
    async fn settle_approval(
        &self,
        request: &DropoutRequest,
    ) -> Result<DropoutSettlement, DropoutRepositoryError>;
}

/// Fixture repository with no requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDropoutRepository;

#[async_trait]
impl DropoutRepository for FixtureDropoutRepository {
    async fn insert_request(
        &self,
        _request: &DropoutRequest,
    ) -> Result<(), DropoutRepositoryError> {
        Ok(())
    }

    async fn find_request(
        &self,
        _id: &DropoutId,
    ) -> Result<Option<DropoutRequest>, DropoutRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _status: DropoutStatus,
    ) -> Result<Vec<DropoutRequest>, DropoutRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_decision(
        &self,
        _request: &DropoutRequest,
    ) -> Result<bool, DropoutRepositoryError> {
        Ok(true)
    }

    async fn settle_approval(
        &self,
        _request: &DropoutRequest,
    ) -> Result<DropoutSettlement, DropoutRepositoryError> {
        Ok(DropoutSettlement::Approved(None))
    }
}
