//! Dropout workflow: students ask to leave, admins approve or reject.
//!
//! Approval is refused while the student owes anything. An approved request
//! removes the student and compacts the roll numbers of the class they leave
//! behind; storage settles the decision and the removal together, so a
//! failed removal leaves the request pending and open to a retry.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::fee_engine::map_ledger_error;
use crate::domain::ports::{
    DropoutCommand, DropoutQuery, DropoutRepository, DropoutRepositoryError, DropoutSettlement,
    LedgerRepository, RosterRepository,
};
use crate::domain::roster_service::map_roster_error;
use crate::domain::{DropoutId, DropoutRequest, DropoutStatus, Error, StudentId};

fn map_dropout_error(error: DropoutRepositoryError) -> Error {
    match error {
        DropoutRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("dropout repository unavailable: {message}"))
        }
        DropoutRepositoryError::Query { message } => {
            Error::internal(format!("dropout repository error: {message}"))
        }
        DropoutRepositoryError::PendingExists { student_id } => {
            Error::conflict("a dropout request is already awaiting review")
                .with_details(json!({ "studentId": student_id }))
        }
    }
}

#[derive(Clone)]
pub struct DropoutService<D, L, R> {
    dropout_repo: Arc<D>,
    ledger: Arc<L>,
    roster_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<D, L, R> DropoutService<D, L, R> {
    pub fn new(
        dropout_repo: Arc<D>,
        ledger: Arc<L>,
        roster_repo: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dropout_repo,
            ledger,
            roster_repo,
            clock,
        }
    }
}

impl<D, L, R> DropoutService<D, L, R>
where
    D: DropoutRepository,
    L: LedgerRepository,
    R: RosterRepository,
{
    async fn load_pending(&self, id: DropoutId) -> Result<DropoutRequest, Error> {
        let request = self
            .dropout_repo
            .find_request(&id)
            .await
            .map_err(map_dropout_error)?
            .ok_or_else(|| Error::not_found(format!("dropout request {id} not found")))?;
        request
            .ensure_pending()
            .map_err(|err| Error::conflict(err.to_string()))?;
        Ok(request)
    }

    fn owes(outstanding: u64) -> Error {
        Error::conflict(format!("student still owes {outstanding} in unpaid dues"))
            .with_details(json!({ "outstanding": outstanding }))
    }

    async fn store_decision(&self, decided: &DropoutRequest) -> Result<(), Error> {
        let stored = self
            .dropout_repo
            .record_decision(decided)
            .await
            .map_err(map_dropout_error)?;
        if stored {
            Ok(())
        } else {
            Err(Error::conflict("dropout request was processed concurrently"))
        }
    }
}

#[async_trait]
impl<D, L, R> DropoutCommand for DropoutService<D, L, R>
where
    D: DropoutRepository,
    L: LedgerRepository,
    R: RosterRepository,
{
    async fn request_dropout(
        &self,
        student_id: StudentId,
        reason: String,
    ) -> Result<DropoutRequest, Error> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::invalid_request("a reason is required")
                .with_details(json!({ "field": "reason" })));
        }
        self.roster_repo
            .find_student(&student_id)
            .await
            .map_err(map_roster_error)?
            .ok_or_else(|| Error::not_found(format!("student {student_id} not found")))?;

        let request = DropoutRequest::open(student_id, reason, self.clock.utc());
        self.dropout_repo
            .insert_request(&request)
            .await
            .map_err(map_dropout_error)?;
        info!(request_id = %request.id, student_id = %student_id, "dropout requested");
        Ok(request)
    }

    async fn approve_dropout(&self, request_id: DropoutId) -> Result<DropoutRequest, Error> {
        let request = self.load_pending(request_id).await?;
        let outstanding = self
            .ledger
            .outstanding_total(&request.student_id)
            .await
            .map_err(map_ledger_error)?;
        if outstanding > 0 {
            return Err(Self::owes(outstanding));
        }

        let student_id = request.student_id;
        let approved = request
            .approve(self.clock.utc())
            .map_err(|err| Error::conflict(err.to_string()))?;
        let removed = match self
            .dropout_repo
            .settle_approval(&approved)
            .await
            .map_err(map_dropout_error)?
        {
            DropoutSettlement::Approved(removed) => removed,
            DropoutSettlement::NotPending => {
                return Err(Error::conflict("dropout request was processed concurrently"));
            }
            DropoutSettlement::Outstanding(outstanding) => return Err(Self::owes(outstanding)),
        };
        info!(
            request_id = %approved.id,
            student_id = %student_id,
            class = ?removed.as_ref().map(|r| r.class_key),
            "dropout approved"
        );
        Ok(approved)
    }

    async fn reject_dropout(
        &self,
        request_id: DropoutId,
        admin_response: String,
    ) -> Result<DropoutRequest, Error> {
        let request = self.load_pending(request_id).await?;
        let rejected = request
            .reject(admin_response.trim(), self.clock.utc())
            .map_err(|err| Error::conflict(err.to_string()))?;
        self.store_decision(&rejected).await?;
        info!(request_id = %rejected.id, "dropout rejected");
        Ok(rejected)
    }
}

#[async_trait]
impl<D, L, R> DropoutQuery for DropoutService<D, L, R>
where
    D: DropoutRepository,
    L: LedgerRepository,
    R: RosterRepository,
{
    async fn list_dropouts(&self, status: DropoutStatus) -> Result<Vec<DropoutRequest>, Error> {
        self.dropout_repo
            .list(status)
            .await
            .map_err(map_dropout_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockDropoutRepository, MockLedgerRepository, MockRosterRepository,
    };
    use crate::domain::test_support::{fixture_clock, fixture_timestamp, student};
    use crate::domain::{ClassKey, ErrorCode, RemovedStudent};
    use rstest::rstest;

    type Service = DropoutService<MockDropoutRepository, MockLedgerRepository, MockRosterRepository>;

    fn service(
        dropouts: MockDropoutRepository,
        ledger: MockLedgerRepository,
        roster: MockRosterRepository,
    ) -> Service {
        DropoutService::new(
            Arc::new(dropouts),
            Arc::new(ledger),
            Arc::new(roster),
            fixture_clock(),
        )
    }

    fn pending_request() -> DropoutRequest {
        DropoutRequest::open(StudentId::random(), "relocating", fixture_timestamp())
    }

    fn finding(request: DropoutRequest) -> MockDropoutRepository {
        let mut dropouts = MockDropoutRepository::new();
        dropouts
            .expect_find_request()
            .return_once(move |_| Ok(Some(request)));
        dropouts
    }

    #[tokio::test]
    async fn unpaid_dues_block_approval() {
        let request = pending_request();
        let request_id = request.id;
        let mut dropouts = finding(request);
        dropouts.expect_record_decision().times(0);
        dropouts.expect_settle_approval().times(0);
        let mut ledger = MockLedgerRepository::new();
        ledger.expect_outstanding_total().return_once(|_| Ok(500));

        let error = service(dropouts, ledger, MockRosterRepository::new())
            .approve_dropout(request_id)
            .await
            .expect_err("dues outstanding");

        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.details(), Some(&json!({ "outstanding": 500 })));
    }

    #[tokio::test]
    async fn approval_removes_a_settled_student() {
        let request = pending_request();
        let request_id = request.id;
        let student_id = request.student_id;
        let mut dropouts = finding(request);
        dropouts.expect_record_decision().times(0);
        dropouts
            .expect_settle_approval()
            .withf(move |decided| {
                decided.status == DropoutStatus::Approved && decided.student_id == student_id
            })
            .times(1)
            .return_once(move |_| {
                Ok(DropoutSettlement::Approved(Some(RemovedStudent {
                    student_id,
                    class_key: ClassKey::Ten,
                    remaining: vec![student(ClassKey::Ten, 1)],
                })))
            });
        let mut ledger = MockLedgerRepository::new();
        ledger.expect_outstanding_total().return_once(|_| Ok(0));

        let approved = service(dropouts, ledger, MockRosterRepository::new())
            .approve_dropout(request_id)
            .await
            .expect("approval succeeds");
        assert_eq!(approved.status, DropoutStatus::Approved);
        assert_eq!(approved.processed_at, Some(fixture_timestamp()));
    }

    #[tokio::test]
    async fn failed_removal_surfaces_without_a_separate_decision_write() {
        let request = pending_request();
        let request_id = request.id;
        let mut dropouts = finding(request);
        dropouts.expect_record_decision().times(0);
        dropouts
            .expect_settle_approval()
            .times(1)
            .return_once(|_| Err(DropoutRepositoryError::connection("pool closed")));
        let mut ledger = MockLedgerRepository::new();
        ledger.expect_outstanding_total().return_once(|_| Ok(0));
        let mut roster = MockRosterRepository::new();
        roster.expect_remove_student().times(0);

        let error = service(dropouts, ledger, roster)
            .approve_dropout(request_id)
            .await
            .expect_err("removal failed");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[case(DropoutSettlement::NotPending, None)]
    #[case(DropoutSettlement::Outstanding(300), Some(json!({ "outstanding": 300 })))]
    #[tokio::test]
    async fn settlement_refusals_are_conflicts(
        #[case] settlement: DropoutSettlement,
        #[case] details: Option<serde_json::Value>,
    ) {
        let request = pending_request();
        let request_id = request.id;
        let mut dropouts = finding(request);
        dropouts
            .expect_settle_approval()
            .return_once(move |_| Ok(settlement));
        let mut ledger = MockLedgerRepository::new();
        ledger.expect_outstanding_total().return_once(|_| Ok(0));

        let error = service(dropouts, ledger, MockRosterRepository::new())
            .approve_dropout(request_id)
            .await
            .expect_err("settlement refused");

        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.details(), details.as_ref());
    }

    #[rstest]
    #[case(DropoutStatus::Approved)]
    #[case(DropoutStatus::Rejected)]
    #[tokio::test]
    async fn decided_requests_cannot_be_decided_again(#[case] status: DropoutStatus) {
        let request = DropoutRequest {
            status,
            ..pending_request()
        };
        let request_id = request.id;
        let mut dropouts = finding(request);
        dropouts.expect_record_decision().times(0);

        let error = service(
            dropouts,
            MockLedgerRepository::new(),
            MockRosterRepository::new(),
        )
        .reject_dropout(request_id, "no".to_owned())
        .await
        .expect_err("already decided");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn rejection_keeps_the_admin_response() {
        let request = pending_request();
        let request_id = request.id;
        let mut dropouts = finding(request);
        dropouts
            .expect_record_decision()
            .withf(|decided| decided.admin_response.as_deref() == Some("Finish the term first"))
            .return_once(|_| Ok(true));

        let rejected = service(
            dropouts,
            MockLedgerRepository::new(),
            MockRosterRepository::new(),
        )
        .reject_dropout(request_id, " Finish the term first ".to_owned())
        .await
        .expect("rejection succeeds");
        assert_eq!(rejected.status, DropoutStatus::Rejected);
    }

    #[tokio::test]
    async fn second_pending_request_is_a_conflict() {
        let existing = student(ClassKey::Eight, 3);
        let student_id = existing.id;
        let mut roster = MockRosterRepository::new();
        roster
            .expect_find_student()
            .return_once(move |_| Ok(Some(existing)));
        let mut dropouts = MockDropoutRepository::new();
        dropouts.expect_insert_request().return_once(move |_| {
            Err(DropoutRepositoryError::pending_exists(student_id.to_string()))
        });

        let error = service(dropouts, MockLedgerRepository::new(), roster)
            .request_dropout(student_id, "moving".to_owned())
            .await
            .expect_err("already pending");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn blank_reason_is_rejected() {
        let error = service(
            MockDropoutRepository::new(),
            MockLedgerRepository::new(),
            MockRosterRepository::new(),
        )
        .request_dropout(StudentId::random(), "  ".to_owned())
        .await
        .expect_err("blank reason");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn missing_request_is_not_found() {
        let mut dropouts = MockDropoutRepository::new();
        dropouts.expect_find_request().return_once(|_| Ok(None));

        let error = service(
            dropouts,
            MockLedgerRepository::new(),
            MockRosterRepository::new(),
        )
        .approve_dropout(DropoutId::random())
        .await
        .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
