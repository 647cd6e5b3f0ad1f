//! Payment service: submissions and the admin review queue.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::fee_engine::map_ledger_error;
use crate::domain::ports::{
    LedgerRepository, PaymentRepository, PaymentRepositoryError, PaymentsCommand, PaymentsQuery,
    SubmitPaymentRequest,
};
use crate::domain::{Error, Payment, PaymentId, PaymentMethod, PaymentStatus};

fn map_payment_error(error: PaymentRepositoryError) -> Error {
    match error {
        PaymentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("payment repository unavailable: {message}"))
        }
        PaymentRepositoryError::Query { message } => {
            Error::internal(format!("payment repository error: {message}"))
        }
        PaymentRepositoryError::PendingExists { due_id } => {
            Error::conflict("this due already has a payment awaiting review")
                .with_details(json!({ "dueId": due_id }))
        }
    }
}

/// Payment service implementing [`PaymentsCommand`] and [`PaymentsQuery`].
#[derive(Clone)]
pub struct PaymentService<P, L> {
    payment_repo: Arc<P>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<P, L> PaymentService<P, L> {
    pub fn new(payment_repo: Arc<P>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            payment_repo,
            ledger,
            clock,
        }
    }
}

impl<P, L> PaymentService<P, L>
where
    P: PaymentRepository,
    L: LedgerRepository,
{
    async fn load(&self, id: PaymentId) -> Result<Payment, Error> {
        self.payment_repo
            .find_payment(&id)
            .await
            .map_err(map_payment_error)?
            .ok_or_else(|| Error::not_found(format!("payment {id} not found")))
    }

    async fn resolve(&self, payment: Payment, target: PaymentStatus) -> Result<Payment, Error> {
        payment
            .status
            .resolve(target)
            .map_err(|err| Error::conflict(err.to_string()))?;
        let resolved = self
            .payment_repo
            .resolve(&payment.id, target, self.clock.utc())
            .await
            .map_err(map_payment_error)?
            .ok_or_else(|| Error::conflict("payment was processed concurrently"))?;
        info!(
            payment_id = %resolved.id,
            due_id = %resolved.due_id,
            status = %resolved.status,
            "payment reviewed"
        );
        Ok(resolved)
    }
}

#[async_trait]
impl<P, L> PaymentsCommand for PaymentService<P, L>
where
    P: PaymentRepository,
    L: LedgerRepository,
{
    async fn submit_payment(&self, request: SubmitPaymentRequest) -> Result<Payment, Error> {
        let reference = request
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        if request.method == PaymentMethod::Upi && reference.is_none() {
            return Err(Error::invalid_request("UPI payments need a transaction reference")
                .with_details(json!({ "field": "reference" })));
        }

        let due = self
            .ledger
            .find_due(&request.due_id)
            .await
            .map_err(map_ledger_error)?
            .filter(|due| due.student_id == request.student_id)
            .ok_or_else(|| Error::not_found(format!("due {} not found", request.due_id)))?;
        if due.is_paid {
            return Err(Error::conflict(format!("the {} due is already paid", due.month)));
        }

        let payment = Payment {
            id: PaymentId::random(),
            due_id: due.id,
            student_id: request.student_id,
            method: request.method,
            reference,
            status: PaymentStatus::Pending,
            requested_at: self.clock.utc(),
            processed_at: None,
        };
        self.payment_repo
            .insert_payment(&payment)
            .await
            .map_err(map_payment_error)?;
        info!(payment_id = %payment.id, due_id = %due.id, method = %payment.method, "payment submitted");
        Ok(payment)
    }

    async fn approve_payment(&self, payment_id: PaymentId) -> Result<Payment, Error> {
        let payment = self.load(payment_id).await?;
        self.resolve(payment, PaymentStatus::Confirmed).await
    }

    async fn confirm_cash_payment(&self, payment_id: PaymentId) -> Result<Payment, Error> {
        let payment = self.load(payment_id).await?;
        if payment.method != PaymentMethod::Cash {
            return Err(Error::invalid_request(format!(
                "payment {payment_id} was not made in cash"
            )));
        }
        self.resolve(payment, PaymentStatus::Confirmed).await
    }

    async fn reject_payment(&self, payment_id: PaymentId) -> Result<Payment, Error> {
        let payment = self.load(payment_id).await?;
        self.resolve(payment, PaymentStatus::Rejected).await
    }
}

#[async_trait]
impl<P, L> PaymentsQuery for PaymentService<P, L>
where
    P: PaymentRepository,
    L: LedgerRepository,
{
    async fn pending_payments(&self) -> Result<Vec<Payment>, Error> {
        self.payment_repo.pending().await.map_err(map_payment_error)
    }
}
