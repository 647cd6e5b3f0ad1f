//! Driving port for submitting and reviewing payments.
//!
//! Payments move from `pending` to `confirmed` or `rejected` exactly once.
//! Confirming a payment marks its due paid.

use async_trait::async_trait;

use crate::domain::{DueId, Error, Payment, PaymentId, PaymentMethod, StudentId};

/// A student's claim to have paid a due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPaymentRequest {
    pub student_id: StudentId,
    pub due_id: DueId,
    pub method: PaymentMethod,
    /// UPI transaction reference; required for UPI payments.
    pub reference: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentsCommand: Send + Sync {
    async fn submit_payment(&self, request: SubmitPaymentRequest) -> Result<Payment, Error>;

    async fn approve_payment(&self, payment_id: PaymentId) -> Result<Payment, Error>;

    /// Approve a payment, insisting it was made in cash.
    async fn confirm_cash_payment(&self, payment_id: PaymentId) -> Result<Payment, Error>;

    async fn reject_payment(&self, payment_id: PaymentId) -> Result<Payment, Error>;
}
