//! Port for payment persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Payment, PaymentId, PaymentStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment repository adapters.
    pub enum PaymentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "payment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "payment repository query failed: {message}",
        /// The due already has a payment awaiting review.
        PendingExists { due_id: String } =>
            "due {due_id} already has a pending payment",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a new pending payment.
    async fn insert_payment(&self, payment: &Payment) -> Result<(), PaymentRepositoryError>;

    async fn find_payment(&self, id: &PaymentId)
    -> Result<Option<Payment>, PaymentRepositoryError>;

    /// Move a pending payment to `status`.
    ///
    /// Confirming also marks the underlying due paid, in the same transaction.
    /// Returns `None` when the payment is missing or no longer pending.
    async fn resolve(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
        processed_at: DateTime<Utc>,
    ) -> Result<Option<Payment>, PaymentRepositoryError>;

    /// Pending payments, newest first.
    async fn pending(&self) -> Result<Vec<Payment>, PaymentRepositoryError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentRepository;

#[async_trait]
impl PaymentRepository for FixturePaymentRepository {
    async fn insert_payment(&self, _payment: &Payment) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }

    async fn find_payment(
        &self,
        _id: &PaymentId,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        Ok(None)
    }

    async fn resolve(
        &self,
        _id: &PaymentId,
        _status: PaymentStatus,
        _processed_at: DateTime<Utc>,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        Ok(None)
    }

    async fn pending(&self) -> Result<Vec<Payment>, PaymentRepositoryError> {
        Ok(Vec::new())
    }
}
