//! Driving port for the payment review queue.

use async_trait::async_trait;

use crate::domain::{Error, Payment};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentsQuery: Send + Sync {
    /// Payments awaiting review, newest first.
    async fn pending_payments(&self) -> Result<Vec<Payment>, Error>;
}
