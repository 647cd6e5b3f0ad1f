//! Driving port for reading runtime settings.

use async_trait::async_trait;

use crate::domain::{Error, UpiSettings};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsQuery: Send + Sync {
    /// Configured monthly amount; `None` when unset or not a number.
    async fn monthly_due_amount(&self) -> Result<Option<u32>, Error>;

    async fn upi_settings(&self) -> Result<UpiSettings, Error>;
}
