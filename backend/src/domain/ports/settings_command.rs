//! Driving port for changing runtime settings.

use async_trait::async_trait;

use crate::domain::{Error, UpiSettings};

/// New UPI details; a missing QR keeps the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUpiRequest {
    pub upi_id: String,
    pub upi_phone: String,
    pub upi_qr: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsCommand: Send + Sync {
    /// Amount used for months that have no dues yet.
    async fn set_monthly_due_amount(&self, amount: u32) -> Result<(), Error>;

    async fn update_upi_settings(&self, request: UpdateUpiRequest) -> Result<UpiSettings, Error>;
}
