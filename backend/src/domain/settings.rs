//! Runtime settings kept in the key/value store.

use serde::{Deserialize, Serialize};

/// Amount charged per month when no setting or locked amount exists.
pub const DEFAULT_MONTHLY_DUE_AMOUNT: u32 = 1500;

/// Keys understood by the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    MonthlyDueAmount,
    UpiId,
    UpiPhone,
    UpiQr,
}

impl SettingKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MonthlyDueAmount => "monthly_due_amount",
            Self::UpiId => "upi_id",
            Self::UpiPhone => "upi_phone",
            Self::UpiQr => "upi_qr",
        }
    }
}

/// Payment details shown to students.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpiSettings {
    pub upi_id: Option<String>,
    pub upi_phone: Option<String>,
    pub upi_qr: Option<String>,
}

/// Interpret a stored monthly amount; anything but a non-negative integer is
/// treated as unset.
///
/// # Examples
/// ```
/// use tutorhub::domain::parse_monthly_amount;
///
/// assert_eq!(parse_monthly_amount(" 1200 "), Some(1200));
/// assert_eq!(parse_monthly_amount("twelve hundred"), None);
/// ```
pub fn parse_monthly_amount(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}
