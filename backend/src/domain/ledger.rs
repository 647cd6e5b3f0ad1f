//! Dues and payments: the records behind the fee ledger and their states.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DueId, PaymentId, StudentId};

/// Calendar month a due belongs to, rendered as `"<MonthName> <Year>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthLabel(String);

/// Raised when a month label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("month must look like \"March 2025\", got {0:?}")]
pub struct InvalidMonthLabel(pub String);

impl MonthLabel {
    const FORMAT: &'static str = "%B %Y";

    /// Label for the month containing `instant` in the instant's own offset.
    ///
    /// # Examples
    /// ```
    /// use chrono::DateTime;
    /// use tutorhub::domain::MonthLabel;
    ///
    /// let now = DateTime::parse_from_rfc3339("2025-03-31T23:30:00+05:30").expect("timestamp");
    /// assert_eq!(MonthLabel::from_instant(&now).as_str(), "March 2025");
    /// ```
    pub fn from_instant(instant: &DateTime<FixedOffset>) -> Self {
        Self(instant.format(Self::FORMAT).to_string())
    }

    /// Parse and normalise a user supplied label; abbreviations are accepted.
    pub fn parse(raw: &str) -> Result<Self, InvalidMonthLabel> {
        let candidate = format!("1 {}", raw.trim());
        NaiveDate::parse_from_str(&candidate, "%d %B %Y")
            .map(|date| Self(date.format(Self::FORMAT).to_string()))
            .map_err(|_| InvalidMonthLabel(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MonthLabel {
    type Error = InvalidMonthLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthLabel> for String {
    fn from(value: MonthLabel) -> Self {
        value.0
    }
}

/// One month's payment obligation for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Due {
    pub id: DueId,
    pub student_id: StudentId,
    pub month: MonthLabel,
    pub amount: u32,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

/// A due waiting to be written, with the notification text announcing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDraft {
    pub student_id: StudentId,
    pub month: MonthLabel,
    pub amount: u32,
    pub is_paid: bool,
    pub notification: Option<String>,
}

/// Notification text announcing a freshly assigned monthly due.
pub fn due_notification_message(month: &MonthLabel, amount: u32) -> String {
    format!("{month} month due added - ₹{amount}. Please pay your dues on time.")
}

/// A student's dues with paid and unpaid totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatus {
    pub dues: Vec<Due>,
    pub outstanding: u64,
    pub paid: u64,
    pub total_due: u64,
}

impl FeeStatus {
    pub fn from_dues(dues: Vec<Due>) -> Self {
        let (paid, outstanding) = dues.iter().fold((0_u64, 0_u64), |(paid, unpaid), due| {
            if due.is_paid {
                (paid + u64::from(due.amount), unpaid)
            } else {
                (paid, unpaid + u64::from(due.amount))
            }
        });
        Self {
            dues,
            outstanding,
            paid,
            total_due: paid + outstanding,
        }
    }
}

/// Result of assigning the current month's dues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDuesOutcome {
    pub month: MonthLabel,
    pub amount: u32,
    pub created: usize,
    pub skipped: usize,
}

/// Result of a manual bulk due assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuesBatchOutcome {
    pub added: usize,
    pub skipped: usize,
}

/// How a student paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Cash,
}

impl PaymentMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::Cash => "cash",
        }
    }
}

/// Review state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// A payment left the pending state already.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("payment is already {0}")]
pub struct PaymentAlreadyProcessed(pub PaymentStatus);

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }

    /// Move from pending to `target`; processed payments never change again.
    pub fn resolve(self, target: PaymentStatus) -> Result<PaymentStatus, PaymentAlreadyProcessed> {
        match (self, target) {
            (Self::Pending, Self::Confirmed | Self::Rejected) => Ok(target),
            (current, _) => Err(PaymentAlreadyProcessed(current)),
        }
    }
}

storage_enum!(PaymentMethod { Upi, Cash });
storage_enum!(PaymentStatus { Pending, Confirmed, Rejected });

/// A payment submitted against a due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub due_id: DueId,
    pub student_id: StudentId,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn due(amount: u32, is_paid: bool) -> Due {
        Due {
            id: DueId::random(),
            student_id: StudentId::random(),
            month: MonthLabel::parse("March 2025").expect("valid month"),
            amount,
            is_paid,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[rstest]
    #[case("2025-03-01T00:00:00+05:30", "March 2025")]
    #[case("2025-12-31T23:59:59+05:30", "December 2025")]
    fn month_label_uses_local_offset(#[case] raw: &str, #[case] expected: &str) {
        let instant = DateTime::parse_from_rfc3339(raw).expect("timestamp");
        assert_eq!(MonthLabel::from_instant(&instant).as_str(), expected);
    }

    #[test]
    fn month_label_crosses_boundary_with_offset() {
        let utc = DateTime::parse_from_rfc3339("2025-02-28T20:00:00Z").expect("timestamp");
        let ist = FixedOffset::east_opt(330 * 60).expect("offset");
        let label = MonthLabel::from_instant(&utc.with_timezone(&ist));
        assert_eq!(label.as_str(), "March 2025");
    }

    #[rstest]
    #[case("March 2025", "March 2025")]
    #[case(" mar 2025 ", "March 2025")]
    #[case("SEPTEMBER 2024", "September 2024")]
    fn month_label_parse_normalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(MonthLabel::parse(raw).expect("valid").as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("2025-03")]
    #[case("Smarch 2025")]
    fn month_label_parse_rejects_garbage(#[case] raw: &str) {
        assert!(MonthLabel::parse(raw).is_err());
    }

    #[test]
    fn due_message_names_month_and_amount() {
        let month = MonthLabel::parse("March 2025").expect("valid");
        assert_eq!(
            due_notification_message(&month, 1200),
            "March 2025 month due added - ₹1200. Please pay your dues on time."
        );
    }

    #[test]
    fn fee_status_splits_paid_and_outstanding() {
        let status = FeeStatus::from_dues(vec![due(500, false), due(400, true), due(700, false)]);
        assert_eq!(status.outstanding, 1200);
        assert_eq!(status.paid, 400);
        assert_eq!(status.total_due, 1600);
    }

    #[rstest]
    #[case(PaymentStatus::Pending, PaymentStatus::Confirmed, Ok(PaymentStatus::Confirmed))]
    #[case(PaymentStatus::Pending, PaymentStatus::Rejected, Ok(PaymentStatus::Rejected))]
    #[case(
        PaymentStatus::Pending,
        PaymentStatus::Pending,
        Err(PaymentAlreadyProcessed(PaymentStatus::Pending))
    )]
    #[case(
        PaymentStatus::Confirmed,
        PaymentStatus::Rejected,
        Err(PaymentAlreadyProcessed(PaymentStatus::Confirmed))
    )]
    #[case(
        PaymentStatus::Rejected,
        PaymentStatus::Confirmed,
        Err(PaymentAlreadyProcessed(PaymentStatus::Rejected))
    )]
    fn payment_status_transitions(
        #[case] from: PaymentStatus,
        #[case] to: PaymentStatus,
        #[case] expected: Result<PaymentStatus, PaymentAlreadyProcessed>,
    ) {
        assert_eq!(from.resolve(to), expected);
    }

    #[test]
    fn storage_enums_round_trip() {
        assert_eq!("cash".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert_eq!("rejected".parse::<PaymentStatus>(), Ok(PaymentStatus::Rejected));
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }
}
