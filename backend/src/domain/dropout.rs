//! Dropout requests: `pending -> approved | rejected`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DropoutId, StudentId};

/// Review state of a dropout request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropoutStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DropoutStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

storage_enum!(DropoutStatus { Pending, Approved, Rejected });

/// The request was already decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dropout request is already {0}")]
pub struct DropoutAlreadyProcessed(pub DropoutStatus);

/// A student's request to leave the centre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropoutRequest {
    pub id: DropoutId,
    pub student_id: StudentId,
    pub reason: String,
    pub status: DropoutStatus,
    pub admin_response: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl DropoutRequest {
    /// Open a pending request.
    pub fn open(student_id: StudentId, reason: impl Into<String>, requested_at: DateTime<Utc>) -> Self {
        Self {
            id: DropoutId::random(),
            student_id,
            reason: reason.into(),
            status: DropoutStatus::Pending,
            admin_response: None,
            requested_at,
            processed_at: None,
        }
    }

    /// Mark the request approved.
    pub fn approve(self, processed_at: DateTime<Utc>) -> Result<Self, DropoutAlreadyProcessed> {
        self.decide(DropoutStatus::Approved, None, processed_at)
    }

    /// Mark the request rejected with the admin's response.
    pub fn reject(
        self,
        response: impl Into<String>,
        processed_at: DateTime<Utc>,
    ) -> Result<Self, DropoutAlreadyProcessed> {
        self.decide(DropoutStatus::Rejected, Some(response.into()), processed_at)
    }

    /// Fails unless the request is still pending.
    pub fn ensure_pending(&self) -> Result<(), DropoutAlreadyProcessed> {
        match self.status {
            DropoutStatus::Pending => Ok(()),
            other => Err(DropoutAlreadyProcessed(other)),
        }
    }

    fn decide(
        self,
        status: DropoutStatus,
        admin_response: Option<String>,
        processed_at: DateTime<Utc>,
    ) -> Result<Self, DropoutAlreadyProcessed> {
        self.ensure_pending()?;
        Ok(Self {
            status,
            admin_response: admin_response.or(self.admin_response),
            processed_at: Some(processed_at),
            ..self
        })
    }
}
