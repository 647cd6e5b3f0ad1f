//! Internal Diesel row structs and their conversions into domain types.
//!
//! Rows never leave the persistence layer. Conversions return `String`
//! errors that each adapter wraps in its own port error, because a row that
//! fails to convert means the database holds data the domain cannot accept.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Audience, ClassKey, ClassTest, DropoutRequest, Due, MonthLabel, Notification, Payment,
    Recipient, Resource, Student, StudentId,
};

use super::schema::{
    class_tests, dropout_requests, fees, marks, notifications, payments, pdfs, profiles,
    resources, settings, users,
};

pub(crate) fn to_db_amount(value: u32) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("amount {value} exceeds the column range"))
}

fn from_db_amount(value: i32, column: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{column} is negative: {value}"))
}

fn parse_class(raw: &str) -> Result<ClassKey, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_audience(raw: &str) -> Result<Audience, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub user_id: Uuid,
    pub full_name: String,
    pub student_class: String,
    pub roll_number: i32,
    pub reg_no: String,
}

impl TryFrom<ProfileRow> for Student {
    type Error = String;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StudentId::from_uuid(row.user_id),
            full_name: row.full_name,
            class_key: parse_class(&row.student_class)?,
            roll_number: row.roll_number,
            registration_no: row.reg_no,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub user_id: Uuid,
    pub full_name: &'a str,
    pub student_class: &'a str,
    pub roll_number: i32,
    pub reg_no: &'a str,
}

// ---------------------------------------------------------------------------
// Dues and payments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = fees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: String,
    pub amount_due: i32,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FeeRow> for Due {
    type Error = String;

    fn try_from(row: FeeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            student_id: row.user_id.into(),
            month: MonthLabel::parse(&row.month).map_err(|err| err.to_string())?,
            amount: from_db_amount(row.amount_due, "amount_due")?,
            is_paid: row.is_paid,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = fees)]
pub(crate) struct NewFeeRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: &'a str,
    pub amount_due: i32,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = fees)]
pub(crate) struct FeeUpdate<'a> {
    pub month: &'a str,
    pub amount_due: i32,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub fee_id: Uuid,
    pub user_id: Uuid,
    pub method: String,
    pub reference: Option<String>,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            fee_id: *payment.due_id.as_uuid(),
            user_id: *payment.student_id.as_uuid(),
            method: payment.method.to_string(),
            reference: payment.reference.clone(),
            status: payment.status.to_string(),
            requested_at: payment.requested_at,
            processed_at: payment.processed_at,
        }
    }
}

impl TryFrom<PaymentRow> for Payment {
    type Error = String;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            due_id: row.fee_id.into(),
            student_id: row.user_id.into(),
            method: row.method.parse()?,
            reference: row.reference,
            status: row.status.parse()?,
            requested_at: row.requested_at,
            processed_at: row.processed_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Coursework
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = class_tests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClassTestRow {
    pub id: Uuid,
    pub name: String,
    pub class_for: String,
    pub held_on: NaiveDate,
    pub total_marks: i32,
}

impl TryFrom<ClassTestRow> for ClassTest {
    type Error = String;

    fn try_from(row: ClassTestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            audience: parse_audience(&row.class_for)?,
            held_on: row.held_on,
            total_marks: from_db_amount(row.total_marks, "total_marks")?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = class_tests)]
pub(crate) struct NewClassTestRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub class_for: &'a str,
    pub held_on: NaiveDate,
    pub total_marks: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = marks)]
pub(crate) struct NewMarkRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub marks_obtained: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pdfs)]
pub(crate) struct NewPdfRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub file_path: &'a str,
    pub class_for: &'a str,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resources)]
pub(crate) struct NewResourceRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub link: &'a str,
    pub description: Option<&'a str>,
    pub class_for: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Resource> for NewResourceRow<'a> {
    fn from(resource: &'a Resource) -> Self {
        Self {
            id: *resource.id.as_uuid(),
            name: &resource.name,
            link: &resource.link,
            description: resource.description.as_deref(),
            class_for: resource.audience.as_str(),
            created_at: resource.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub class_for: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        let (user_id, class_for) = match notification.recipient {
            Recipient::Student(student) => (Some(*student.as_uuid()), None),
            Recipient::Audience(audience) => (None, Some(audience.as_str().to_owned())),
        };
        Self {
            id: *notification.id.as_uuid(),
            user_id,
            class_for,
            message: notification.message.clone(),
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

impl TryFrom<NotificationRow> for Notification {
    type Error = String;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let recipient = match (row.user_id, row.class_for.as_deref()) {
            (Some(user_id), _) => Recipient::Student(user_id.into()),
            (None, Some(class_for)) => Recipient::Audience(parse_audience(class_for)?),
            (None, None) => return Err(format!("notification {} has no recipient", row.id)),
        };
        Ok(Self {
            id: row.id.into(),
            recipient,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings and dropout requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = settings)]
pub(crate) struct NewSettingRow<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = dropout_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DropoutRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub status: String,
    pub admin_response: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<&DropoutRequest> for DropoutRow {
    fn from(request: &DropoutRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            user_id: *request.student_id.as_uuid(),
            reason: request.reason.clone(),
            status: request.status.to_string(),
            admin_response: request.admin_response.clone(),
            requested_at: request.requested_at,
            processed_at: request.processed_at,
        }
    }
}

impl TryFrom<DropoutRow> for DropoutRequest {
    type Error = String;

    fn try_from(row: DropoutRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            student_id: row.user_id.into(),
            reason: row.reason,
            status: row.status.parse()?,
            admin_response: row.admin_response,
            requested_at: row.requested_at,
            processed_at: row.processed_at,
        })
    }
}
