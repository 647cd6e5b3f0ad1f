//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path and body values arrive as strings so that a malformed identifier or
//! class key produces the standard `invalid_request` payload naming the
//! field, rather than actix's plain-text extractor error.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{Audience, ClassKey, Error, MonthLabel};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidClass,
    InvalidMonth,
    InvalidDate,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidClass => "invalid_class",
            ErrorCode::InvalidMonth => "invalid_month",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({"field": field.as_str(), "value": value, "code": code.as_str()}),
        None => json!({"field": field.as_str(), "code": code.as_str()}),
    };
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
        None,
    )
}

pub(crate) fn invalid_value_error(field: FieldName, message: impl Into<String>, value: &str) -> Error {
    field_error(field, message.into(), ErrorCode::InvalidValue, Some(value))
}

/// Parse any UUID-backed identifier.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
{
    value.parse().map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            Some(value),
        )
    })
}

pub(crate) fn parse_id_list<T>(values: &[String], field: FieldName) -> Result<Vec<T>, Error>
where
    T: FromStr,
{
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value.parse().map_err(|_| {
                let name = field.as_str();
                Error::invalid_request(format!("{name} must contain valid UUIDs")).with_details(
                    json!({
                        "field": name,
                        "index": index,
                        "value": value,
                        "code": ErrorCode::InvalidUuid.as_str(),
                    }),
                )
            })
        })
        .collect()
}

pub(crate) fn parse_class_key(value: &str, field: FieldName) -> Result<ClassKey, Error> {
    value.parse().map_err(|_| {
        field_error(
            field,
            format!("unknown class: {value}"),
            ErrorCode::InvalidClass,
            Some(value),
        )
    })
}

/// Parse an audience: `all` or a class key.
pub(crate) fn parse_audience(value: &str, field: FieldName) -> Result<Audience, Error> {
    value.parse().map_err(|_| {
        field_error(
            field,
            format!("{} must be \"all\" or a class key", field.as_str()),
            ErrorCode::InvalidClass,
            Some(value),
        )
    })
}

pub(crate) fn parse_month(value: &str, field: FieldName) -> Result<MonthLabel, Error> {
    MonthLabel::parse(value).map_err(|err| {
        field_error(field, err.to_string(), ErrorCode::InvalidMonth, Some(value))
    })
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a YYYY-MM-DD date"),
            ErrorCode::InvalidDate,
            Some(value),
        )
    })
}
