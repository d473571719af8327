use crate::domain::category::CategoryContent;
use crate::domain::task::{Priority, Status, TaskContent};
use crate::domain::user::Credentials;
use crate::dto;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::borrow::Cow;
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// A payload failed structural validation. Holds a readable description of the first
/// violated constraint.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn invalid(code: &'static str, message: &'static str) -> validator::ValidationError {
    let mut error = validator::ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Parses the accepted `due_date` forms: RFC 3339, a date-time without offset (taken as UTC),
/// or a bare date (midnight UTC)
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::from_str(raw) {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

pub fn due_date_format(raw: &str) -> Result<(), validator::ValidationError> {
    match parse_due_date(raw) {
        Some(_) => Ok(()),
        None => Err(invalid(
            "iso_date",
            "\"due_date\" must be in ISO 8601 date format",
        )),
    }
}

pub fn priority_value(raw: &str) -> Result<(), validator::ValidationError> {
    Priority::from_str(raw)
        .map(|_| ())
        .map_err(|_| invalid("one_of", "\"priority\" must be one of [low, medium, high]"))
}

pub fn status_value(raw: &str) -> Result<(), validator::ValidationError> {
    Status::from_str(raw).map(|_| ()).map_err(|_| {
        invalid(
            "one_of",
            "\"status\" must be one of [pending, in_progress, completed]",
        )
    })
}

/// Accepts `#RRGGBB` in either case, or the empty string
pub fn color_code(raw: &str) -> Result<(), validator::ValidationError> {
    if raw.is_empty() {
        return Ok(());
    }

    let well_formed = raw.len() == 7
        && raw.starts_with('#')
        && raw[1..].chars().all(|c| c.is_ascii_hexdigit());
    if well_formed {
        Ok(())
    } else {
        Err(invalid(
            "color",
            "\"color\" must be a 6-digit hex color such as #1A2B3C",
        ))
    }
}

/// Reduces a validation report to the message of the first failing field, in declaration order
fn first_violation(errors: &ValidationErrors, field_order: &[&'static str]) -> ValidationError {
    let field_errors = errors.field_errors();
    let first = field_order
        .iter()
        .find_map(|field| field_errors.get(field).map(|errs| (*field, *errs)))
        .and_then(|(field, errs)| errs.first().map(|err| (field, err)));

    match first {
        Some((_, validator::ValidationError {
            message: Some(message),
            ..
        })) => ValidationError(message.to_string()),
        Some((field, _)) => ValidationError(format!("\"{field}\" is invalid")),
        None => ValidationError("Submitted data was invalid".to_owned()),
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .ok_or_else(|| ValidationError(format!("\"{field}\" is required")))
}

fn parsed<T: FromStr>(raw: &str, field: &str) -> Result<T, ValidationError> {
    T::from_str(raw).map_err(|_| ValidationError(format!("\"{field}\" is invalid")))
}

const TASK_FIELDS: [&str; 4] = ["title", "due_date", "priority", "status"];

pub fn validate_task(payload: &dto::TaskFields) -> Result<TaskContent, ValidationError> {
    payload
        .validate()
        .map_err(|errors| first_violation(&errors, &TASK_FIELDS))?;

    let raw_due_date = required(&payload.due_date, "due_date")?;
    Ok(TaskContent {
        title: required(&payload.title, "title")?.to_owned(),
        description: payload.description.clone(),
        due_date: parse_due_date(raw_due_date).ok_or_else(|| {
            ValidationError("\"due_date\" must be in ISO 8601 date format".to_owned())
        })?,
        priority: parsed(required(&payload.priority, "priority")?, "priority")?,
        status: parsed(required(&payload.status, "status")?, "status")?,
        category_id: payload.category_id,
    })
}

pub fn validate_status(payload: &dto::StatusUpdate) -> Result<Status, ValidationError> {
    payload
        .validate()
        .map_err(|errors| first_violation(&errors, &["status"]))?;

    parsed(required(&payload.status, "status")?, "status")
}

const CATEGORY_FIELDS: [&str; 2] = ["name", "color"];

pub fn validate_category(
    payload: &dto::CategoryFields,
) -> Result<CategoryContent, ValidationError> {
    payload
        .validate()
        .map_err(|errors| first_violation(&errors, &CATEGORY_FIELDS))?;

    Ok(CategoryContent {
        name: required(&payload.name, "name")?.to_owned(),
        description: payload.description.clone(),
        color: payload.color.clone().filter(|color| !color.is_empty()),
    })
}

const CREDENTIAL_FIELDS: [&str; 2] = ["email", "password"];

pub fn validate_credentials(
    payload: &dto::CredentialsBody,
) -> Result<Credentials, ValidationError> {
    payload
        .validate()
        .map_err(|errors| first_violation(&errors, &CREDENTIAL_FIELDS))?;

    Ok(Credentials {
        email: required(&payload.email, "email")?.to_owned(),
        password: required(&payload.password, "password")?.to_owned(),
    })
}
