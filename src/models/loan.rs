//! Loan (borrow) model and related types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Loan record. Outstanding while `returned_at` is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_outstanding(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Borrow request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BorrowBook {
    #[serde(default)]
    #[validate(range(min = 1, message = "book_id and member_id are required"))]
    pub book_id: i32,
    #[serde(default)]
    #[validate(range(min = 1, message = "book_id and member_id are required"))]
    pub member_id: i32,
    /// Due date, ISO 8601. Empty or missing means no due date.
    pub due_at: Option<String>,
}

impl BorrowBook {
    pub fn new(book_id: i32, member_id: i32) -> Self {
        Self {
            book_id,
            member_id,
            due_at: None,
        }
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a caller-supplied due date.
///
/// Accepts RFC 3339, a naive date-time (taken as UTC) or a bare date
/// (midnight UTC). A blank value means no due date.
pub fn parse_due_at(raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }

    Err(AppError::Validation("due_at must be ISO format".to_string()))
}
