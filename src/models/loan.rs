//! Loan (lending) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::not_blank;
use crate::{
    calendar::{compute_due_date, Clock},
    error::{AppError, AppResult},
};

pub const UNKNOWN_READER_ID: &str = "unknown";
pub const UNKNOWN_READER_NAME: &str = "Unknown Reader";
pub const UNKNOWN_BOOK_TITLE: &str = "Unknown Book";

/// Lifecycle status of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Borrowed,
    Overdue,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Overdue => "OVERDUE",
            LoanStatus::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BORROWED" => Ok(LoanStatus::Borrowed),
            "OVERDUE" => Ok(LoanStatus::Overdue),
            "RETURNED" => Ok(LoanStatus::Returned),
            other => Err(AppError::invalid(
                "status",
                format!("Unknown loan status '{}'", other),
            )),
        }
    }
}

/// Reader snapshot embedded in a loan at fetch time.
///
/// The lending service sends either the populated reader or its bare id;
/// a bare id leaves the name and address unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReaderRefWire")]
pub struct ReaderRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Book snapshot embedded in a loan at fetch time; may also arrive as a bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BookRefWire")]
pub struct BookRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReaderRefWire {
    Id(String),
    Embedded {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl From<ReaderRefWire> for ReaderRef {
    fn from(wire: ReaderRefWire) -> Self {
        match wire {
            ReaderRefWire::Id(id) => ReaderRef {
                id,
                name: None,
                email: None,
            },
            ReaderRefWire::Embedded { id, name, email } => ReaderRef { id, name, email },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BookRefWire {
    Id(String),
    Embedded {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl From<BookRefWire> for BookRef {
    fn from(wire: BookRefWire) -> Self {
        match wire {
            BookRefWire::Id(id) => BookRef { id, title: None },
            BookRefWire::Embedded { id, title } => BookRef { id, title },
        }
    }
}

/// Loan as returned by the lending service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub reader: Option<ReaderRef>,
    #[serde(default)]
    pub book: Option<BookRef>,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub returned_at: Option<DateTime<Utc>>,
    /// Status supplied by the lending service; `None` means derive locally
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: Option<LoanStatus>,
}

/// Empty or unrecognised statuses are treated as absent
fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<LoanStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => match value.parse() {
            Ok(status) => Some(status),
            Err(_) => {
                tracing::warn!("Ignoring unknown loan status '{}'", value);
                None
            }
        },
    })
}

impl Loan {
    /// Current status: the service's status when it sent one, else derived
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        match self.status {
            Some(status) => status,
            None if self.returned_at.is_some() => LoanStatus::Returned,
            None if now > self.due_date => LoanStatus::Overdue,
            None => LoanStatus::Borrowed,
        }
    }

    pub fn status(&self, clock: &dyn Clock) -> LoanStatus {
        self.status_at(clock.now())
    }

    pub fn is_returned_at(&self, now: DateTime<Utc>) -> bool {
        self.returned_at.is_some() || self.status_at(now) == LoanStatus::Returned
    }

    /// Past due and not returned.
    ///
    /// Unlike [`Loan::status_at`], a service-supplied `OVERDUE` or `BORROWED`
    /// status is not consulted here: only the return stamp, a `RETURNED`
    /// status and the due date matter. A loan the service calls `OVERDUE`
    /// whose due date is still ahead is therefore not overdue by this test.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_returned_at(now) && self.due_date < now
    }

    pub fn is_returned(&self, clock: &dyn Clock) -> bool {
        self.is_returned_at(clock.now())
    }

    pub fn is_overdue(&self, clock: &dyn Clock) -> bool {
        self.is_overdue_at(clock.now())
    }

    pub fn reader_id(&self) -> &str {
        self.reader
            .as_ref()
            .map(|r| r.id.as_str())
            .unwrap_or(UNKNOWN_READER_ID)
    }

    pub fn reader_name(&self) -> &str {
        self.reader
            .as_ref()
            .and_then(|r| r.name.as_deref())
            .unwrap_or(UNKNOWN_READER_NAME)
    }

    pub fn reader_email(&self) -> Option<&str> {
        self.reader.as_ref().and_then(|r| r.email.as_deref())
    }

    pub fn book_id(&self) -> Option<&str> {
        self.book.as_ref().map(|b| b.id.as_str())
    }

    pub fn book_title(&self) -> &str {
        self.book
            .as_ref()
            .and_then(|b| b.title.as_deref())
            .unwrap_or(UNKNOWN_BOOK_TITLE)
    }
}

/// Lend request sent to the lending service
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LendRequest {
    #[validate(custom(function = "not_blank", message = "Select a book"))]
    pub book_id: String,
    #[validate(custom(function = "not_blank", message = "Select a reader"))]
    pub reader_id: String,
    #[validate(range(min = 1, max = 365, message = "Loan days must be between 1 and 365"))]
    pub loan_days: u32,
}

/// Lend form state with a provisional due date.
///
/// Changing the borrow date or the loan length re-derives the due date;
/// the due date may also be edited on its own before submission.
#[derive(Debug, Clone, PartialEq)]
pub struct LendForm {
    pub reader_id: String,
    pub book_id: String,
    borrow_date: NaiveDate,
    loan_days: u32,
    due_date: NaiveDate,
}

impl LendForm {
    pub fn new(today: NaiveDate, loan_days: u32) -> AppResult<Self> {
        Ok(Self {
            reader_id: String::new(),
            book_id: String::new(),
            borrow_date: today,
            loan_days,
            due_date: compute_due_date(today, loan_days)?,
        })
    }

    pub fn borrow_date(&self) -> NaiveDate {
        self.borrow_date
    }

    pub fn loan_days(&self) -> u32 {
        self.loan_days
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Out-of-range values leave the form unchanged
    pub fn set_loan_days(&mut self, loan_days: u32) -> AppResult<()> {
        self.due_date = compute_due_date(self.borrow_date, loan_days)?;
        self.loan_days = loan_days;
        Ok(())
    }

    pub fn set_borrow_date(&mut self, borrow_date: NaiveDate) -> AppResult<()> {
        self.due_date = compute_due_date(borrow_date, self.loan_days)?;
        self.borrow_date = borrow_date;
        Ok(())
    }

    /// Manual override of the provisional date; only shown to the operator,
    /// the service derives the stored due date from `loan_days`
    pub fn set_due_date(&mut self, due_date: NaiveDate) -> AppResult<()> {
        if due_date < self.borrow_date {
            return Err(AppError::invalid(
                "dueDate",
                "Due date cannot be before the borrow date",
            ));
        }
        self.due_date = due_date;
        Ok(())
    }

    pub fn request(&self) -> LendRequest {
        LendRequest {
            book_id: self.book_id.trim().to_string(),
            reader_id: self.reader_id.trim().to_string(),
            loan_days: self.loan_days,
        }
    }
}
