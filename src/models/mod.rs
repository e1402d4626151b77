//! Data models for the Book Club console

pub mod audit;
pub mod auth;
pub mod book;
pub mod category;
pub mod loan;
pub mod notice;
pub mod reader;
pub mod stats;

// Re-export commonly used types
pub use audit::{Activity, ActivityType, AuditLog};
pub use auth::{Session, UserProfile};
pub use book::{Book, BookForm};
pub use category::{Category, CategoryForm};
pub use loan::{BookRef, LendForm, LendRequest, Loan, LoanStatus, ReaderRef};
pub use notice::{OverdueBook, OverdueNotice};
pub use reader::{Reader, ReaderForm};
pub use stats::MonthlyCount;

use std::borrow::Cow;
use validator::ValidationError;

/// Rejects values that are empty once surrounding whitespace is removed
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("This field is required"));
        return Err(error);
    }
    Ok(())
}

/// Trimmed copy of an optional text field, `None` when blank
pub(crate) fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
