//! Calendar-day arithmetic for loans
//!
//! Due dates and day counts work on whole calendar days in the operator's
//! local time zone. "Now" always comes from a [`Clock`] so that status
//! derivation reads the current time at use and tests can pin it.

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, Offset, Utc};

use crate::error::{AppError, AppResult};

pub const MIN_LOAN_DAYS: u32 = 1;
pub const MAX_LOAN_DAYS: u32 = 365;

/// Source of the current instant and of the local calendar
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date of `instant` in the clock's time zone
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// Wall clock in the host's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// Clock frozen at one instant, in a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

/// Due date for a loan starting on `borrow_date` and lasting `loan_days`
pub fn compute_due_date(borrow_date: NaiveDate, loan_days: u32) -> AppResult<NaiveDate> {
    if !(MIN_LOAN_DAYS..=MAX_LOAN_DAYS).contains(&loan_days) {
        return Err(AppError::invalid(
            "loanDays",
            format!(
                "Loan days must be between {} and {}",
                MIN_LOAN_DAYS, MAX_LOAN_DAYS
            ),
        ));
    }

    borrow_date
        .checked_add_days(Days::new(u64::from(loan_days)))
        .ok_or_else(|| AppError::invalid("borrowDate", "Borrow date is out of range"))
}

/// Whole days elapsed from `reference` to `today`, never negative
fn elapsed_days(reference: NaiveDate, today: NaiveDate) -> i64 {
    (today - reference).num_days().max(0)
}

/// Days a loan is past due; 0 while the due date is today or later
pub fn days_overdue(due_date: NaiveDate, today: NaiveDate) -> i64 {
    elapsed_days(due_date, today)
}

pub fn days_since_borrowed(borrowed_at: NaiveDate, today: NaiveDate) -> i64 {
    elapsed_days(borrowed_at, today)
}
