//! Overdue tracking and reader notification

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::{
    calendar::{days_overdue, days_since_borrowed, Clock},
    error::{AppError, AppResult},
    models::{Loan, OverdueBook, OverdueNotice},
    repository::{LendingsApi, OverdueMailer},
};

/// A reader's currently overdue loans, driving one notification
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueGroup {
    pub reader_id: String,
    pub reader_name: String,
    pub reader_email: Option<String>,
    pub items: Vec<Loan>,
}

/// Display row of the overdue board
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueRow {
    pub loan_id: String,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
    pub days_since_borrowed: i64,
}

/// Group the loans overdue at `now` by reader.
///
/// Loans keep their source order inside a group; groups are ordered by
/// reader name, ignoring case. Loans without a reader share one
/// "Unknown Reader" group.
pub fn group_overdue_by_reader(loans: &[Loan], now: DateTime<Utc>) -> Vec<OverdueGroup> {
    let mut groups: IndexMap<String, OverdueGroup> = IndexMap::new();

    for loan in loans.iter().filter(|l| l.is_overdue_at(now)) {
        groups
            .entry(loan.reader_id().to_string())
            .or_insert_with(|| OverdueGroup {
                reader_id: loan.reader_id().to_string(),
                reader_name: loan.reader_name().to_string(),
                reader_email: loan.reader_email().map(str::to_string),
                items: Vec::new(),
            })
            .items
            .push(loan.clone());
    }

    let mut groups: Vec<OverdueGroup> = groups.into_values().collect();
    groups.sort_by(|a, b| a.reader_name.to_lowercase().cmp(&b.reader_name.to_lowercase()));
    groups
}

/// Notice for one group; refuses groups without a usable e-mail address
pub fn notice_for(group: &OverdueGroup) -> AppResult<OverdueNotice> {
    let email = group
        .reader_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::MissingContact(group.reader_name.clone()))?;

    Ok(OverdueNotice {
        email: email.to_string(),
        reader_name: group.reader_name.clone(),
        books: group
            .items
            .iter()
            .map(|l| OverdueBook {
                title: l.book_title().to_string(),
                due_date: l.due_date,
            })
            .collect(),
    })
}

#[derive(Clone)]
pub struct OverdueService {
    lendings: Arc<dyn LendingsApi>,
    mailer: Arc<dyn OverdueMailer>,
    clock: Arc<dyn Clock>,
}

impl OverdueService {
    pub fn new(lendings: Arc<dyn LendingsApi>, mailer: Arc<dyn OverdueMailer>, clock: Arc<dyn Clock>) -> Self {
        Self { lendings, mailer, clock }
    }

    /// Fetch the overdue list and group what is still overdue now
    pub async fn load_groups(&self) -> AppResult<Vec<OverdueGroup>> {
        let loans = self.lendings.list_overdue().await.map_err(|e| {
            tracing::error!("Failed to load overdue lendings: {}", e);
            e
        })?;
        Ok(group_overdue_by_reader(&loans, self.clock.now()))
    }

    pub fn rows(&self, group: &OverdueGroup) -> Vec<OverdueRow> {
        let today = self.clock.today();
        group
            .items
            .iter()
            .map(|l| OverdueRow {
                loan_id: l.id.clone(),
                title: l.book_title().to_string(),
                due_date: l.due_date,
                days_overdue: days_overdue(self.clock.local_date(l.due_date), today),
                days_since_borrowed: days_since_borrowed(self.clock.local_date(l.borrowed_at), today),
            })
            .collect()
    }

    /// Return one overdue loan; not retried on failure
    pub async fn return_loan(&self, loan: &Loan) -> AppResult<Loan> {
        if loan.is_returned_at(self.clock.now()) {
            return Err(AppError::BusinessRule("Loan already returned".to_string()));
        }

        let returned = self.lendings.return_book(&loan.id).await.map_err(|e| {
            tracing::error!("Returning overdue loan {} failed: {}", loan.id, e);
            e
        })?;
        tracing::info!("Overdue loan {} returned", loan.id);
        Ok(returned)
    }

    /// Send one message listing every overdue book of the group's reader
    pub async fn notify(&self, group: &OverdueGroup) -> AppResult<()> {
        let notice = notice_for(group)?;

        self.mailer.send_overdue_notice(&notice).await.map_err(|e| {
            tracing::error!("Overdue notice to {} failed: {}", group.reader_name, e);
            e
        })?;

        tracing::info!(
            "Overdue notice sent to {} for {} book(s)",
            group.reader_name,
            notice.books.len()
        );
        Ok(())
    }
}
