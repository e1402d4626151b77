//! Loan management service
//!
//! Owns the lending view's working set: the loans, books and readers last
//! fetched from the backend. Mutations go to the lending service first and
//! touch the working set only once the backend has confirmed them.

use std::sync::Arc;
use validator::Validate;

use crate::{
    calendar::Clock,
    error::{AppError, AppResult},
    models::{Book, LendForm, LendRequest, Loan, LoanStatus, Reader},
    repository::{BooksApi, LendingsApi, ReadersApi},
};

/// A fetch of the working set that failed, tagged with its source
#[derive(Debug)]
pub struct LoadFailure {
    pub source: &'static str,
    pub error: AppError,
}

/// Outcome of the three parallel fetches behind the lending view
#[derive(Debug)]
pub struct WorkspaceLoad {
    pub loans: AppResult<Vec<Loan>>,
    pub books: AppResult<Vec<Book>>,
    pub readers: AppResult<Vec<Reader>>,
}

/// Read-only working copies for one lending view
#[derive(Debug, Clone, Default)]
pub struct LendingWorkspace {
    pub loans: Vec<Loan>,
    pub books: Vec<Book>,
    pub readers: Vec<Reader>,
    books_loaded: bool,
    readers_loaded: bool,
}

impl LendingWorkspace {
    /// Replace the lists whose fetch succeeded; keep the others as they were
    pub fn apply(&mut self, load: WorkspaceLoad) -> Vec<LoadFailure> {
        let mut failures = Vec::new();

        match load.loans {
            Ok(loans) => self.loans = loans,
            Err(error) => failures.push(LoadFailure { source: "loans", error }),
        }
        match load.books {
            Ok(books) => {
                self.books = books;
                self.books_loaded = true;
            }
            Err(error) => failures.push(LoadFailure { source: "books", error }),
        }
        match load.readers {
            Ok(readers) => {
                self.readers = readers;
                self.readers_loaded = true;
            }
            Err(error) => failures.push(LoadFailure { source: "readers", error }),
        }

        failures
    }

    pub fn loan(&self, loan_id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == loan_id)
    }

    /// Reference check against the loaded catalog; unknown when not loaded
    fn check_references(&self, request: &LendRequest) -> AppResult<()> {
        if self.readers_loaded && !self.readers.iter().any(|r| r.id == request.reader_id) {
            return Err(AppError::invalid("readerId", "Select a reader"));
        }
        if self.books_loaded && !self.books.iter().any(|b| b.id == request.book_id) {
            return Err(AppError::invalid("bookId", "Select a book"));
        }
        Ok(())
    }
}

/// Filters of the lending list; `None` means "All"
#[derive(Debug, Clone, Default)]
pub struct LoanFilter {
    pub search: Option<String>,
    pub reader_id: Option<String>,
    pub book_id: Option<String>,
    pub status: Option<LoanStatus>,
}

/// Loans matching `filter`, in their original order.
///
/// The search term is matched case-insensitively against the reader name,
/// the book title, the borrow and due dates as `YYYY-MM-DD` and the status.
pub fn filter_loans<'a>(loans: &'a [Loan], filter: &LoanFilter, clock: &dyn Clock) -> Vec<&'a Loan> {
    let now = clock.now();
    let term = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();

    loans
        .iter()
        .filter(|l| {
            let status = l.status_at(now);

            let matches_term = term.is_empty() || {
                let reader_name = l
                    .reader
                    .as_ref()
                    .and_then(|r| r.name.as_deref())
                    .unwrap_or_default()
                    .to_lowercase();
                let book_title = l
                    .book
                    .as_ref()
                    .and_then(|b| b.title.as_deref())
                    .unwrap_or_default()
                    .to_lowercase();
                let borrowed = clock.local_date(l.borrowed_at).format("%Y-%m-%d").to_string();
                let due = clock.local_date(l.due_date).format("%Y-%m-%d").to_string();

                reader_name.contains(&term)
                    || book_title.contains(&term)
                    || borrowed.contains(&term)
                    || due.contains(&term)
                    || status.as_str().to_lowercase().contains(&term)
            };

            let matches_reader = filter
                .reader_id
                .as_deref()
                .map_or(true, |id| l.reader.as_ref().map(|r| r.id.as_str()) == Some(id));
            let matches_book = filter
                .book_id
                .as_deref()
                .map_or(true, |id| l.book_id() == Some(id));
            let matches_status = filter.status.map_or(true, |s| s == status);

            matches_term && matches_reader && matches_book && matches_status
        })
        .collect()
}

#[derive(Clone)]
pub struct LoansService {
    lendings: Arc<dyn LendingsApi>,
    books: Arc<dyn BooksApi>,
    readers: Arc<dyn ReadersApi>,
    clock: Arc<dyn Clock>,
    default_loan_days: u32,
}

impl LoansService {
    pub fn new(
        lendings: Arc<dyn LendingsApi>,
        books: Arc<dyn BooksApi>,
        readers: Arc<dyn ReadersApi>,
        clock: Arc<dyn Clock>,
        default_loan_days: u32,
    ) -> Self {
        Self {
            lendings,
            books,
            readers,
            clock,
            default_loan_days,
        }
    }

    /// Fresh lend form starting today
    pub fn new_form(&self) -> AppResult<LendForm> {
        LendForm::new(self.clock.today(), self.default_loan_days)
    }

    /// Fetch loans, books and readers concurrently; each outcome stands alone
    pub async fn load_workspace(&self) -> WorkspaceLoad {
        let (loans, books, readers) = tokio::join!(
            self.lendings.list(),
            self.books.list(),
            self.readers.list()
        );

        for (source, failed) in [
            ("loans", loans.as_ref().err()),
            ("books", books.as_ref().err()),
            ("readers", readers.as_ref().err()),
        ] {
            if let Some(error) = failed {
                tracing::error!("Failed to load {}: {}", source, error);
            }
        }

        WorkspaceLoad { loans, books, readers }
    }

    /// Reload the whole working set
    pub async fn refresh(&self, workspace: &mut LendingWorkspace) -> Vec<LoadFailure> {
        let load = self.load_workspace().await;
        workspace.apply(load)
    }

    /// Create a loan.
    ///
    /// Validation failures never reach the lending service. The new loan is
    /// appended only after the service has accepted it.
    pub async fn lend(&self, workspace: &mut LendingWorkspace, request: LendRequest) -> AppResult<Loan> {
        request.validate()?;
        workspace.check_references(&request)?;

        let loan = self.lendings.lend(&request).await.map_err(|e| {
            tracing::error!(
                "Lending book {} to reader {} failed: {}",
                request.book_id,
                request.reader_id,
                e
            );
            e
        })?;

        tracing::info!(
            "Loan {} created: book {} to reader {} for {} days",
            loan.id,
            request.book_id,
            request.reader_id,
            request.loan_days
        );
        workspace.loans.push(loan.clone());
        Ok(loan)
    }

    pub async fn lend_form(&self, workspace: &mut LendingWorkspace, form: &LendForm) -> AppResult<Loan> {
        self.lend(workspace, form.request()).await
    }

    /// Return a loan; the request is sent once and never retried.
    ///
    /// On success the working copy is replaced by the service's. On failure
    /// (for instance another session returned it first) the loan list is
    /// re-fetched so the view reflects the store, and the error is returned.
    pub async fn return_loan(&self, workspace: &mut LendingWorkspace, loan_id: &str) -> AppResult<Loan> {
        let now = self.clock.now();
        let loan = workspace
            .loan(loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan {} is not in the current list", loan_id)))?;
        if loan.is_returned_at(now) {
            return Err(AppError::BusinessRule("Loan already returned".to_string()));
        }

        match self.lendings.return_book(loan_id).await {
            Ok(returned) => {
                tracing::info!("Loan {} returned", loan_id);
                if let Some(slot) = workspace.loans.iter_mut().find(|l| l.id == loan_id) {
                    *slot = returned.clone();
                }
                Ok(returned)
            }
            Err(error) => {
                tracing::error!("Returning loan {} failed: {}", loan_id, error);
                match self.lendings.list().await {
                    Ok(loans) => workspace.loans = loans,
                    Err(refresh_error) => {
                        tracing::warn!("Could not refresh loans after failed return: {}", refresh_error)
                    }
                }
                Err(error)
            }
        }
    }

    pub fn filtered<'a>(&self, workspace: &'a LendingWorkspace, filter: &LoanFilter) -> Vec<&'a Loan> {
        filter_loans(&workspace.loans, filter, self.clock.as_ref())
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calendar::FixedClock,
        models::{BookRef, ReaderRef},
        repository::{books::MockBooksApi, lendings::MockLendingsApi, readers::MockReadersApi},
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn loan(id: &str, reader: &str, title: &str, due: DateTime<Utc>) -> Loan {
        Loan {
            id: id.into(),
            reader: Some(ReaderRef {
                id: format!("r-{}", reader.to_lowercase()),
                name: Some(reader.into()),
                email: None,
            }),
            book: Some(BookRef {
                id: format!("b-{}", title.to_lowercase()),
                title: Some(title.into()),
            }),
            borrowed_at: at(2024, 6, 1),
            due_date: due,
            returned_at: None,
            status: None,
        }
    }

    fn reader(id: &str) -> Reader {
        Reader {
            id: id.into(),
            name: id.into(),
            email: None,
            phone: None,
            address: None,
        }
    }

    fn book(id: &str) -> Book {
        Book {
            id: id.into(),
            title: id.into(),
            author: String::new(),
            isbn: String::new(),
            category: None,
            total_copies: 1,
            available_copies: 1,
        }
    }

    fn service(lendings: MockLendingsApi, books: MockBooksApi, readers: MockReadersApi) -> LoansService {
        LoansService::new(
            Arc::new(lendings),
            Arc::new(books),
            Arc::new(readers),
            Arc::new(FixedClock::at(at(2024, 6, 20))),
            14,
        )
    }

    fn loaded_workspace() -> LendingWorkspace {
        let mut ws = LendingWorkspace::default();
        ws.apply(WorkspaceLoad {
            loans: Ok(vec![loan("l1", "Ada", "Dune", at(2024, 6, 15))]),
            books: Ok(vec![book("b1")]),
            readers: Ok(vec![reader("r1")]),
        });
        ws
    }

    #[tokio::test]
    async fn lend_appends_confirmed_loan() {
        let mut lendings = MockLendingsApi::new();
        lendings
            .expect_lend()
            .withf(|r| r.book_id == "b1" && r.reader_id == "r1" && r.loan_days == 14)
            .times(1)
            .returning(|_| Ok(loan("l2", "Ada", "Emma", at(2024, 7, 4))));
        let svc = service(lendings, MockBooksApi::new(), MockReadersApi::new());

        let mut ws = loaded_workspace();
        let request = LendRequest {
            book_id: "b1".into(),
            reader_id: "r1".into(),
            loan_days: 14,
        };
        let created = svc.lend(&mut ws, request).await.unwrap();

        assert_eq!(created.id, "l2");
        assert_eq!(ws.loans.len(), 2);
        assert_eq!(ws.loans[1].id, "l2");
    }

    #[tokio::test]
    async fn invalid_lend_never_reaches_the_service() {
        let mut lendings = MockLendingsApi::new();
        lendings.expect_lend().never();
        let svc = service(lendings, MockBooksApi::new(), MockReadersApi::new());
        let mut ws = loaded_workspace();

        let cases = [
            ("", "b1", 14),
            ("r1", "b1", 0),
            ("r1", "b1", 366),
            ("r9", "b1", 14),
            ("r1", "b9", 14),
        ];
        for (reader_id, book_id, loan_days) in cases {
            let request = LendRequest {
                book_id: book_id.into(),
                reader_id: reader_id.into(),
                loan_days,
            };
            let err = svc.lend(&mut ws, request).await.unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        }
        assert_eq!(ws.loans.len(), 1);
    }

    #[tokio::test]
    async fn rejected_lend_leaves_workspace_untouched() {
        let mut lendings = MockLendingsApi::new();
        lendings.expect_lend().times(1).returning(|_| {
            Err(AppError::Rejected {
                service: "lendings",
                status: 400,
                message: "No available copies".into(),
            })
        });
        let svc = service(lendings, MockBooksApi::new(), MockReadersApi::new());
        let mut ws = loaded_workspace();
        let before = ws.loans.clone();

        let request = LendRequest {
            book_id: "b1".into(),
            reader_id: "r1".into(),
            loan_days: 7,
        };
        assert!(svc.lend(&mut ws, request).await.is_err());
        assert_eq!(ws.loans, before);
    }

    #[tokio::test]
    async fn return_patches_loan_with_service_copy() {
        let mut lendings = MockLendingsApi::new();
        lendings.expect_return_book().times(1).returning(|id| {
            let mut returned = loan(id, "Ada", "Dune", at(2024, 6, 15));
            returned.returned_at = Some(at(2024, 6, 20));
            Ok(returned)
        });
        lendings.expect_list().never();
        let svc = service(lendings, MockBooksApi::new(), MockReadersApi::new());
        let mut ws = loaded_workspace();

        svc.return_loan(&mut ws, "l1").await.unwrap();

        let now = at(2024, 6, 20);
        assert!(ws.loans[0].is_returned_at(now));
        assert!(!ws.loans[0].is_overdue_at(now));
    }

    #[tokio::test]
    async fn already_returned_loan_is_refused_locally() {
        let mut lendings = MockLendingsApi::new();
        lendings.expect_return_book().never();
        let svc = service(lendings, MockBooksApi::new(), MockReadersApi::new());
        let mut ws = loaded_workspace();
        ws.loans[0].returned_at = Some(at(2024, 6, 16));

        let err = svc.return_loan(&mut ws, "l1").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn failed_return_refetches_without_retry() {
        let mut lendings = MockLendingsApi::new();
        lendings
            .expect_return_book()
            .times(1)
            .returning(|_| Err(AppError::Conflict("Loan already returned".into())));
        lendings.expect_list().times(1).returning(|| {
            let mut stored = loan("l1", "Ada", "Dune", at(2024, 6, 15));
            stored.returned_at = Some(at(2024, 6, 19));
            stored.status = Some(LoanStatus::Returned);
            Ok(vec![stored])
        });
        let svc = service(lendings, MockBooksApi::new(), MockReadersApi::new());
        let mut ws = loaded_workspace();

        let err = svc.return_loan(&mut ws, "l1").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(ws.loans[0].status, Some(LoanStatus::Returned));
    }

    #[tokio::test]
    async fn partial_load_failure_is_reported_per_source() {
        let mut lendings = MockLendingsApi::new();
        lendings
            .expect_list()
            .returning(|| Ok(vec![loan("l9", "Bob", "Emma", at(2024, 6, 30))]));
        let mut books = MockBooksApi::new();
        books
            .expect_list()
            .returning(|| Err(AppError::DataShape("books /books: expected array".into())));
        let mut readers = MockReadersApi::new();
        readers.expect_list().returning(|| Ok(vec![reader("r2")]));
        let svc = service(lendings, books, readers);

        let mut ws = loaded_workspace();
        let failures = svc.refresh(&mut ws).await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].source, "books");
        assert_eq!(ws.loans[0].id, "l9");
        assert_eq!(ws.books[0].id, "b1");
        assert_eq!(ws.readers[0].id, "r2");
    }

    #[test]
    fn filter_by_term_status_and_reader() {
        let clock = FixedClock::at(at(2024, 6, 20));
        let mut returned = loan("l3", "Cleo", "Ulysses", at(2024, 6, 10));
        returned.returned_at = Some(at(2024, 6, 9));
        let loans = vec![
            loan("l1", "Ada", "Dune", at(2024, 6, 15)),
            loan("l2", "Bob", "Emma", at(2024, 6, 30)),
            returned,
        ];

        let by_term = LoanFilter {
            search: Some("  DUNE ".into()),
            ..LoanFilter::default()
        };
        let ids: Vec<_> = filter_loans(&loans, &by_term, &clock).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["l1"]);

        let by_status_text = LoanFilter {
            search: Some("overdue".into()),
            ..LoanFilter::default()
        };
        let ids: Vec<_> = filter_loans(&loans, &by_status_text, &clock).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["l1"]);

        let by_date = LoanFilter {
            search: Some("2024-06-30".into()),
            ..LoanFilter::default()
        };
        let ids: Vec<_> = filter_loans(&loans, &by_date, &clock).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["l2"]);

        let returned_only = LoanFilter {
            status: Some(LoanStatus::Returned),
            ..LoanFilter::default()
        };
        let ids: Vec<_> = filter_loans(&loans, &returned_only, &clock).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["l3"]);

        let by_reader = LoanFilter {
            reader_id: Some("r-bob".into()),
            ..LoanFilter::default()
        };
        let ids: Vec<_> = filter_loans(&loans, &by_reader, &clock).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["l2"]);

        assert_eq!(filter_loans(&loans, &LoanFilter::default(), &clock).len(), 3);
    }

    #[test]
    fn new_form_starts_today_with_default_length() {
        let svc = service(MockLendingsApi::new(), MockBooksApi::new(), MockReadersApi::new());
        let form = svc.new_form().unwrap();
        assert_eq!(form.borrow_date(), chrono::NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
        assert_eq!(form.due_date(), chrono::NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
    }
}
