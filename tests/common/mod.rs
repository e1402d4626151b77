//! In-memory stand-ins for the backend collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use bookclub_console::{
    error::{AppError, AppResult},
    models::{
        Book, BookForm, BookRef, LendRequest, Loan, MonthlyCount, OverdueNotice, Reader, ReaderForm,
        ReaderRef,
    },
    repository::{BooksApi, LendingsApi, OverdueMailer, ReadersApi},
};

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

pub fn reader(id: &str, name: &str, email: Option<&str>) -> Reader {
    Reader {
        id: id.into(),
        name: name.into(),
        email: email.map(str::to_string),
        phone: Some("555-0100".into()),
        address: None,
    }
}

pub fn book(id: &str, title: &str, copies: u32) -> Book {
    Book {
        id: id.into(),
        title: title.into(),
        author: "Anon".into(),
        isbn: format!("isbn-{}", id),
        category: None,
        total_copies: copies,
        available_copies: copies,
    }
}

/// Library backend kept in memory; the clock of the store is `now`
pub struct FakeLibrary {
    pub now: Mutex<DateTime<Utc>>,
    pub loans: Mutex<Vec<Loan>>,
    pub books: Mutex<Vec<Book>>,
    pub readers: Mutex<Vec<Reader>>,
    pub sent: Mutex<Vec<OverdueNotice>>,
    pub return_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeLibrary {
    pub fn new(now: DateTime<Utc>, books: Vec<Book>, readers: Vec<Reader>) -> Self {
        Self {
            now: Mutex::new(now),
            loans: Mutex::new(Vec::new()),
            books: Mutex::new(books),
            readers: Mutex::new(readers),
            sent: Mutex::new(Vec::new()),
            return_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// Stamp a return as if another session had done it
    pub fn return_elsewhere(&self, loan_id: &str) {
        let now = *self.now.lock().unwrap();
        if let Some(loan) = self.loans.lock().unwrap().iter_mut().find(|l| l.id == loan_id) {
            loan.returned_at = Some(now);
        }
    }
}

#[async_trait]
impl LendingsApi for FakeLibrary {
    async fn list(&self) -> AppResult<Vec<Loan>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.loans.lock().unwrap().clone())
    }

    async fn lend(&self, request: &LendRequest) -> AppResult<Loan> {
        let now = *self.now.lock().unwrap();
        let reader = self
            .readers
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == request.reader_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Reader not found".into()))?;

        let mut books = self.books.lock().unwrap();
        let book = books
            .iter_mut()
            .find(|b| b.id == request.book_id)
            .ok_or_else(|| AppError::NotFound("Book not found".into()))?;
        if book.available_copies == 0 {
            return Err(AppError::Rejected {
                service: "lendings",
                status: 400,
                message: "No available copies".into(),
            });
        }
        book.available_copies -= 1;

        let loan = Loan {
            id: format!("loan-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            reader: Some(ReaderRef {
                id: reader.id,
                name: Some(reader.name),
                email: reader.email,
            }),
            book: Some(BookRef {
                id: book.id.clone(),
                title: Some(book.title.clone()),
            }),
            borrowed_at: now,
            due_date: now + Duration::days(i64::from(request.loan_days)),
            returned_at: None,
            status: None,
        };
        self.loans.lock().unwrap().push(loan.clone());
        Ok(loan)
    }

    async fn return_book(&self, loan_id: &str) -> AppResult<Loan> {
        self.return_calls.fetch_add(1, Ordering::SeqCst);
        let now = *self.now.lock().unwrap();
        let mut loans = self.loans.lock().unwrap();
        let loan = loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(|| AppError::NotFound("Lending not found".into()))?;
        if loan.returned_at.is_some() {
            return Err(AppError::Conflict("Book already returned".into()));
        }
        loan.returned_at = Some(now);
        Ok(loan.clone())
    }

    async fn list_overdue(&self) -> AppResult<Vec<Loan>> {
        let now = *self.now.lock().unwrap();
        Ok(self
            .loans
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.returned_at.is_none() && l.due_date < now)
            .cloned()
            .collect())
    }

    async fn count_overdue(&self) -> AppResult<u64> {
        Ok(self.list_overdue().await?.len() as u64)
    }

    async fn count_total(&self) -> AppResult<u64> {
        Ok(self.loans.lock().unwrap().len() as u64)
    }

    async fn monthly_summary(&self) -> AppResult<Vec<MonthlyCount>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl BooksApi for FakeLibrary {
    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.books.lock().unwrap().clone())
    }

    async fn create(&self, _form: &BookForm) -> AppResult<Book> {
        Err(AppError::Internal("not supported".into()))
    }

    async fn update(&self, _id: &str, _form: &BookForm) -> AppResult<Book> {
        Err(AppError::Internal("not supported".into()))
    }

    async fn delete(&self, _id: &str) -> AppResult<()> {
        Err(AppError::Internal("not supported".into()))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.books.lock().unwrap().len() as u64)
    }
}

#[async_trait]
impl ReadersApi for FakeLibrary {
    async fn list(&self) -> AppResult<Vec<Reader>> {
        Ok(self.readers.lock().unwrap().clone())
    }

    async fn create(&self, _form: &ReaderForm) -> AppResult<Reader> {
        Err(AppError::Internal("not supported".into()))
    }

    async fn update(&self, _id: &str, _form: &ReaderForm) -> AppResult<Reader> {
        Err(AppError::Internal("not supported".into()))
    }

    async fn delete(&self, _id: &str) -> AppResult<()> {
        Err(AppError::Internal("not supported".into()))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.readers.lock().unwrap().len() as u64)
    }
}

#[async_trait]
impl OverdueMailer for FakeLibrary {
    async fn send_overdue_notice(&self, notice: &OverdueNotice) -> AppResult<()> {
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
