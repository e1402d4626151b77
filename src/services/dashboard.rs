//! Dashboard summary

use std::sync::Arc;

use crate::{
    error::AppError,
    models::{Activity, MonthlyCount},
    repository::{ActivityApi, BooksApi, LendingsApi, ReadersApi},
};

/// Dashboard sections fetched independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Books,
    Readers,
    Lendings,
    Overdue,
    Monthly,
    Activity,
}

#[derive(Debug)]
pub struct SectionFailure {
    pub section: Section,
    pub error: AppError,
}

/// Figures shown on the dashboard; a failed section keeps its default
#[derive(Debug, Default)]
pub struct DashboardSummary {
    pub total_books: u64,
    pub total_readers: u64,
    pub total_lendings: u64,
    pub total_overdue: u64,
    pub monthly_lendings: Vec<MonthlyCount>,
    pub recent_activity: Vec<Activity>,
    pub failures: Vec<SectionFailure>,
}

impl DashboardSummary {
    fn take<T: Default>(&mut self, section: Section, result: Result<T, AppError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("Dashboard section {:?} unavailable: {}", section, error);
                self.failures.push(SectionFailure { section, error });
                T::default()
            }
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    books: Arc<dyn BooksApi>,
    readers: Arc<dyn ReadersApi>,
    lendings: Arc<dyn LendingsApi>,
    activity: Arc<dyn ActivityApi>,
}

impl DashboardService {
    pub fn new(
        books: Arc<dyn BooksApi>,
        readers: Arc<dyn ReadersApi>,
        lendings: Arc<dyn LendingsApi>,
        activity: Arc<dyn ActivityApi>,
    ) -> Self {
        Self {
            books,
            readers,
            lendings,
            activity,
        }
    }

    /// Load every section concurrently; one failing section never blocks the rest
    pub async fn load(&self) -> DashboardSummary {
        let (books, readers, lendings, overdue, monthly, activity) = tokio::join!(
            self.books.count(),
            self.readers.count(),
            self.lendings.count_total(),
            self.lendings.count_overdue(),
            self.lendings.monthly_summary(),
            self.activity.recent(),
        );

        let mut summary = DashboardSummary::default();
        summary.total_books = summary.take(Section::Books, books);
        summary.total_readers = summary.take(Section::Readers, readers);
        summary.total_lendings = summary.take(Section::Lendings, lendings);
        summary.total_overdue = summary.take(Section::Overdue, overdue);
        summary.monthly_lendings = summary.take(Section::Monthly, monthly);
        summary.recent_activity = summary.take(Section::Activity, activity);
        summary
    }
}
