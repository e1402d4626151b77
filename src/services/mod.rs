//! Console services on top of the collaborators

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod email;
pub mod loans;
pub mod overdue;
pub mod readers;

use std::sync::Arc;

use crate::{
    calendar::Clock,
    config::{AppConfig, EmailTransport},
    repository::{OverdueMailer, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub readers: readers::ReadersService,
    pub loans: loans::LoansService,
    pub overdue: overdue::OverdueService,
    pub dashboard: dashboard::DashboardService,
    pub audit: audit::AuditService,
}

impl Services {
    /// Create all services over the HTTP collaborators
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let books = Arc::new(repository.books);
        let readers = Arc::new(repository.readers);
        let lendings = Arc::new(repository.lendings);
        let audit = Arc::new(repository.audit);

        let mailer: Arc<dyn OverdueMailer> = match config.email.transport {
            EmailTransport::Backend => Arc::new(repository.email),
            EmailTransport::Smtp => Arc::new(email::SmtpMailer::new(config.email.clone())),
        };

        Self {
            auth: auth::AuthService::new(Arc::new(repository.auth)),
            catalog: catalog::CatalogService::new(books.clone(), Arc::new(repository.categories)),
            readers: readers::ReadersService::new(readers.clone()),
            loans: loans::LoansService::new(
                lendings.clone(),
                books.clone(),
                readers.clone(),
                clock.clone(),
                config.lending.default_loan_days,
            ),
            overdue: overdue::OverdueService::new(lendings.clone(), mailer, clock),
            dashboard: dashboard::DashboardService::new(books, readers, lendings, audit.clone()),
            audit: audit::AuditService::new(audit.clone(), audit),
        }
    }
}
