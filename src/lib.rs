//! Book Club Library console
//!
//! Client-side core of the library-lending administration console: the
//! lending lifecycle (due dates, status derivation, returns, overdue
//! grouping and notices), form validation, and typed access to the backend
//! services for books, categories, readers, lendings, audit and activity.

use std::sync::Arc;

pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared by the console commands
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
}

impl AppState {
    /// Wire the HTTP collaborators and services from configuration
    pub fn new(config: AppConfig, clock: Arc<dyn calendar::Clock>) -> AppResult<Self> {
        let repository = repository::Repository::new(&config.api)?;
        let services = services::Services::new(repository.clone(), &config, clock);
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
            repository,
        })
    }
}
