//! Collaborator layer: one trait per backend service plus its HTTP client

pub mod audit;
pub mod auth;
pub mod books;
pub mod client;
pub mod email;
pub mod lendings;
pub mod readers;

pub use audit::{ActivityApi, AuditApi};
pub use auth::AuthApi;
pub use books::{BooksApi, CategoriesApi};
pub use client::BackendClient;
pub use email::OverdueMailer;
pub use lendings::LendingsApi;
pub use readers::ReadersApi;

use crate::{config::ApiConfig, error::AppResult};

/// HTTP implementations of every collaborator, sharing one client
#[derive(Clone)]
pub struct Repository {
    pub client: BackendClient,
    pub auth: auth::AuthRepository,
    pub books: books::BooksRepository,
    pub categories: books::CategoriesRepository,
    pub readers: readers::ReadersRepository,
    pub lendings: lendings::LendingsRepository,
    pub audit: audit::AuditRepository,
    pub email: email::EmailRepository,
}

impl Repository {
    /// Create a repository talking to the configured backend
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = BackendClient::new(config)?;
        Ok(Self {
            auth: auth::AuthRepository::new(client.clone()),
            books: books::BooksRepository::new(client.clone()),
            categories: books::CategoriesRepository::new(client.clone()),
            readers: readers::ReadersRepository::new(client.clone()),
            lendings: lendings::LendingsRepository::new(client.clone()),
            audit: audit::AuditRepository::new(client.clone()),
            email: email::EmailRepository::new(client.clone()),
            client,
        })
    }
}
