//! Reader management service

use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{Reader, ReaderForm},
    repository::ReadersApi,
};

#[derive(Clone)]
pub struct ReadersService {
    readers: Arc<dyn ReadersApi>,
}

impl ReadersService {
    pub fn new(readers: Arc<dyn ReadersApi>) -> Self {
        Self { readers }
    }

    pub async fn list(&self) -> AppResult<Vec<Reader>> {
        self.readers.list().await
    }

    pub async fn count(&self) -> AppResult<u64> {
        self.readers.count().await
    }

    pub async fn create(&self, form: &ReaderForm) -> AppResult<Reader> {
        let form = form.normalized();
        form.validate()?;
        let reader = self.readers.create(&form).await?;
        tracing::info!("Reader {} created: {}", reader.id, reader.name);
        Ok(reader)
    }

    pub async fn update(&self, id: &str, form: &ReaderForm) -> AppResult<Reader> {
        let form = form.normalized();
        form.validate()?;
        let reader = self.readers.update(id, &form).await?;
        tracing::info!("Reader {} updated", id);
        Ok(reader)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.readers.delete(id).await?;
        tracing::info!("Reader {} deleted", id);
        Ok(())
    }
}

/// Readers matching a search term and, optionally, an e-mail domain.
///
/// The term is matched case-insensitively against name and e-mail, and
/// literally against the phone number.
pub fn filter_readers<'a>(readers: &'a [Reader], term: &str, domain: Option<&str>) -> Vec<&'a Reader> {
    let lowered = term.to_lowercase();
    readers
        .iter()
        .filter(|r| {
            let email = r.email.as_deref().unwrap_or_default();
            let matches_search = r.name.to_lowercase().contains(&lowered)
                || email.to_lowercase().contains(&lowered)
                || r.phone.as_deref().unwrap_or_default().contains(term);
            let matches_domain = domain.map_or(true, |d| email.ends_with(&format!("@{}", d)));
            matches_search && matches_domain
        })
        .collect()
}
