//! Reader collaborator

use async_trait::async_trait;
use reqwest::Method;

use super::client::{segment, BackendClient};
use crate::{
    error::AppResult,
    models::{Reader, ReaderForm},
};

const SERVICE: &str = "readers";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadersApi: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Reader>>;
    async fn create(&self, form: &ReaderForm) -> AppResult<Reader>;
    async fn update(&self, id: &str, form: &ReaderForm) -> AppResult<Reader>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn count(&self) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct ReadersRepository {
    client: BackendClient,
}

impl ReadersRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReadersApi for ReadersRepository {
    async fn list(&self) -> AppResult<Vec<Reader>> {
        self.client.get(SERVICE, "/readers").await
    }

    async fn create(&self, form: &ReaderForm) -> AppResult<Reader> {
        self.client.send_json(SERVICE, Method::POST, "/readers", form).await
    }

    async fn update(&self, id: &str, form: &ReaderForm) -> AppResult<Reader> {
        self.client
            .send_json(SERVICE, Method::PUT, &format!("/readers/{}", segment(id)?), form)
            .await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.client
            .send_unit::<()>(SERVICE, Method::DELETE, &format!("/readers/{}", segment(id)?), None)
            .await
    }

    async fn count(&self) -> AppResult<u64> {
        self.client.get_count(SERVICE, "/readers/count").await
    }
}
