//! Lending service collaborator

use async_trait::async_trait;
use reqwest::Method;

use super::client::{segment, BackendClient};
use crate::{
    error::AppResult,
    models::{loan::LendRequest, Loan, MonthlyCount},
};

const SERVICE: &str = "lendings";

/// Lending operations offered by the backend.
///
/// The backend is the only writer of loan state; every mutation returns the
/// loan as persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingsApi: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Loan>>;
    async fn lend(&self, request: &LendRequest) -> AppResult<Loan>;
    async fn return_book(&self, loan_id: &str) -> AppResult<Loan>;
    async fn list_overdue(&self) -> AppResult<Vec<Loan>>;
    async fn count_overdue(&self) -> AppResult<u64>;
    async fn count_total(&self) -> AppResult<u64>;
    async fn monthly_summary(&self) -> AppResult<Vec<MonthlyCount>>;
}

#[derive(Clone)]
pub struct LendingsRepository {
    client: BackendClient,
}

impl LendingsRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LendingsApi for LendingsRepository {
    async fn list(&self) -> AppResult<Vec<Loan>> {
        self.client.get(SERVICE, "/lendings").await
    }

    async fn lend(&self, request: &LendRequest) -> AppResult<Loan> {
        self.client
            .send_json(SERVICE, Method::POST, "/lendings", request)
            .await
    }

    async fn return_book(&self, loan_id: &str) -> AppResult<Loan> {
        self.client
            .send_json(
                SERVICE,
                Method::PUT,
                &format!("/lendings/{}/return", segment(loan_id)?),
                &serde_json::json!({}),
            )
            .await
    }

    async fn list_overdue(&self) -> AppResult<Vec<Loan>> {
        self.client.get(SERVICE, "/lendings/overdue").await
    }

    async fn count_overdue(&self) -> AppResult<u64> {
        self.client.get_count(SERVICE, "/lendings/overdue/count").await
    }

    async fn count_total(&self) -> AppResult<u64> {
        self.client.get_count(SERVICE, "/lendings/count").await
    }

    async fn monthly_summary(&self) -> AppResult<Vec<MonthlyCount>> {
        self.client.get(SERVICE, "/lendings/monthly").await
    }
}
