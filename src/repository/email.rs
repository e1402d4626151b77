//! Overdue notice collaborator

use async_trait::async_trait;
use reqwest::Method;

use super::client::BackendClient;
use crate::{error::AppResult, models::OverdueNotice};

/// Delivers one overdue notice to one reader
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OverdueMailer: Send + Sync {
    async fn send_overdue_notice(&self, notice: &OverdueNotice) -> AppResult<()>;
}

/// Hands notices to the backend's e-mail endpoint
#[derive(Clone)]
pub struct EmailRepository {
    client: BackendClient,
}

impl EmailRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OverdueMailer for EmailRepository {
    async fn send_overdue_notice(&self, notice: &OverdueNotice) -> AppResult<()> {
        self.client
            .send_unit("email", Method::POST, "/email/overdue", Some(notice))
            .await
    }
}
