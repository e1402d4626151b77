//! Audit log and activity feed collaborators

use async_trait::async_trait;

use super::client::BackendClient;
use crate::{
    error::AppResult,
    models::{Activity, AuditLog},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditApi: Send + Sync {
    async fn list(&self) -> AppResult<Vec<AuditLog>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityApi: Send + Sync {
    async fn recent(&self) -> AppResult<Vec<Activity>>;
}

#[derive(Clone)]
pub struct AuditRepository {
    client: BackendClient,
}

impl AuditRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuditApi for AuditRepository {
    async fn list(&self) -> AppResult<Vec<AuditLog>> {
        self.client.get("audit", "/audit-logs").await
    }
}

#[async_trait]
impl ActivityApi for AuditRepository {
    async fn recent(&self) -> AppResult<Vec<Activity>> {
        self.client.get("activity", "/activity/recent").await
    }
}
