//! Audit log and recent activity feeds

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Activity, AuditLog},
    repository::{ActivityApi, AuditApi},
};

#[derive(Clone)]
pub struct AuditService {
    audit: Arc<dyn AuditApi>,
    activity: Arc<dyn ActivityApi>,
}

impl AuditService {
    pub fn new(audit: Arc<dyn AuditApi>, activity: Arc<dyn ActivityApi>) -> Self {
        Self { audit, activity }
    }

    pub async fn logs(&self) -> AppResult<Vec<AuditLog>> {
        self.audit.list().await.map_err(|e| {
            tracing::error!("Audit fetch error: {}", e);
            e
        })
    }

    pub async fn recent_activity(&self) -> AppResult<Vec<Activity>> {
        self.activity.recent().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{AppError, ErrorKind},
        repository::audit::{MockActivityApi, MockAuditApi},
    };
    use tokio_test::{assert_err, assert_ok, block_on};

    #[test]
    fn malformed_audit_feed_is_a_data_shape_error() {
        let mut audit = MockAuditApi::new();
        audit
            .expect_list()
            .returning(|| Err(AppError::DataShape("audit /audit-logs: expected a sequence".into())));
        let svc = AuditService::new(Arc::new(audit), Arc::new(MockActivityApi::new()));

        let err = assert_err!(block_on(svc.logs()));
        assert_eq!(err.kind(), ErrorKind::DataShape);
    }

    #[test]
    fn empty_feed_is_a_success() {
        let mut activity = MockActivityApi::new();
        activity.expect_recent().returning(|| Ok(Vec::new()));
        let svc = AuditService::new(Arc::new(MockAuditApi::new()), Arc::new(activity));

        let feed = assert_ok!(block_on(svc.recent_activity()));
        assert!(feed.is_empty());
    }
}
