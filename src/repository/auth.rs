//! Authentication collaborator

use async_trait::async_trait;
use reqwest::Method;

use super::client::{segment, BackendClient};
use crate::{
    error::AppResult,
    models::{
        auth::{Confirmation, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest},
        Session, UserProfile,
    },
};

const SERVICE: &str = "auth";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> AppResult<Session>;
    async fn signup(&self, request: &SignupRequest) -> AppResult<UserProfile>;
    async fn logout(&self) -> AppResult<()>;
    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> AppResult<Confirmation>;
    async fn reset_password(&self, request: &ResetPasswordRequest) -> AppResult<Confirmation>;
}

/// Backend authentication; a successful login authorises later requests
#[derive(Clone)]
pub struct AuthRepository {
    client: BackendClient,
}

impl AuthRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for AuthRepository {
    async fn login(&self, request: &LoginRequest) -> AppResult<Session> {
        let session: Session = self
            .client
            .send_json(SERVICE, Method::POST, "/auth/login", request)
            .await?;
        self.client.set_token(Some(session.access_token.clone())).await;
        Ok(session)
    }

    async fn signup(&self, request: &SignupRequest) -> AppResult<UserProfile> {
        self.client
            .send_json(SERVICE, Method::POST, "/auth/signup", request)
            .await
    }

    async fn logout(&self) -> AppResult<()> {
        let result = self
            .client
            .send_unit::<()>(SERVICE, Method::POST, "/auth/logout", None)
            .await;
        // The local token is dropped even when the backend call fails
        self.client.set_token(None).await;
        result
    }

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> AppResult<Confirmation> {
        self.client
            .send_json(SERVICE, Method::POST, "/auth/forgot-password", request)
            .await
    }

    async fn reset_password(&self, request: &ResetPasswordRequest) -> AppResult<Confirmation> {
        self.client
            .send_json(
                SERVICE,
                Method::POST,
                &format!("/auth/reset-password/{}", segment(&request.token)?),
                request,
            )
            .await
    }
}
