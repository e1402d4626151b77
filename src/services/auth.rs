//! Authentication service: login, signup and password recovery

use std::sync::Arc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        auth::{ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest},
        Session, UserProfile,
    },
    repository::AuthApi,
};

#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthApi>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthApi>) -> Self {
        Self { auth }
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let session = self.auth.login(&request).await?;
        tracing::info!("Signed in as {}", session.user.name);
        Ok(session)
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str, confirm: &str) -> AppResult<UserProfile> {
        let request = SignupRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;
        if confirm.is_empty() {
            return Err(AppError::invalid("confirmPassword", "Please confirm your password"));
        }
        if password != confirm {
            return Err(AppError::invalid("confirmPassword", "Passwords do not match"));
        }

        let user = self.auth.signup(&request).await?;
        tracing::info!("Account created for {}", user.email);
        Ok(user)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.auth.logout().await
    }

    /// Ask for a reset token; returns the confirmation to display
    pub async fn forgot_password(&self, email: &str) -> AppResult<String> {
        let request = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        request.validate()?;

        let confirmation = self.auth.forgot_password(&request).await?;
        Ok(confirmation
            .message
            .unwrap_or_else(|| "Reset token sent to your email".to_string()))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<String> {
        let request = ResetPasswordRequest {
            token: token.trim().to_string(),
            new_password: new_password.to_string(),
        };
        request.validate()?;

        let confirmation = self.auth.reset_password(&request).await?;
        Ok(confirmation
            .message
            .unwrap_or_else(|| "Password reset successfully".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::auth::Confirmation, repository::auth::MockAuthApi};

    #[tokio::test]
    async fn invalid_email_never_reaches_backend() {
        let mut api = MockAuthApi::new();
        api.expect_login().never();
        api.expect_forgot_password().never();
        let svc = AuthService::new(Arc::new(api));

        assert!(svc.login("admin", "secret").await.is_err());
        assert!(svc.forgot_password("nobody@").await.is_err());
    }

    #[tokio::test]
    async fn signup_requires_matching_confirmation() {
        let mut api = MockAuthApi::new();
        api.expect_signup().never();
        let svc = AuthService::new(Arc::new(api));

        let err = svc
            .signup("Ada", "ada@example.org", "secret1", "secret2")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match");
    }

    #[tokio::test]
    async fn reset_uses_default_confirmation() {
        let mut api = MockAuthApi::new();
        api.expect_reset_password()
            .withf(|r| r.token == "tok" && r.new_password == "newpass")
            .times(1)
            .returning(|_| Ok(Confirmation::default()));
        let svc = AuthService::new(Arc::new(api));

        let message = svc.reset_password(" tok ", "newpass").await.unwrap();
        assert_eq!(message, "Password reset successfully");
    }

    #[tokio::test]
    async fn reset_requires_token_and_password() {
        let mut api = MockAuthApi::new();
        api.expect_reset_password().never();
        let svc = AuthService::new(Arc::new(api));

        assert!(svc.reset_password("", "newpass").await.is_err());
        assert!(svc.reset_password("tok", "").await.is_err());
    }
}
