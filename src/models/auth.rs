//! Session and credential forms

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;

/// Profile of the signed-in operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Login response: access token plus the operator profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "accessToken", alias = "token")]
    pub access_token: String,
    #[serde(flatten)]
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

impl Session {
    /// Expiry read from the token's `exp` claim.
    ///
    /// The console never holds the signing secret, so the signature is not
    /// checked here; the backend remains the judge of validity.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(
            &self.access_token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .ok()?;
        DateTime::from_timestamp(data.claims.exp?, 0)
    }

    /// Tokens without a readable expiry never expire locally
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(skip)]
    #[validate(custom(function = "not_blank", message = "Please provide both token and new password"))]
    pub token: String,
    #[validate(length(min = 1, message = "Please provide both token and new password"))]
    pub new_password: String,
}

/// Confirmation text returned by password workflows
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub message: Option<String>,
}
