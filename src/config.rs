//! Configuration management for the Book Club console

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the library backend, without trailing slash
    pub base_url: String,
    pub timeout_secs: u64,
    /// Pre-issued access token, used when no interactive login happens
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailTransport {
    /// Hand the notice to the backend's e-mail endpoint
    Backend,
    /// Send the notice directly over SMTP
    Smtp,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmailConfig {
    pub transport: EmailTransport,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_from_name: Option<String>,
    pub smtp_use_tls: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LendingConfig {
    /// Loan length pre-filled in a new lend form
    pub default_loan_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub lending: LendingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // BOOKCLUB_EMAIL__SMTP_HOST -> email.smtp_host
            .add_source(
                Environment::with_prefix("BOOKCLUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", env::var("BOOKCLUB_API_URL").ok())?
            .set_override_option("api.token", env::var("BOOKCLUB_TOKEN").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 15,
            token: None,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            transport: EmailTransport::Backend,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "noreply@bookclub.local".to_string(),
            smtp_from_name: Some("Book Club Library".to_string()),
            smtp_use_tls: true,
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            default_loan_days: 14,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
