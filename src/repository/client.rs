//! Shared HTTP client for the library backend

use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::sync::RwLock;

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
};

/// Count endpoints answer with a bare number or `{"count": n}`
#[derive(Deserialize)]
#[serde(untagged)]
enum CountBody {
    Bare(u64),
    Wrapped { count: u64 },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(config.token.clone())),
        })
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.token.read().await.as_deref() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, service: &'static str, path: &str) -> AppResult<T> {
        tracing::debug!("GET {}", path);
        let response = self.request(Method::GET, path).await.send().await?;
        decode(service, path, response).await
    }

    pub async fn get_count(&self, service: &'static str, path: &str) -> AppResult<u64> {
        let body: CountBody = self.get(service, path).await?;
        Ok(match body {
            CountBody::Bare(count) | CountBody::Wrapped { count } => count,
        })
    }

    pub async fn send_json<B, T>(
        &self,
        service: &'static str,
        method: Method,
        path: &str,
        body: &B,
    ) -> AppResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!("{} {}", method, path);
        let response = self.request(method, path).await.json(body).send().await?;
        decode(service, path, response).await
    }

    /// Send a request whose response body is irrelevant
    pub async fn send_unit<B>(
        &self,
        service: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> AppResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        tracing::debug!("{} {}", method, path);
        let builder = self.request(method, path).await;
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };
        let response = builder.send().await?;
        check_status(service, response).await.map(|_| ())
    }
}

async fn check_status(service: &'static str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    tracing::warn!("{} rejected request with {}: {}", service, status, message);

    Err(match status {
        StatusCode::UNAUTHORIZED => AppError::Authentication(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Rejected {
            service,
            status: status.as_u16(),
            message,
        },
    })
}

/// Percent-encode one path segment so ids and tokens cannot change the route
pub fn segment(raw: &str) -> AppResult<String> {
    let mut url = Url::parse("http://backend/")
        .map_err(|e| AppError::Internal(format!("Failed to encode path segment: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| AppError::Internal("Failed to encode path segment".to_string()))?
        .clear()
        .push(raw);
    Ok(url.path().trim_start_matches('/').to_string())
}

async fn decode<T: DeserializeOwned>(
    service: &'static str,
    path: &str,
    response: Response,
) -> AppResult<T> {
    let response = check_status(service, response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::DataShape(format!("{} {}: {}", service, path, e)))
}
