//! Pingdom REST API client
//!
//! Talks to the Pingdom 2.1 API using basic auth plus the `App-Key` header.
//! Every failure is classified into a [`RemoteError`] at the point of the call:
//!
//! - connection errors, timeouts, HTTP 429 and 5xx are `Transport` (retryable)
//! - HTTP 404 is `NotFound`
//! - any other non-success status is `Rejected`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{CheckDescriptor, CheckId, RemoteCheckClient, RemoteError};
use crate::error::{Error, Result};

/// Public Pingdom API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.pingdom.com/api/2.1";

const APP_KEY_HEADER: &str = "App-Key";

/// Credentials and connection settings for the Pingdom API
#[derive(Clone)]
pub struct PingdomConfig {
    pub username: String,
    pub password: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for PingdomConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PingdomConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Error envelope returned by the Pingdom API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errormessage: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    check: CreatedCheck,
}

#[derive(Debug, Deserialize)]
struct CreatedCheck {
    id: CheckId,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

/// [`RemoteCheckClient`] backed by the Pingdom HTTP API
pub struct PingdomClient {
    http: Client,
    config: PingdomConfig,
}

impl PingdomClient {
    pub fn new(config: PingdomConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::ConfigError("pingdom base url is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pingdom-operator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        self.http
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(APP_KEY_HEADER, &self.config.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                RemoteError::Transport(format!("invalid response body: {}", e))
            });
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify_failure(status, &body);
        warn!(status = %status, kind = error.kind().as_str(), "Pingdom request failed: {}", error.message());
        Err(error)
    }
}

#[async_trait]
impl RemoteCheckClient for PingdomClient {
    #[instrument(skip(self, check), fields(name = %check.name, host = %check.host))]
    async fn create(&self, check: &CheckDescriptor) -> Result<CheckId, RemoteError> {
        let mut params = check_params(check);
        params.push(("type", "http".to_string()));

        let response: CreateResponse = self
            .send(self.request(Method::POST, "checks").form(&params))
            .await?;

        debug!(id = response.check.id, "Created Pingdom check");
        Ok(response.check.id)
    }

    #[instrument(skip(self, check), fields(name = %check.name, host = %check.host))]
    async fn update(&self, id: CheckId, check: &CheckDescriptor) -> Result<(), RemoteError> {
        let params = check_params(check);
        let response: MessageResponse = self
            .send(
                self.request(Method::PUT, &format!("checks/{}", id))
                    .form(&params),
            )
            .await?;

        debug!("Updated Pingdom check: {}", response.message);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CheckId) -> Result<(), RemoteError> {
        let response: MessageResponse = self
            .send(self.request(Method::DELETE, &format!("checks/{}", id)))
            .await?;

        debug!("Deleted Pingdom check: {}", response.message);
        Ok(())
    }
}

/// Form parameters shared by check creation and modification
///
/// Port and path are always sent so an update resets values that were
/// removed from the spec.
pub(crate) fn check_params(check: &CheckDescriptor) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("name", check.name.clone()),
        ("host", check.host.clone()),
        ("resolution", check.resolution.to_string()),
        ("encryption", check.encryption.to_string()),
        ("port", check.effective_port().to_string()),
        (
            "url",
            if check.path.is_empty() {
                "/".to_string()
            } else {
                check.path.clone()
            },
        ),
    ];

    if !check.username.is_empty() || !check.password.is_empty() {
        params.push(("auth", format!("{}:{}", check.username, check.password)));
    }

    params
}

/// Turn a non-success response into a [`RemoteError`]
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error.errormessage)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    if status == StatusCode::NOT_FOUND {
        RemoteError::NotFound(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        RemoteError::Transport(format!("HTTP {}: {}", status.as_u16(), message))
    } else {
        RemoteError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}
