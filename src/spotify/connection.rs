use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, header::RETRY_AFTER};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    config,
    error::{Error, Result},
    management::AuthManager,
    spotify::Transport,
};

/// Backoff used when a 429 response carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER: u64 = 5;
const SERVER_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Authenticated HTTP access to the Web API.
pub struct Connection {
    client: Client,
    base_url: String,
    auth: Mutex<AuthManager>,
}

impl Connection {
    /// Creates a connection against the configured API base URL.
    pub fn new(auth: AuthManager) -> Self {
        Self::with_base_url(auth, config::spotify_apiurl())
    }

    pub fn with_base_url(auth: AuthManager, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: Mutex::new(auth),
        }
    }

    /// Creates a connection from the persisted authentication state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when `spotcache auth` has not been run yet.
    pub async fn from_disk() -> Result<Self> {
        Ok(Self::new(AuthManager::load().await?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        let mut request = self.client.request(method.clone(), url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

#[async_trait]
impl Transport for Connection {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        let url = self.url(endpoint);
        let mut token_refreshed = false;
        let mut server_retried = false;

        loop {
            let token = self.auth.lock().await.valid_token().await?;
            debug!("{} {}", method, url);
            let res = self.send(&method, &url, &token, body.as_ref()).await?;
            let status = res.status();

            if status.is_success() {
                return parse_body(res).await;
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let wait = retry_after(&res);
                    warn!("rate limited on {}, retrying in {}s", endpoint, wait);
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE if !server_retried => {
                    server_retried = true;
                    warn!("{} answered {}, retrying once", endpoint, status);
                    tokio::time::sleep(SERVER_ERROR_BACKOFF).await;
                }
                _ => {
                    let message = error_message(&res.text().await.unwrap_or_default());
                    if status == StatusCode::UNAUTHORIZED
                        && !token_refreshed
                        && message.to_lowercase().contains("expired")
                    {
                        token_refreshed = true;
                        warn!("access token expired early, refreshing");
                        self.auth.lock().await.refresh().await?;
                        continue;
                    }
                    return Err(Error::from_status(status.as_u16(), message.clone())
                        .unwrap_or_else(|| {
                            Error::BadRequest(format!("unexpected status {}: {}", status, message))
                        }));
                }
            }
        }
    }
}

async fn parse_body(res: Response) -> Result<Option<Value>> {
    if res.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    let text = res.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

fn retry_after(res: &Response) -> u64 {
    res.headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Pulls `error.message` out of a Web API error body, falling back to the raw body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|error| error.get("message").or(Some(error)))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
