use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::{ApiError, ApiResult};
use crate::types::ErrorBody;

/// Handler invoked when the server rejects the current credential.
pub type AuthFailureHandler = Arc<dyn Fn() + Send + Sync>;

/// Shared bearer-token slot. The session store writes it; the client reads
/// it on every outbound request.
#[derive(Debug, Clone, Default)]
pub struct AuthToken(Arc<RwLock<Option<String>>>);

impl AuthToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.0.write() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.0.write() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }

    pub fn is_set(&self) -> bool {
        self.0.read().is_some()
    }
}

/// Client for the note service REST API.
///
/// Cloning is cheap: clones share the underlying transport, the bearer
/// slot and the registered auth-failure handler.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: AuthToken,
    on_auth_failure: Arc<RwLock<Option<AuthFailureHandler>>>,
}

impl ApiClient {
    /// Create a new client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: AuthToken::new(),
            on_auth_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// The shared bearer slot for this client.
    pub fn auth_token(&self) -> AuthToken {
        self.token.clone()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers the handler invoked on authentication failure. The handler
    /// runs to completion before the failing call returns, so a caller that
    /// observes [`ApiError::Unauthorized`] can assume the session has
    /// already been cleared.
    pub fn on_auth_failure(&self, handler: AuthFailureHandler) {
        *self.on_auth_failure.write() = Some(handler);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.dispatch(self.http.get(self.url(path))).await?;
        Self::decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .dispatch(self.http.post(self.url(path)).json(body))
            .await?;
        Self::decode(response).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .dispatch(self.http.put(self.url(path)).json(body))
            .await?;
        Self::decode(response).await
    }

    /// DELETE carries no meaningful response body on this API.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.dispatch(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    /// Attaches the bearer header when a credential is set, sends the
    /// request and maps non-success statuses onto the error taxonomy.
    async fn dispatch(&self, request: RequestBuilder) -> ApiResult<reqwest::Response> {
        let request = match self.token.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = Self::error_message(response).await;
        debug!(status = status.as_u16(), %message, "request failed");

        match status {
            StatusCode::UNAUTHORIZED => {
                // Invalidate the session before the caller sees the error.
                self.notify_auth_failure();
                Err(ApiError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound { message }),
            _ => Err(ApiError::Server {
                status: status.as_u16(),
                message,
            }),
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Extracts the `message` field of the standard error body, falling
    /// back to the raw body text.
    async fn error_message(response: reqwest::Response) -> String {
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) if !err.message.is_empty() => err.message,
            _ => body,
        }
    }

    fn notify_auth_failure(&self) {
        // Clone the handler out so it never runs under the lock.
        let handler = self.on_auth_failure.read().clone();
        match handler {
            Some(handler) => handler(),
            None => warn!("authentication failed with no handler registered"),
        }
    }
}
