//! HTTP client for the dog-rescue API.
//!
//! Every request goes through `HttpClient::execute`, which attaches the
//! stored access token and recovers from a single 401 by exchanging the
//! refresh token for a new pair and replaying the request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::{TokenKind, TokenStore};
use crate::models::{RefreshRequest, TokenPair};

use super::request::{ApiRequest, RequestBody};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the token refresh endpoint, relative to the API base.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Sends the user back to the login entry point once the session is gone.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Redirect that only records the event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        info!("Session ended, login required");
    }
}

/// API client for the dog-rescue service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
}

impl HttpClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            redirect,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Dispatch a request, refreshing the session at most once on 401.
    ///
    /// Non-success statuses are returned as `ApiError`. When the refresh
    /// itself fails, both tokens are cleared, the login redirect fires and
    /// the refresh error is returned instead of the original 401.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Response, ApiError> {
        let mut access_token = self.tokens.get(TokenKind::Access);

        loop {
            let response = self.dispatch(&request, access_token.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED || request.retried {
                return Self::check_response(response).await;
            }

            request.retried = true;
            let original = Self::error_from(response).await;
            access_token = Some(self.recover_session(&request, original).await?);
        }
    }

    /// Exchange the stored refresh token for a new pair.
    /// Returns the new access token to replay with.
    async fn recover_session(&self, request: &ApiRequest, original: ApiError) -> Result<String, ApiError> {
        let Some(refresh_token) = self.tokens.get(TokenKind::Refresh) else {
            debug!(path = %request.path, "401 without a refresh token");
            return Err(original);
        };

        match self.refresh_tokens(&refresh_token).await {
            Ok(pair) => {
                if let Err(e) = self.tokens.store_pair(&pair) {
                    warn!(error = %e, "Failed to persist refreshed tokens");
                }
                debug!(method = %request.method, path = %request.path, "Token refreshed, replaying request");
                Ok(pair.access_token)
            }
            Err(refresh_error) => {
                warn!(error = %refresh_error, path = %request.path, "Token refresh failed, ending session");
                if let Err(e) = self.tokens.clear_all() {
                    warn!(error = %e, "Failed to clear stored tokens");
                }
                self.redirect.redirect_to_login();
                Err(refresh_error)
            }
        }
    }

    /// Call the refresh endpoint directly: no bearer token, no 401 recovery.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::decode(response, REFRESH_PATH).await
    }

    async fn dispatch(&self, request: &ApiRequest, access_token: Option<&str>) -> Result<Response, ApiError> {
        let mut builder = self.client.request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::File(upload) => builder.multipart(upload.to_form()?),
        };

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = access_token.is_some(),
            retried = request.retried,
            "Sending request"
        );
        Ok(builder.send().await?)
    }

    /// Execute and decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        Self::decode(response, &path).await
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpClient::new(
            "http://localhost:8000/api/",
            Arc::new(MemoryTokenStore::new()),
            Arc::new(LogRedirect),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/dogs/1"), "http://localhost:8000/api/dogs/1");
    }
}
