//! Account and session endpoints.

use crate::models::{
    CurrentUser, LoginRequest, MessageResponse, ProfileUpdate, SignupRequest, TokenPair,
};

use super::request::ApiRequest;
use super::{ApiError, HttpClient};

#[derive(Clone)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Register an account. No tokens are issued; log in afterwards.
    pub async fn signup(&self, request: &SignupRequest) -> Result<CurrentUser, ApiError> {
        self.http.json(ApiRequest::post("/auth/signup").json(request)?).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.http.json(ApiRequest::post("/auth/login").json(&body)?).await
    }

    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.http.json(ApiRequest::post("/auth/logout")).await
    }

    /// Exchange a refresh token for a new pair. Sent without a bearer
    /// token and never intercepted, so a rejection leaves the stored
    /// session alone.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        self.http.refresh_tokens(refresh_token).await
    }

    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.http.json(ApiRequest::get("/me")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<CurrentUser, ApiError> {
        self.http.json(ApiRequest::patch("/users/me").json(update)?).await
    }

    /// Deactivate the signed-in account.
    pub async fn delete_account(&self) -> Result<MessageResponse, ApiError> {
        self.http.json(ApiRequest::delete("/users/me")).await
    }
}
