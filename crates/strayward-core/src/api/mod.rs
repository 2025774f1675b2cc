//! REST API client module for the dog-rescue service.
//!
//! `HttpClient` handles dispatch, bearer authentication and the one-shot
//! token refresh. The resource facades (`AuthApi`, `DogsApi`, `AdminApi`)
//! only build requests and decode responses.

pub mod admin;
pub mod auth;
pub mod client;
pub mod dogs;
pub mod error;
pub mod request;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use client::{HttpClient, LogRedirect, LoginRedirect};
pub use dogs::DogsApi;
pub use error::ApiError;
pub use request::{ApiRequest, FileUpload, RequestBody};

/// All resource facades over one shared client.
#[derive(Clone)]
pub struct Api {
    http: HttpClient,
}

impl Api {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.http.clone())
    }

    pub fn dogs(&self) -> DogsApi {
        DogsApi::new(self.http.clone())
    }

    pub fn admin(&self) -> AdminApi {
        AdminApi::new(self.http.clone())
    }
}
