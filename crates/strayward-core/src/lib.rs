//! Strayward core - client library for the community dog-rescue service.
//!
//! Users report stray dogs with a location and photos, other users mark
//! them picked up, and administrators confirm or reject the rescue. All
//! business rules live on the server; this crate provides:
//!
//! - [`api`]: the HTTP client (bearer auth, one-shot token refresh) and
//!   typed facades for the auth, dogs and admin endpoints
//! - [`auth`]: token storage and the shared [`auth::SessionContext`]
//! - [`config`]: where the API lives and how tokens are stored
//! - [`models`]: request and response bodies

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{Api, ApiError, HttpClient, LoginRedirect};
pub use auth::{AuthState, SessionContext, TokenStore};
pub use config::Config;
