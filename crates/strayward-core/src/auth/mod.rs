//! Authentication module for managing sessions and stored tokens.
//!
//! This module provides:
//! - `TokenStore`: durable storage for the access/refresh token pair
//!   (file, OS keychain, or memory)
//! - `SessionContext`: the signed-in user and login/signup/logout operations
//!
//! Tokens carry no expiry here; an expired token shows up as a 401.

pub mod context;
pub mod store;

pub use context::{AuthState, SessionContext};
pub use store::{
    open_token_store, FileTokenStore, KeyringTokenStore, MemoryTokenStore, Session, TokenKind,
    TokenStore,
};
