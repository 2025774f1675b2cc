#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use strayward_core::api::{Api, HttpClient, LoginRedirect};
use strayward_core::auth::{MemoryTokenStore, TokenStore};

/// Counts login redirects instead of navigating anywhere.
#[derive(Default)]
pub struct RecordingRedirect {
    count: AtomicUsize,
}

impl RecordingRedirect {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub api: Api,
    pub store: Arc<MemoryTokenStore>,
    pub redirect: Arc<RecordingRedirect>,
}

impl Harness {
    pub fn new(server: &mockito::Server, access: Option<&str>, refresh: Option<&str>) -> Self {
        Self::with_base_url(&format!("{}/api", server.url()), access, refresh)
    }

    pub fn with_base_url(base_url: &str, access: Option<&str>, refresh: Option<&str>) -> Self {
        let store = Arc::new(MemoryTokenStore::with_tokens(access, refresh));
        let redirect = Arc::new(RecordingRedirect::default());
        let tokens: Arc<dyn TokenStore> = store.clone();
        let http = HttpClient::new(base_url, tokens, redirect.clone())
            .expect("Failed to build client");
        Self {
            api: Api::new(http),
            store,
            redirect,
        }
    }
}

pub const USER_JSON: &str = r#"{"id": 1, "email": "a@b.com", "full_name": "A", "is_admin": false, "is_active": true, "created_at": "2024-05-01T10:20:30"}"#;

pub const DOG_JSON: &str = r#"{
    "id": 3,
    "title": "Brown puppy near the park",
    "description": "Friendly, limping",
    "latitude": 44.8176,
    "longitude": 20.4569,
    "reporter_id": 1,
    "status": "reported",
    "picked_up_by_user_id": null,
    "created_at": "2024-05-01T10:20:30",
    "updated_at": null,
    "images": [],
    "reporter": {"id": 1, "email": "a@b.com", "full_name": "A"},
    "picked_up_by": null
}"#;
